use crate::codegen::model::MODEL_CLASS;
use crate::error::CompileError;
use crate::model::{Category, Node};
use serde::Serialize;
use tera::{Context, Tera};

const EPOCHS: usize = 5;
const LOG_INTERVAL: usize = 100;
const TRAIN_BATCH_SIZE: usize = 64;
const TEST_BATCH_SIZE: usize = 1000;

const ADAM_DEFAULT_LR: f64 = 0.001;
const SGD_DEFAULT_LR: f64 = 0.01;
const SGD_DEFAULT_MOMENTUM: f64 = 0.9;

#[derive(Serialize)]
struct TrainingRenderInfo<'a> {
    class_name: &'a str,
    image_dataset: bool,
    train_batch_size: usize,
    test_batch_size: usize,
    criterion: String,
    optimizer: String,
    epochs: usize,
    log_interval: usize,
    log_remainder: usize,
}

fn first_of(nodes: &[Node], category: Category) -> Option<&Node> {
    nodes.iter().find(|n| n.effective_category() == Some(category))
}

fn optimizer_line(nodes: &[Node]) -> String {
    let Some(node) = first_of(nodes, Category::Optimizer) else {
        return format!("optimizer = optim.Adam(model.parameters(), lr={})", ADAM_DEFAULT_LR);
    };
    match node.kind.as_str() {
        "adam" => format!(
            "optimizer = optim.Adam(model.parameters(), lr={})",
            node.number_or("lr", ADAM_DEFAULT_LR)
        ),
        "sgd" => format!(
            "optimizer = optim.SGD(model.parameters(), lr={}, momentum={})",
            node.number_or("lr", SGD_DEFAULT_LR),
            node.number_or("momentum", SGD_DEFAULT_MOMENTUM)
        ),
        _ => format!(
            "optimizer = optim.Adam(model.parameters(), lr={})  # default",
            ADAM_DEFAULT_LR
        ),
    }
}

fn criterion_line(nodes: &[Node]) -> &'static str {
    match first_of(nodes, Category::Loss).map(|n| n.kind.as_str()) {
        None | Some("crossEntropy") => "criterion = nn.CrossEntropyLoss()",
        Some("mse") => "criterion = nn.MSELoss()",
        Some(_) => "criterion = nn.CrossEntropyLoss()  # default",
    }
}

pub fn synthesize_training(tera: &Tera, nodes: &[Node]) -> Result<String, CompileError> {
    let info = TrainingRenderInfo {
        class_name: MODEL_CLASS,
        image_dataset: nodes.iter().any(|n| n.kind == "imageInput"),
        train_batch_size: TRAIN_BATCH_SIZE,
        test_batch_size: TEST_BATCH_SIZE,
        criterion: criterion_line(nodes).to_string(),
        optimizer: optimizer_line(nodes),
        epochs: EPOCHS,
        log_interval: LOG_INTERVAL,
        log_remainder: LOG_INTERVAL - 1,
    };
    Ok(tera.render("training", &Context::from_serialize(&info)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParamValue;

    #[test]
    fn test_unknown_optimizer_falls_back_to_adam() {
        let nodes = vec![Node::new("o", "rmsprop").with_category(Category::Optimizer)];
        assert_eq!(
            optimizer_line(&nodes),
            "optimizer = optim.Adam(model.parameters(), lr=0.001)  # default"
        );
    }

    #[test]
    fn test_adam_reads_learning_rate() {
        let nodes = vec![Node::new("o", "adam").with_param("lr", ParamValue::Number(0.0003))];
        assert_eq!(optimizer_line(&nodes), "optimizer = optim.Adam(model.parameters(), lr=0.0003)");
    }

    #[test]
    fn test_adam_without_params_uses_default_lr() {
        let nodes = vec![Node::new("o", "adam")];
        assert_eq!(optimizer_line(&nodes), "optimizer = optim.Adam(model.parameters(), lr=0.001)");
    }

    #[test]
    fn test_sgd_reads_learning_rate() {
        let nodes = vec![Node::new("o", "sgd").with_param("lr", ParamValue::Number(0.1))];
        assert_eq!(
            optimizer_line(&nodes),
            "optimizer = optim.SGD(model.parameters(), lr=0.1, momentum=0.9)"
        );
    }

    #[test]
    fn test_first_optimizer_wins() {
        let nodes = vec![Node::new("a", "sgd"), Node::new("b", "adam")];
        assert!(optimizer_line(&nodes).starts_with("optimizer = optim.SGD("));
    }

    #[test]
    fn test_loss_selection() {
        assert_eq!(criterion_line(&[]), "criterion = nn.CrossEntropyLoss()");
        assert_eq!(criterion_line(&[Node::new("l", "mse")]), "criterion = nn.MSELoss()");
        let odd = Node::new("l", "huber").with_category(Category::Loss);
        assert_eq!(criterion_line(&[odd]), "criterion = nn.CrossEntropyLoss()  # default");
    }
}
