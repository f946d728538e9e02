use crate::model::Category;
use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct NodeTemplate {
    pub kind: &'static str,
    pub category: Category,
    pub label: &'static str,
    pub description: &'static str,
    pub inputs: usize,
    pub outputs: usize,
    pub configurable: bool,
}

const fn entry(
    kind: &'static str,
    category: Category,
    label: &'static str,
    description: &'static str,
    ports: (usize, usize),
    configurable: bool,
) -> NodeTemplate {
    NodeTemplate {
        kind,
        category,
        label,
        description,
        inputs: ports.0,
        outputs: ports.1,
        configurable,
    }
}

pub static TEMPLATES: &[NodeTemplate] = &[
    // Входы
    entry("dataLoader", Category::Input, "Data Loader", "Load and batch data for training", (0, 1), true),
    entry("imageInput", Category::Input, "Image Input", "Input for image data", (0, 1), true),
    // Слои
    entry("linear", Category::Layer, "Linear Layer", "Fully connected layer", (1, 1), true),
    entry("conv2d", Category::Layer, "Conv2D", "2D convolution layer", (1, 1), true),
    entry("lstm", Category::Layer, "LSTM", "Long Short-Term Memory layer", (1, 1), true),
    // Активации
    entry("relu", Category::Activation, "ReLU", "Rectified Linear Unit activation", (1, 1), false),
    entry("sigmoid", Category::Activation, "Sigmoid", "Sigmoid activation function", (1, 1), false),
    entry("tanh", Category::Activation, "Tanh", "Hyperbolic tangent activation", (1, 1), false),
    // Оптимизаторы
    entry("adam", Category::Optimizer, "Adam", "Adam optimizer", (1, 1), true),
    entry("sgd", Category::Optimizer, "SGD", "Stochastic Gradient Descent", (1, 1), true),
    // Преобразования
    entry("normalize", Category::Transform, "Normalize", "Normalize input data", (1, 1), true),
    entry("resize", Category::Transform, "Resize", "Resize input dimensions", (1, 1), true),
    // Функции потерь
    entry("crossEntropy", Category::Loss, "Cross Entropy", "Cross entropy loss function", (2, 1), false),
    entry("mse", Category::Loss, "MSE", "Mean squared error loss", (2, 1), false),
    // Операции
    entry("concat", Category::Operation, "Concatenate", "Concatenate multiple inputs", (2, 1), false),
    entry("split", Category::Operation, "Split", "Split input into multiple outputs", (1, 2), false),
    // Выходы
    entry("model", Category::Output, "Model", "Final model output", (1, 0), true),
    entry("visualize", Category::Output, "Visualize", "Visualize model performance", (1, 0), false),
    entry("export", Category::Output, "Export", "Export trained model", (1, 0), true),
];

pub fn template(kind: &str) -> Option<&'static NodeTemplate> {
    TEMPLATES.iter().find(|t| t.kind == kind)
}

pub fn category_templates(category: Category) -> Vec<&'static NodeTemplate> {
    TEMPLATES.iter().filter(|t| t.category == category).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_unique() {
        for (i, t) in TEMPLATES.iter().enumerate() {
            assert!(TEMPLATES[i + 1..].iter().all(|o| o.kind != t.kind), "duplicate kind {}", t.kind);
        }
    }

    #[test]
    fn test_category_lookup() {
        let kinds: Vec<_> = category_templates(Category::Activation).iter().map(|t| t.kind).collect();
        assert_eq!(kinds, ["relu", "sigmoid", "tanh"]);
        assert_eq!(template("mse").map(|t| t.category), Some(Category::Loss));
        assert!(template("attention").is_none());
    }
}
