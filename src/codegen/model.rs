use crate::error::CompileError;
use crate::graph_ext::ModelGraph;
use crate::model::{Edge, Node, ParamValue};
use log::debug;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

pub const MODEL_CLASS: &str = "FlowModel";

const INPUT_VAR: &str = "x";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerKind {
    Linear,
    Conv2d,
    Lstm,
    Relu,
    Sigmoid,
    Tanh,
}

impl LayerKind {
    fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "linear" => Some(LayerKind::Linear),
            "conv2d" => Some(LayerKind::Conv2d),
            "lstm" => Some(LayerKind::Lstm),
            "relu" => Some(LayerKind::Relu),
            "sigmoid" => Some(LayerKind::Sigmoid),
            "tanh" => Some(LayerKind::Tanh),
            _ => None,
        }
    }

    fn field_prefix(self) -> &'static str {
        match self {
            LayerKind::Linear => "fc",
            LayerKind::Conv2d => "conv",
            LayerKind::Lstm => "lstm",
            LayerKind::Relu => "relu",
            LayerKind::Sigmoid => "sigmoid",
            LayerKind::Tanh => "tanh",
        }
    }

    fn constructor(self, node: &Node) -> String {
        match self {
            LayerKind::Linear => {
                let mut args = vec![
                    num(node.number_or("in_features", 784.0)),
                    num(node.number_or("out_features", 128.0)),
                ];
                if !node.bool_or("bias", true) {
                    args.push("bias=False".into());
                }
                format!("nn.Linear({})", args.join(", "))
            }
            LayerKind::Conv2d => {
                let mut args = vec![
                    num(node.number_or("in_channels", 3.0)),
                    num(node.number_or("out_channels", 16.0)),
                    size_arg(node, "kernel_size", 3.0),
                ];
                args.extend(keyword_arg(node, "stride", 1.0, false));
                args.extend(keyword_arg(node, "padding", 0.0, true));
                format!("nn.Conv2d({})", args.join(", "))
            }
            LayerKind::Lstm => format!(
                "nn.LSTM({}, {}, batch_first=True)",
                num(node.number_or("input_size", 28.0)),
                num(node.number_or("hidden_size", 64.0)),
            ),
            LayerKind::Relu => "nn.ReLU()".into(),
            LayerKind::Sigmoid => "nn.Sigmoid()".into(),
            LayerKind::Tanh => "nn.Tanh()".into(),
        }
    }
}

fn num(v: f64) -> String {
    format!("{}", v)
}

// Число или размер по осям: `3` или `(3, 5)`
fn size_arg(node: &Node, key: &str, default: f64) -> String {
    match node.param(key) {
        Some(v @ (ParamValue::Number(_) | ParamValue::List(_))) => v.to_string(),
        _ => num(default),
    }
}

// `key=value` только если значение отличается от дефолта PyTorch
fn keyword_arg(node: &Node, key: &str, default: f64, allow_text: bool) -> Option<String> {
    match node.param(key)? {
        ParamValue::Number(v) if *v == default => None,
        v @ (ParamValue::Number(_) | ParamValue::List(_)) => Some(format!("{}={}", key, v)),
        v @ ParamValue::Text(_) if allow_text => Some(format!("{}={}", key, v)),
        _ => None,
    }
}

#[derive(Serialize)]
struct ModelRenderInfo<'a> {
    class_name: &'a str,
    fields: Vec<String>,
    statements: Vec<String>,
    output: String,
}

struct Frame {
    output: String,
    last: String,
    children: std::vec::IntoIter<NodeIndex>,
}

/// Обход в глубину для `forward`. Сходящиеся пути не сливаются:
/// результат берётся с последнего посещённого пути.
struct ForwardEmitter<'g, 'a> {
    model: &'g ModelGraph<'a>,
    outputs: HashMap<NodeIndex, String>,
    statements: Vec<String>,
}

impl<'g, 'a> ForwardEmitter<'g, 'a> {
    fn new(model: &'g ModelGraph<'a>) -> Self {
        Self {
            model,
            outputs: HashMap::new(),
            statements: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<String>, String) {
        let mut last = INPUT_VAR.to_string();
        for entry in self.model.entry_nodes() {
            last = self.visit(entry, INPUT_VAR);
        }
        (self.statements, last)
    }

    // Неизвестный kind ничего не выводит и пропускает вход дальше
    fn emit(&mut self, idx: NodeIndex, input: &str) -> String {
        let node = self.model.graph[idx];
        let ordinal = self.model.ordinal(idx);
        let output = match LayerKind::from_kind(&node.kind) {
            Some(kind) => {
                let var = format!("{}{}", INPUT_VAR, ordinal);
                let field = format!("self.{}{}", kind.field_prefix(), ordinal);
                let stmt = match kind {
                    LayerKind::Lstm => format!("{}, _ = {}({})", var, field, input),
                    _ => format!("{} = {}({})", var, field, input),
                };
                self.statements.push(stmt);
                var
            }
            None => input.to_string(),
        };
        self.outputs.insert(idx, output.clone());
        output
    }

    fn visit(&mut self, start: NodeIndex, input: &str) -> String {
        if let Some(done) = self.outputs.get(&start) {
            return done.clone();
        }
        let output = self.emit(start, input);
        let mut stack = vec![Frame {
            last: output.clone(),
            output,
            children: self.model.children(start).into_iter(),
        }];
        let mut result = String::new();

        while let Some(frame) = stack.last_mut() {
            match frame.children.next() {
                Some(child) => {
                    if let Some(done) = self.outputs.get(&child) {
                        frame.last = done.clone();
                        continue;
                    }
                    let parent_output = frame.output.clone();
                    let output = self.emit(child, &parent_output);
                    stack.push(Frame {
                        last: output.clone(),
                        output,
                        children: self.model.children(child).into_iter(),
                    });
                }
                None => {
                    let finished = stack.pop().map(|f| f.last).unwrap_or_default();
                    match stack.last_mut() {
                        Some(parent) => parent.last = finished,
                        None => result = finished,
                    }
                }
            }
        }
        result
    }
}

pub fn synthesize_model(tera: &Tera, nodes: &[Node], edges: &[Edge]) -> Result<String, CompileError> {
    let model = ModelGraph::build(nodes, edges);

    // 1. Поля модели в порядке входного списка
    let mut fields = Vec::new();
    for idx in model.graph.node_indices() {
        let node = model.graph[idx];
        match LayerKind::from_kind(&node.kind) {
            Some(kind) => fields.push(format!(
                "self.{}{} = {}",
                kind.field_prefix(),
                model.ordinal(idx),
                kind.constructor(node)
            )),
            None => debug!("Skipping node '{}' of unknown kind '{}'", node.id, node.kind),
        }
    }

    // 2. Тело forward; без слоёв это тождественная функция
    let (statements, output) = if model.is_empty() {
        (Vec::new(), INPUT_VAR.to_string())
    } else {
        ForwardEmitter::new(&model).run()
    };

    let info = ModelRenderInfo {
        class_name: MODEL_CLASS,
        fields,
        statements,
        output,
    };
    Ok(tera.render("model", &Context::from_serialize(&info)?)?)
}
