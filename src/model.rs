use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog;
use crate::error::CompileError;

/// Элемент списка параметров, например `kernel_size: [3, 3]`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(&python_str(s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Scalar>),
    // null, объекты и вложенные списки: читаются как отсутствующий параметр
    Other(serde_json::Value),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

// Значение как литерал Python, списки выводятся кортежами
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(true) => write!(f, "True"),
            ParamValue::Bool(false) => write!(f, "False"),
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Text(s) => f.write_str(&python_str(s)),
            ParamValue::List(items) => {
                let parts = items.iter().map(|i| i.to_string()).collect::<Vec<_>>();
                if parts.len() == 1 {
                    write!(f, "({},)", parts[0])
                } else {
                    write!(f, "({})", parts.join(", "))
                }
            }
            ParamValue::Other(_) => write!(f, "None"),
        }
    }
}

/// Строковый литерал Python в двойных кавычках. Всё вне печатного ASCII
/// экранируется через `\x`, `\u` или `\U`.
pub fn python_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            c if (c as u32) < 0x100 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if (c as u32) < 0x10000 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Input,
    Layer,
    Activation,
    Optimizer,
    Transform,
    Loss,
    Operation,
    Output,
}

impl Category {
    pub fn is_model_part(self) -> bool {
        matches!(self, Category::Layer | Category::Activation)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, alias = "params")]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl Node {
    pub fn new(id: &str, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            category: catalog::template(kind).map(|t| t.category),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_param(mut self, key: &str, value: ParamValue) -> Self {
        self.parameters.insert(key.to_string(), value);
        self
    }

    // Явная категория узла, иначе категория из каталога по kind
    pub fn effective_category(&self) -> Option<Category> {
        self.category
            .or_else(|| catalog::template(&self.kind).map(|t| t.category))
    }

    // Сначала snake_case ключ, затем camelCase вариант из редактора
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.parameters
            .get(key)
            .or_else(|| self.parameters.get(&camel_case(key)))
    }

    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.param(key).and_then(ParamValue::as_number).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.param(key).and_then(ParamValue::as_bool).unwrap_or(default)
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("{}->{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Документ `null` даёт `None`.
    pub fn from_json(json: &str) -> Result<Option<Self>, CompileError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    pub imports_text: String,
    pub model_text: String,
    pub training_text: String,
}

impl CompiledProgram {
    // Импорты, класс модели и код обучения через две пустые строки
    pub fn source(&self) -> String {
        format!(
            "{}\n\n\n{}\n\n\n{}\n",
            self.imports_text.trim_end(),
            self.model_text.trim_end(),
            self.training_text.trim_end()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_lookup_accepts_camel_case() {
        let node = Node::new("conv1", "conv2d").with_param("inChannels", ParamValue::Number(1.0));
        assert_eq!(node.number_or("in_channels", 3.0), 1.0);
    }

    #[test]
    fn test_mismatched_param_type_uses_default() {
        let node = Node::new("fc", "linear")
            .with_param("in_features", ParamValue::Text("wide".into()));
        assert_eq!(node.number_or("in_features", 784.0), 784.0);
    }

    #[test]
    fn test_unsupported_param_values_fall_back_to_defaults() {
        let json = r#"{"nodes":[{"id":"fc","kind":"linear","parameters":{
            "in_features": null, "out_features": {"n": 10}, "bias": [[1, 2]]
        }}],"edges":[]}"#;
        let graph = Graph::from_json(json).unwrap().unwrap();
        let node = &graph.nodes[0];
        assert_eq!(node.number_or("in_features", 784.0), 784.0);
        assert_eq!(node.number_or("out_features", 128.0), 128.0);
        assert!(node.bool_or("bias", true));
    }

    #[test]
    fn test_text_renders_as_python_string() {
        assert_eq!(python_str("same"), r#""same""#);
        assert_eq!(python_str("a\u{7f}"), r#""a\x7f""#);
        assert_eq!(python_str("q\"\\\n"), r#""q\"\\\n""#);
        assert_eq!(python_str("é→😀"), r#""\xe9\u2192\U0001f600""#);
        let list = ParamValue::List(vec![Scalar::Text("a\u{301}".into())]);
        assert_eq!(list.to_string(), r#"("a\u0301",)"#);
    }

    #[test]
    fn test_missing_category_comes_from_catalog() {
        let json = r#"{"nodes":[{"id":"a","kind":"relu"}],"edges":[]}"#;
        let graph = Graph::from_json(json).unwrap().unwrap();
        assert_eq!(graph.nodes[0].effective_category(), Some(Category::Activation));
    }

    #[test]
    fn test_null_document_parses_to_none() {
        assert!(Graph::from_json("null").unwrap().is_none());
    }

    #[test]
    fn test_param_value_renders_python_literals() {
        assert_eq!(ParamValue::Number(784.0).to_string(), "784");
        assert_eq!(ParamValue::Number(0.001).to_string(), "0.001");
        assert_eq!(ParamValue::Bool(false).to_string(), "False");
        let kernel = ParamValue::List(vec![Scalar::Number(3.0), Scalar::Number(5.0)]);
        assert_eq!(kernel.to_string(), "(3, 5)");
    }
}
