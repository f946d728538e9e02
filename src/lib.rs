pub mod catalog;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod graph_ext;
pub mod manifest;
pub mod model;

pub use compiler::{Compiler, compile};
pub use error::CompileError;
pub use model::{Category, CompiledProgram, Edge, Graph, Node, ParamValue, Scalar};
