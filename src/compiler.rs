use crate::codegen::{self, resolve_imports, synthesize_model, synthesize_training};
use crate::error::CompileError;
use crate::model::{CompiledProgram, Graph};
use log::info;
use tera::Tera;

// Хранит только Tera, поэтому один экземпляр можно делить между потоками
pub struct Compiler {
    tera: Tera,
}

impl Compiler {
    pub fn new() -> Result<Self, CompileError> {
        Ok(Self {
            tera: codegen::template_engine()?,
        })
    }

    pub fn compile(&self, graph: Option<&Graph>) -> Result<CompiledProgram, CompileError> {
        let graph = graph.ok_or(CompileError::InvalidGraphReference)?;
        info!(
            "Compiling graph with {} nodes and {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );

        // Три независимых прохода по одному и тому же снимку графа
        Ok(CompiledProgram {
            imports_text: resolve_imports(&graph.nodes),
            model_text: synthesize_model(&self.tera, &graph.nodes, &graph.edges)?,
            training_text: synthesize_training(&self.tera, &graph.nodes)?,
        })
    }

    pub fn compile_json(&self, json: &str) -> Result<CompiledProgram, CompileError> {
        let graph = Graph::from_json(json)?;
        self.compile(graph.as_ref())
    }
}

pub fn compile(graph: Option<&Graph>) -> Result<CompiledProgram, CompileError> {
    Compiler::new()?.compile(graph)
}
