use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("No graph was supplied to the compiler")]
    InvalidGraphReference,

    #[error("Template rendering failed: {0}")]
    Render(#[from] tera::Error),

    #[error("Graph JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}
