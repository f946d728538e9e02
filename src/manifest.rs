use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProgramEntry {
    pub id: String,
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Manifest {
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    pub programs: Vec<ProgramEntry>,
}

fn default_out_dir() -> String {
    "generated".to_string()
}

impl Manifest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    // Пути графов относительно каталога манифеста
    pub fn program_path(&self, base: &Path, entry: &ProgramEntry) -> PathBuf {
        base.join(&entry.path)
    }

    pub fn script_path(&self, base: &Path, entry: &ProgramEntry) -> PathBuf {
        base.join(&self.out_dir).join(format!("{}.py", entry.id))
    }
}
