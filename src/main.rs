use anyhow::Context;
use flowforge::Compiler;
use flowforge::manifest::{Manifest, ProgramEntry};
use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

fn export_program(compiler: &Compiler, manifest: &Manifest, base: &Path, entry: &ProgramEntry) -> anyhow::Result<()> {
    let graph_path = manifest.program_path(base, entry);
    let json = fs::read_to_string(&graph_path)
        .with_context(|| format!("Failed to read graph {}", graph_path.display()))?;

    let program = compiler
        .compile_json(&json)
        .with_context(|| format!("Failed to compile program '{}'", entry.id))?;

    let script_path = manifest.script_path(base, entry);
    fs::write(&script_path, program.source())
        .with_context(|| format!("Failed to write {}", script_path.display()))?;
    info!("Exported '{}' to {}", entry.id, script_path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Загрузка манифеста
    let manifest_path = std::env::args().nth(1).unwrap_or_else(|| "assets/export.json".to_string());
    let manifest_json = fs::read_to_string(&manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path))?;
    let manifest = Manifest::from_json(&manifest_json)?;
    let base = Path::new(&manifest_path).parent().unwrap_or_else(|| Path::new("."));

    // 2. Параллельная компиляция всех программ
    fs::create_dir_all(base.join(&manifest.out_dir))?;
    let compiler = Compiler::new()?;

    let failures: Vec<_> = manifest
        .programs
        .par_iter()
        .filter_map(|entry| export_program(&compiler, &manifest, base, entry).err())
        .collect();

    for err in &failures {
        error!("{:#}", err);
    }
    if !failures.is_empty() {
        return Err(anyhow::anyhow!("{} of {} exports failed", failures.len(), manifest.programs.len()));
    }
    info!("Exported {} programs", manifest.programs.len());
    Ok(())
}
