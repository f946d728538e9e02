pub mod imports;
pub mod model;
pub mod training;

pub use imports::resolve_imports;
pub use model::{MODEL_CLASS, synthesize_model};
pub use training::synthesize_training;

use tera::Tera;

pub fn template_engine() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("model", include_str!("../../templates/model.py.tera"))?;
    tera.add_raw_template("training", include_str!("../../templates/training.py.tera"))?;
    Ok(tera)
}
