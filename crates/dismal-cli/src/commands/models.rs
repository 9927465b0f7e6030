//! List built-in dissonance models.

use dismal_core::{DissonanceModel, InterferenceModel};

/// Run the models command.
pub fn run() -> anyhow::Result<()> {
    println!("Available Models:");
    println!("=================");
    for model in InterferenceModel::ALL {
        let default = if model == InterferenceModel::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:12} {:12} - {}{default}", model.id(), model.name(), model.description());
    }
    Ok(())
}
