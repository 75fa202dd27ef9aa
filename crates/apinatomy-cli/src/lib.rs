//! CLI logic for the ApiNATOMY model tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use log::{info, warn};

use apinatomy::{ApinatomyError, Model, ModelBuilder, diagnostics::Severity};

/// Run the ApiNATOMY CLI application
///
/// Builds the input model, applies the requested scale and writes the
/// resolved JSON to the output file. Returns the built model so the caller
/// can inspect its diagnostics.
///
/// # Errors
///
/// Returns `ApinatomyError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Models that are not valid JSON objects or hold wrongly typed values
/// - Export errors
pub fn run(args: &Args) -> Result<Model, ApinatomyError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing model"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let builder = ModelBuilder::new(app_config);
    let mut model = builder.build_file(&args.input)?;
    if let Some(factor) = args.scale {
        model.graph_mut().scale(factor);
    }

    builder.write_json(&model, &args.output)?;

    let diagnostics = model.diagnostics();
    let errors = diagnostics.count(Severity::Error);
    let warnings = diagnostics.count(Severity::Warning);
    if errors > 0 {
        warn!(errors = errors, warnings = warnings; "Model built with errors");
    }
    info!(output_file = args.output, status:% = model.status(); "Model exported successfully");

    Ok(model)
}
