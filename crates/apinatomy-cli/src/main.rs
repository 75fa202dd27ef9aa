//! ApiNATOMY CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use apinatomy::diagnostics::Severity;
use apinatomy_cli::{
    Args,
    error_adapter::{Reportable, log_reportables, to_reportables},
};

fn render(reportables: &[Reportable<'_>]) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in reportables {
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, reportable)
            .expect("Writing to String buffer is infallible");

        error!("{writer}");
    }
}

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting ApiNATOMY");
    debug!(args:?; "Parsed arguments");

    match apinatomy_cli::run(&args) {
        Ok(model) if args.strict && model.diagnostics().count(Severity::Error) > 0 => {
            render(&log_reportables(model.diagnostics(), Severity::Error));
            process::exit(1);
        }
        Ok(_) => info!("Completed successfully"),
        Err(err) => {
            render(&to_reportables(&err));
            process::exit(1);
        }
    }
}
