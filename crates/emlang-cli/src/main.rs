//! Emlang CLI entry point.

use std::{io, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, info};

use emlang_cli::{Args, Outcome, error_adapter::to_reportables};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
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

    info!(log_level:?; "Starting Emlang");
    debug!(args:?; "Parsed arguments");

    let mut stdout = io::stdout().lock();
    match emlang_cli::run(&args, &mut stdout) {
        Ok(Outcome::Success) => info!("Completed successfully"),
        Ok(Outcome::Failure) => process::exit(1),
        Err(err) => {
            let reporter = miette::GraphicalReportHandler::new();

            // Render each diagnostic independently
            for reportable in to_reportables(&err) {
                let mut writer = String::new();
                if reporter.render_report(&mut writer, &reportable).is_err() {
                    writer = reportable.to_string();
                }
                eprint!("{writer}");
            }

            process::exit(1);
        }
    }
}
