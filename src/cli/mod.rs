//! The milagold Command-Line Interface.
//!
//! Parses arguments, sets up logging, builds the [`HarnessConfig`] and hands
//! it to the orchestrator. Mismatches are reported but never turn into a
//! failing exit status; only setup errors do.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::MilagoldArgs;
use crate::cli::output::{announce, print_report, StdoutSink};
use crate::config::HarnessConfig;
use crate::orchestrator::{Orchestrator, Report};
use crate::process::SystemRunner;
use crate::Result;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    init_tracing();
    let args = MilagoldArgs::parse();

    if let Err(e) = execute(&args) {
        let report = miette::Report::new(e);
        eprintln!("{report:?}");
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("milagold=warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn execute(args: &MilagoldArgs) -> Result<Report> {
    let mut config = HarnessConfig::load(&args.root, args.config.as_deref())?;
    if args.mem {
        config.memcheck = true;
        config.validate()?;
    }

    let mode = args.mode();
    let mut sink = StdoutSink;
    announce(&mut sink, &mode, config.memcheck);

    let report = Orchestrator::new(&config, SystemRunner, &mut sink).run(&mode)?;
    print_report(&report, &config.root);
    Ok(report)
}
