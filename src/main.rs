//! `carthage` command-line entry point.
use std::process::ExitCode;

use clap::Parser;

use carthage::{cli, commands, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if let cli::Command::Version = args.command {
        let version = option_env!("CARTHAGE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        #[allow(clippy::print_stdout)]
        {
            println!("carthage {version}");
        }
        return ExitCode::SUCCESS;
    }

    logging::init_subscriber(
        args.verbose,
        &logging::RunHeader {
            command: args.command.name(),
            config: args.global.config_path.as_deref(),
            sys_root: &args.global.sys_root,
        },
    );
    let log = logging::Logger::new(args.command.name());

    let result = match &args.command {
        cli::Command::Plan => commands::plan::run(&args.global, &log),
        cli::Command::Graph => commands::graph::run(&args.global, &log),
        cli::Command::Apply(opts) => commands::apply::run(&args.global, opts, &log),
        cli::Command::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
