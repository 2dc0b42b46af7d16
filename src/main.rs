mod cli;
mod commands;
mod config;
mod runner;
mod signal;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };

    let outcome = match cli.command {
        Command::Ssh(args) => commands::ssh::run(&ctx, args),
        Command::Pkg(args) => commands::pkg::run(&ctx, args),
        Command::Nodes(args) => commands::nodes::run(&ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "herd", &mut io::stdout());
            Ok(0)
        }
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            ui::error(&format!("{e:#}"));
            if let Some(pkg_error) = e.downcast_ref::<pkgkit::Error>() {
                ui::dim(pkg_error.category().advice());
            }
            ExitCode::FAILURE
        }
    }
}
