use clap::{ArgGroup, Args, Parser, Subcommand};
use clap_complete::Shell;
use pkgkit::VerbKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "herd")]
#[command(version)]
#[command(about = "Run commands and package operations across a cluster of nodes", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file [default: ~/.config/herd/herd.toml]
    #[arg(short, long, global = true, env = "HERD_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a shell command on every selected node
    Ssh(SshArgs),

    /// Perform a package operation on every selected node
    #[command(after_help = supported_managers_help())]
    Pkg(PkgArgs),

    /// Show the nodes a selection resolves to
    Nodes(NodesArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared arguments
// ============================================================================

/// Node selection. Every flag is repeatable and takes a comma-separated list.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectorArgs {
    /// Run on these nodes
    #[arg(short = 'n', long = "node", value_name = "LIST")]
    pub nodes: Vec<String>,

    /// Run on the members of these groups
    #[arg(short = 'g', long = "group", value_name = "LIST")]
    pub groups: Vec<String>,

    /// Skip these nodes
    #[arg(short = 'x', long = "exclude", value_name = "LIST")]
    pub exclude_nodes: Vec<String>,

    /// Skip the members of these groups
    #[arg(short = 'X', long = "exclude-group", value_name = "LIST")]
    pub exclude_groups: Vec<String>,
}

/// How tasks run and how their output is shown.
#[derive(Args, Debug, Clone, Default)]
pub struct DispatchArgs {
    /// Condense output: show identical output of several nodes once
    #[arg(short, long)]
    pub aggregate: bool,

    /// Do not prefix output lines with the node name
    #[arg(short = 'N', long)]
    pub no_nodename: bool,

    /// Echo every command as a shell line before it runs
    #[arg(long)]
    pub unix: bool,

    /// Number of nodes to run on in parallel [default: num_proc from config]
    #[arg(short = 'p', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub numproc: Option<u32>,

    /// Kill tasks that run longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

// ============================================================================
// Ssh
// ============================================================================

#[derive(Args, Debug)]
pub struct SshArgs {
    #[command(flatten)]
    pub selectors: SelectorArgs,

    #[command(flatten)]
    pub dispatch: DispatchArgs,

    /// Extra options for the remote shell command
    #[arg(short = 'o', long, value_name = "OPTS", allow_hyphen_values = true)]
    pub options: Option<String>,

    /// Show the command for every node without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

// ============================================================================
// Pkg
// ============================================================================

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("verb")
        .required(true)
        .args(["list", "install", "remove", "update", "upgrade", "clean"]),
))]
pub struct PkgArgs {
    /// List installed packages
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Install packages
    #[arg(short = 'i', long)]
    pub install: bool,

    /// Remove packages
    #[arg(short = 'R', long)]
    pub remove: bool,

    /// Refresh the package database
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Upgrade packages (shows available upgrades unless --fix is given)
    #[arg(short = 'U', long)]
    pub upgrade: bool,

    /// Clean the package cache
    #[arg(short = 'C', long, alias = "cleanup")]
    pub clean: bool,

    /// Package names
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,

    /// Perform the upgrade instead of showing it
    #[arg(short, long)]
    pub fix: bool,

    /// Use this package manager instead of the configured or detected one
    #[arg(short, long, value_name = "NAME")]
    pub manager: Option<String>,

    /// Operate on this machine instead of the selected nodes
    #[arg(long)]
    pub local: bool,

    #[command(flatten)]
    pub selectors: SelectorArgs,

    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

impl PkgArgs {
    pub fn verb_kind(&self) -> VerbKind {
        if self.list {
            VerbKind::List
        } else if self.install {
            VerbKind::Install
        } else if self.remove {
            VerbKind::Remove
        } else if self.update {
            VerbKind::Update
        } else if self.upgrade {
            VerbKind::Upgrade
        } else {
            VerbKind::Clean
        }
    }
}

fn supported_managers_help() -> String {
    let names: Vec<&str> = pkgkit::registry::supported()
        .iter()
        .map(pkgkit::PackageManagerId::as_str)
        .collect();
    format!("Supported package managers: {}", names.join(", "))
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Args, Debug)]
pub struct NodesArgs {
    #[command(flatten)]
    pub selectors: SelectorArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}
