//! `herd pkg`: package operations, on this machine or fanned out.
//!
//! Without `--local` the verb is sent to every selected node by running
//! `pkg_cmd` there; each node then detects its own package manager.

use crate::Context;
use crate::cli::PkgArgs;
use crate::config::Config;
use crate::runner::ProcessRunner;
use crate::ui;
use anyhow::{Context as _, Result};
use fanout::{DispatchOptions, RemoteShell};
use nodeset::ResolvedTargets;
use pkgkit::{
    Backend, BackendContext, CommandRunner, PackageManagerId, Selection, Verb, platform, registry,
};
use std::sync::Arc;

pub fn run(ctx: &Context, args: PkgArgs) -> Result<u8> {
    let verb = Verb::new(args.verb_kind(), args.packages.clone())?;
    let config = Config::load(ctx.config.as_deref())?;

    if let Some(name) = &args.manager {
        name.parse::<PackageManagerId>()?;
    }

    if args.local {
        run_local(ctx, &config, &args, &verb)
    } else {
        run_remote(ctx, &config, &args, &verb)
    }
}

/// The backend a local run uses, and whether it only previews.
struct LocalPlan {
    selection: Selection,
    backend: Box<dyn Backend>,
    dry_run: bool,
}

fn plan_local<F>(
    config: &Config,
    args: &PkgArgs,
    verb: &Verb,
    runner: Arc<dyn CommandRunner>,
    detect: F,
) -> Result<LocalPlan>
where
    F: FnOnce() -> pkgkit::Result<PackageManagerId>,
{
    let selection = registry::choose(
        args.manager.as_deref(),
        config.package_manager.as_deref(),
        detect,
    )?;
    let dry_run = verb.default_dry_run() && !args.fix;
    let backend = registry::resolve(selection.id, BackendContext::new(runner).with_dry_run(dry_run))?;
    Ok(LocalPlan {
        selection,
        backend,
        dry_run,
    })
}

fn run_local(ctx: &Context, config: &Config, args: &PkgArgs, verb: &Verb) -> Result<u8> {
    let runner = Arc::new(ProcessRunner::new(args.dispatch.unix));
    let plan = plan_local(config, args, verb, runner, platform::detect)?;

    if plan.dry_run && !ctx.quiet {
        ui::info(&format!(
            "showing available upgrades ({}), use --fix to upgrade",
            plan.selection.id
        ));
    }

    verb.apply(plan.backend.as_ref())?;
    Ok(0)
}

/// Everything a fan-out needs: where, through what, and which command.
struct RemotePlan {
    targets: ResolvedTargets,
    shell: RemoteShell,
    command: Vec<String>,
    options: DispatchOptions,
}

fn plan_remote(config: &Config, args: &PkgArgs, verb: &Verb) -> Result<RemotePlan> {
    let (directory, targets) = super::resolve(config, &args.selectors)?;
    let command = remote_command(config, args, verb)?;
    let shell = super::ssh::remote_shell(config, None)?
        .with_local_node(super::local_node(config, &directory));
    Ok(RemotePlan {
        targets,
        shell,
        command,
        options: super::dispatch_options(config, &args.dispatch, false),
    })
}

fn run_remote(ctx: &Context, config: &Config, args: &PkgArgs, verb: &Verb) -> Result<u8> {
    let RemotePlan {
        targets,
        shell,
        command,
        options,
    } = plan_remote(config, args, verb)?;

    let report = super::dispatch(ctx, &targets, options, |rank, target| {
        shell.task(rank, target, &command)
    })?;
    Ok(report.exit_code())
}

/// `pkg_cmd` plus the verb, each word shell-quoted for the remote shell.
fn remote_command(config: &Config, args: &PkgArgs, verb: &Verb) -> Result<Vec<String>> {
    let mut words = shell_words::split(&config.pkg_cmd)
        .with_context(|| format!("Invalid pkg_cmd: {}", config.pkg_cmd))?;
    words.extend(verb.to_args(args.fix));
    if let Some(name) = &args.manager {
        words.push("--manager".to_string());
        words.push(name.clone());
    }
    Ok(words
        .iter()
        .map(|w| shell_words::quote(w).into_owned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use fanout::{Dispatcher, OutputSink, SharedBuffer, TaskStatus};
    use pkgkit::backend::RecordingRunner;
    use pkgkit::{Error, Source};

    fn pkg_args(argv: &[&str]) -> PkgArgs {
        let cli = Cli::try_parse_from(["herd", "pkg"].iter().chain(argv)).unwrap();
        match cli.command {
            Command::Pkg(args) => args,
            _ => panic!("expected pkg"),
        }
    }

    fn verb(args: &PkgArgs) -> Verb {
        Verb::new(args.verb_kind(), args.packages.clone()).unwrap()
    }

    #[test]
    fn test_remote_command_carries_verb() {
        let config = Config::default();
        let args = pkg_args(&["-i", "vim", "two words"]);
        assert_eq!(
            remote_command(&config, &args, &verb(&args)).unwrap(),
            vec!["herd", "pkg", "--local", "-i", "vim", "'two words'"]
        );
    }

    #[test]
    fn test_remote_upgrade_fix_and_manager() {
        let config = Config::parse("pkg_cmd = \"/opt/herd/bin/herd pkg --local\"").unwrap();
        let args = pkg_args(&["-U", "--fix", "-m", "yum"]);
        assert_eq!(
            remote_command(&config, &args, &verb(&args)).unwrap(),
            vec![
                "/opt/herd/bin/herd",
                "pkg",
                "--local",
                "-U",
                "--fix",
                "--manager",
                "yum"
            ]
        );
    }

    #[test]
    fn test_upgrade_without_fix_stays_dry() {
        let args = pkg_args(&["-U"]);
        assert!(verb(&args).default_dry_run() && !args.fix);
        let config = Config::default();
        assert_eq!(
            remote_command(&config, &args, &verb(&args)).unwrap(),
            vec!["herd", "pkg", "--local", "-U"]
        );
    }

    #[test]
    fn test_install_without_names_is_a_usage_error() {
        let args = pkg_args(&["-i"]);
        let err = Verb::new(args.verb_kind(), args.packages).unwrap_err();
        assert_eq!(err.category(), pkgkit::ErrorCategory::Usage);
    }

    fn local(config: &str, argv: &[&str], detected: PackageManagerId) -> (LocalPlan, Vec<String>) {
        let config = Config::parse(config).unwrap();
        let args = pkg_args(argv);
        let verb = verb(&args);
        let runner = Arc::new(RecordingRunner::new());
        let plan = plan_local(&config, &args, &verb, runner.clone(), || Ok(detected)).unwrap();
        verb.apply(plan.backend.as_ref()).unwrap();
        (plan, runner.commands())
    }

    #[test]
    fn test_local_install_uses_detected_manager() {
        let (plan, commands) = local("", &["--local", "-i", "vim"], PackageManagerId::AptGet);
        assert_eq!(plan.selection.source, Source::Detected);
        assert!(!plan.dry_run);
        assert_eq!(
            commands,
            vec!["DEBIAN_FRONTEND=noninteractive apt-get -y install vim"]
        );
    }

    #[test]
    fn test_local_upgrade_previews_until_fixed() {
        let config = "package_manager = \"pacman\"";
        let (plan, commands) = local(config, &["--local", "-U"], PackageManagerId::AptGet);
        assert_eq!(plan.selection.source, Source::Configured);
        assert!(plan.dry_run);
        assert_eq!(commands, vec!["pacman -Qu"]);

        let (plan, commands) = local(config, &["--local", "-U", "--fix"], PackageManagerId::AptGet);
        assert!(!plan.dry_run);
        assert_eq!(commands, vec!["pacman -Su --noconfirm"]);
    }

    #[test]
    fn test_local_override_beats_config() {
        let (plan, commands) = local(
            "package_manager = \"pacman\"",
            &["--local", "-C", "-m", "brew"],
            PackageManagerId::AptGet,
        );
        assert_eq!(plan.selection.source, Source::Override);
        assert_eq!(plan.backend.id(), PackageManagerId::Brew);
        assert_eq!(commands, vec!["brew cleanup"]);
    }

    #[test]
    fn test_local_unsupported_manager_runs_nothing() {
        let config = Config::parse("package_manager = \"portage\"").unwrap();
        let args = pkg_args(&["--local", "-u"]);
        let runner = Arc::new(RecordingRunner::new());
        let err = plan_local(&config, &args, &verb(&args), runner.clone(), || {
            Ok(PackageManagerId::AptGet)
        })
        .err()
        .unwrap();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedManager { .. })
        ));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_remote_fan_out_reaches_every_selected_node() {
        let config = Config::parse(
            r#"
local_node = "web1"

[[node]]
name = "web1"
groups = ["web"]

[[node]]
name = "web2"
interfaces = ["web2-mgmt"]
groups = ["web"]

[[node]]
name = "db1"
"#,
        )
        .unwrap();
        let args = pkg_args(&["-i", "vim", "-g", "web"]);
        let plan = plan_remote(&config, &args, &verb(&args)).unwrap();
        assert_eq!(plan.targets.node_names(), vec!["web1", "web2"]);

        let buf = SharedBuffer::new();
        let options = DispatchOptions {
            dry_run: true,
            max_concurrency: Some(1),
            ..plan.options
        };
        let report = Dispatcher::new(options)
            .with_sink(OutputSink::from_writer(buf.clone()))
            .run(&plan.targets, |rank, target| {
                plan.shell.task(rank, target, &plan.command)
            })
            .unwrap();

        assert!(report.results.iter().all(|r| r.status == TaskStatus::DryRun));
        let transcript = buf.to_string_lossy();
        let lines: Vec<&str> = transcript.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "sh -c 'herd pkg --local -i vim'");
        assert!(lines[1].starts_with("ssh "));
        assert!(lines[1].ends_with(" web2-mgmt herd pkg --local -i vim"));
    }
}
