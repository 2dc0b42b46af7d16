//! Subcommands and the plumbing they share: node selection, local-node
//! detection, dispatch with progress, and the closing summary.

pub mod nodes;
pub mod pkg;
pub mod ssh;

use crate::Context;
use crate::cli::{DispatchArgs, SelectorArgs};
use crate::config::Config;
use crate::{runner, signal, ui};
use anyhow::Result;
use fanout::{
    CancelToken, DispatchOptions, DispatchProgress, DispatchReport, DispatchResult, Dispatcher,
    Task, TaskStatus,
};
use indicatif::{ProgressBar, ProgressStyle};
use nodeset::{NodeDirectory, NodeSelector, ResolvedTargets, SelectorBuilder, Target};
use std::time::Duration;

/// Turn selector flags into a validated selector.
///
/// Unknown node or group names fail here, before anything runs.
pub fn selector(directory: &NodeDirectory, args: &SelectorArgs) -> Result<NodeSelector> {
    let mut builder = SelectorBuilder::new(directory);
    for list in &args.nodes {
        builder.include_nodes(list)?;
    }
    for list in &args.groups {
        builder.include_groups(list)?;
    }
    for list in &args.exclude_nodes {
        builder.exclude_nodes(list)?;
    }
    for list in &args.exclude_groups {
        builder.exclude_groups(list)?;
    }
    Ok(builder.build())
}

/// Resolve selector flags against the configured directory.
pub fn resolve(config: &Config, args: &SelectorArgs) -> Result<(NodeDirectory, ResolvedTargets)> {
    let directory = config.directory()?;
    let selector = selector(&directory, args)?;
    let targets = nodeset::resolve(&directory, &selector)?;
    Ok((directory, targets))
}

/// The node herd runs on, if it is part of the cluster.
pub fn local_node(config: &Config, directory: &NodeDirectory) -> Option<String> {
    let hostname = if config.local_node.is_some() {
        None
    } else {
        runner::hostname()
            .map_err(|e| log::debug!("cannot determine hostname: {e:#}"))
            .ok()
    };
    find_local_node(config.local_node.as_deref(), hostname.as_deref(), directory)
}

fn find_local_node(
    configured: Option<&str>,
    hostname: Option<&str>,
    directory: &NodeDirectory,
) -> Option<String> {
    if let Some(name) = configured {
        if directory.node(name).is_none() {
            log::warn!("local_node '{name}' is not a configured node");
        }
        return Some(name.to_string());
    }
    let node = directory.find_host(hostname?)?;
    log::debug!("running on node {}", node.name);
    Some(node.name.clone())
}

/// Dispatch options from the command line, falling back to the config.
pub fn dispatch_options(config: &Config, args: &DispatchArgs, dry_run: bool) -> DispatchOptions {
    DispatchOptions {
        max_concurrency: Some(args.numproc.map_or(config.num_proc, |n| n as usize)),
        dry_run,
        tag_output: !args.no_nodename,
        stream_output: !args.aggregate,
        transcript: args.unix,
        timeout: args.timeout.map(Duration::from_secs),
    }
}

/// Progress bar advanced as tasks complete.
struct BarProgress(ProgressBar);

impl DispatchProgress for BarProgress {
    fn on_launch(&self, task: &Task) {
        self.0.set_message(task.node.clone());
    }

    fn on_complete(&self, _result: &DispatchResult) {
        self.0.inc(1);
    }
}

fn progress_bar(ctx: &Context, total: usize) -> ProgressBar {
    if ctx.quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Run one task per target, then print aggregated output and a summary.
///
/// Ctrl-C cancels the dispatch: running tasks are killed and the report
/// is still printed.
pub fn dispatch<F>(
    ctx: &Context,
    targets: &ResolvedTargets,
    options: DispatchOptions,
    build: F,
) -> Result<DispatchReport>
where
    F: Fn(usize, &Target) -> Task + Sync,
{
    let aggregate = !options.stream_output && !options.dry_run;

    let cancel = CancelToken::new();
    signal::install(&cancel);

    let bar = if aggregate {
        progress_bar(ctx, targets.len())
    } else {
        ProgressBar::hidden()
    };

    let dispatcher = Dispatcher::new(options)
        .with_cancel_token(cancel)
        .with_progress(BarProgress(bar.clone()));
    let report = dispatcher.run(targets, build)?;
    bar.finish_and_clear();

    if aggregate {
        fanout::render(&fanout::aggregate(&report.results), dispatcher.sink());
    }
    summarize(ctx, &report);
    Ok(report)
}

/// Print what went wrong, or with `-v`, that nothing did.
pub fn summarize(ctx: &Context, report: &DispatchReport) {
    if ctx.quiet {
        return;
    }

    if report.interrupted {
        ui::warn(&format!(
            "interrupted, {} not started",
            ui::count(report.cancelled(), "node")
        ));
    }

    let failures: Vec<&DispatchResult> = report.failures().collect();
    if !failures.is_empty() {
        let names: Vec<&str> = failures.iter().map(|r| r.node.as_str()).collect();
        ui::error(&format!(
            "{} failed: {}",
            ui::count(failures.len(), "node"),
            fanout::compact_nodes(&names)
        ));
        for failure in &failures {
            ui::dim(&format!("{}: {}", failure.node, failure.status));
        }
    } else if ctx.verbose > 0 && !report.interrupted {
        if report.results.iter().all(|r| r.status == TaskStatus::DryRun) {
            ui::info(&format!(
                "dry run, {} shown",
                ui::count(report.results.len(), "command")
            ));
        } else {
            ui::success(&format!(
                "{} succeeded",
                ui::count(report.succeeded(), "node")
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> Config {
        Config::parse(
            r#"
[[node]]
name = "web1"
groups = ["web"]
[[node]]
name = "web2"
groups = ["web"]
[[node]]
name = "web3"
interfaces = ["web3.example.org"]
groups = ["web"]
[[node]]
name = "db1"
groups = ["db"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_selector_flags_resolve_in_order() {
        let args = SelectorArgs {
            groups: vec!["web".to_string()],
            exclude_nodes: vec!["web3".to_string()],
            ..Default::default()
        };
        let (_, targets) = resolve(&cluster(), &args).unwrap();
        assert_eq!(targets.node_names(), vec!["web1", "web2"]);
    }

    #[test]
    fn test_comma_lists_and_repeats() {
        let args = SelectorArgs {
            nodes: vec!["db1,web2".to_string(), "web1".to_string()],
            ..Default::default()
        };
        let (_, targets) = resolve(&cluster(), &args).unwrap();
        assert_eq!(targets.node_names(), vec!["web1", "web2", "db1"]);
    }

    #[test]
    fn test_unknown_group_fails_before_dispatch() {
        let args = SelectorArgs {
            groups: vec!["cache".to_string()],
            ..Default::default()
        };
        let err = resolve(&cluster(), &args).unwrap_err();
        assert_eq!(
            err.downcast_ref::<nodeset::Error>(),
            Some(&nodeset::Error::UnknownGroup {
                name: "cache".to_string()
            })
        );
    }

    #[test]
    fn test_excluding_everything_is_an_error() {
        let args = SelectorArgs {
            exclude_groups: vec!["web,db".to_string()],
            ..Default::default()
        };
        let err = resolve(&cluster(), &args).unwrap_err();
        assert_eq!(
            err.downcast_ref::<nodeset::Error>(),
            Some(&nodeset::Error::NoTargets)
        );
    }

    #[test]
    fn test_find_local_node() {
        let directory = cluster().directory().unwrap();
        assert_eq!(
            find_local_node(None, Some("web2.example.org"), &directory),
            Some("web2".to_string())
        );
        assert_eq!(
            find_local_node(None, Some("web3.example.org"), &directory),
            Some("web3".to_string())
        );
        assert_eq!(find_local_node(None, Some("laptop"), &directory), None);
        assert_eq!(find_local_node(None, None, &directory), None);
        assert_eq!(
            find_local_node(Some("db1"), Some("web1"), &directory),
            Some("db1".to_string())
        );
    }

    #[test]
    fn test_dispatch_options() {
        let config = cluster();
        let args = DispatchArgs {
            aggregate: true,
            no_nodename: true,
            timeout: Some(30),
            ..Default::default()
        };
        let options = dispatch_options(&config, &args, false);
        assert_eq!(options.max_concurrency, Some(config.num_proc));
        assert!(!options.stream_output && !options.tag_output);
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));

        let args = DispatchArgs {
            numproc: Some(2),
            ..Default::default()
        };
        assert_eq!(dispatch_options(&config, &args, true).max_concurrency, Some(2));
    }
}
