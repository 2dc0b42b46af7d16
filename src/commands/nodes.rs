use crate::Context;
use crate::cli::NodesArgs;
use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use nodeset::{NodeDirectory, ResolvedTargets};
use serde::Serialize;
use std::io::{self, Write};

/// One resolved node, as printed.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NodeView {
    pub name: String,
    pub interface: String,
    pub groups: Vec<String>,
}

pub fn views(directory: &NodeDirectory, targets: &ResolvedTargets) -> Vec<NodeView> {
    targets
        .iter()
        .map(|target| NodeView {
            name: target.node.clone(),
            interface: target.interface.clone(),
            groups: directory
                .node(&target.node)
                .map(|n| n.groups.clone())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn run(ctx: &Context, args: NodesArgs) -> Result<u8> {
    let config = Config::load(ctx.config.as_deref())?;
    let (directory, targets) = super::resolve(&config, &args.selectors)?;
    let views = views(&directory, &targets);

    let mut out = io::stdout().lock();
    let written = if args.json {
        serde_json::to_string_pretty(&views)
            .map_err(io::Error::from)
            .and_then(|json| writeln!(out, "{json}"))
    } else {
        let width = views.iter().map(|v| v.name.len()).max().unwrap_or(0);
        views.iter().try_for_each(|view| {
            let name = format!("{:width$}", view.name);
            if view.name == view.interface {
                writeln!(out, "{}  {}", name.bold(), view.groups.join(",").dimmed())
            } else {
                writeln!(
                    out,
                    "{}  {}  {}",
                    name.bold(),
                    view.interface,
                    view.groups.join(",").dimmed()
                )
            }
        })
    };

    match written {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(0),
        other => {
            other?;
            Ok(0)
        }
    }
}
