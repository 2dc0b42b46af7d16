//! Resolution of a selector into an ordered list of targets.

use crate::directory::NodeDirectory;
use crate::error::{Error, Result};
use crate::selector::NodeSelector;
use std::collections::HashSet;
use std::ops::Index;

/// One dispatch target: a node and the interface used to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub node: String,
    pub interface: String,
}

impl Target {
    pub fn new(node: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            interface: interface.into(),
        }
    }
}

/// The ordered, duplicate-free result of a resolution.
///
/// Order is the directory's canonical order, so the rank of a node is
/// reproducible across runs with the same configuration and selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTargets {
    targets: Vec<Target>,
    dropped: Vec<String>,
}

impl ResolvedTargets {
    /// Build from an explicit list, rejecting an empty one.
    pub fn from_targets(targets: Vec<Target>) -> Result<Self> {
        if targets.is_empty() {
            return Err(Error::NoTargets);
        }
        Ok(Self {
            targets,
            dropped: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    /// Node names in rank order.
    pub fn node_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.node.as_str()).collect()
    }

    /// Selected nodes that were dropped for lack of an interface.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }
}

impl Index<usize> for ResolvedTargets {
    type Output = Target;

    fn index(&self, rank: usize) -> &Target {
        &self.targets[rank]
    }
}

impl<'a> IntoIterator for &'a ResolvedTargets {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// Resolve a selector against a directory.
///
/// Inclusion is the union of the included nodes and the members of the
/// included groups, or every node when nothing is included. Exclusion
/// is built the same way and always wins. Nodes without an interface
/// are dropped with a warning. An empty result is an error.
pub fn resolve(directory: &NodeDirectory, selector: &NodeSelector) -> Result<ResolvedTargets> {
    selector.validate(directory)?;

    let included: Option<HashSet<&str>> = if selector.includes_everything() {
        None
    } else {
        Some(expand(
            directory,
            &selector.include_nodes,
            &selector.include_groups,
        ))
    };
    let excluded = expand(directory, &selector.exclude_nodes, &selector.exclude_groups);

    let mut targets = Vec::new();
    let mut dropped = Vec::new();

    for node in directory.nodes() {
        let name = node.name.as_str();
        if included.as_ref().is_some_and(|set| !set.contains(name)) || excluded.contains(name) {
            continue;
        }
        match node.interface() {
            Some(interface) => targets.push(Target::new(name, interface)),
            None => {
                log::warn!("node '{}' has no interface, skipping", name);
                dropped.push(name.to_string());
            }
        }
    }

    if targets.is_empty() {
        return Err(Error::NoTargets);
    }

    log::debug!(
        "resolved {} target(s): {}",
        targets.len(),
        targets
            .iter()
            .map(|t| t.node.as_str())
            .collect::<Vec<_>>()
            .join(",")
    );

    Ok(ResolvedTargets { targets, dropped })
}

fn expand<'a>(
    directory: &'a NodeDirectory,
    nodes: &'a [String],
    groups: &[String],
) -> HashSet<&'a str> {
    let mut set: HashSet<&str> = nodes.iter().map(String::as_str).collect();
    for group in groups {
        set.extend(directory.group_members(group));
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Node;
    use crate::selector::SelectorBuilder;

    fn cluster() -> NodeDirectory {
        NodeDirectory::from_nodes([
            Node::new("web1").with_groups(["web"]),
            Node::new("web2").with_groups(["web"]),
            Node::new("web3").with_groups(["web", "canary"]),
            Node::new("db1").with_groups(["db"]),
            Node::new("db2")
                .with_interfaces(["db2.internal"])
                .with_groups(["db"]),
        ])
        .unwrap()
    }

    fn names(targets: &ResolvedTargets) -> Vec<&str> {
        targets.node_names()
    }

    #[test]
    fn test_no_selectors_selects_all_in_canonical_order() {
        let dir = cluster();
        let targets = resolve(&dir, &NodeSelector::all()).unwrap();
        assert_eq!(names(&targets), vec!["web1", "web2", "web3", "db1", "db2"]);
    }

    #[test]
    fn test_exclusion_wins_over_inclusion() {
        let dir = cluster();
        let selector = NodeSelector {
            include_nodes: vec!["web1".into(), "web2".into()],
            exclude_nodes: vec!["web2".into()],
            ..Default::default()
        };
        let targets = resolve(&dir, &selector).unwrap();
        assert_eq!(names(&targets), vec!["web1"]);
    }

    #[test]
    fn test_group_minus_node() {
        let dir = cluster();
        let mut builder = SelectorBuilder::new(&dir);
        builder.include_groups("web").unwrap();
        builder.exclude_nodes("web3").unwrap();
        let targets = resolve(&dir, &builder.build()).unwrap();
        assert_eq!(names(&targets), vec!["web1", "web2"]);
    }

    #[test]
    fn test_exclude_group_from_everything() {
        let dir = cluster();
        let mut builder = SelectorBuilder::new(&dir);
        builder.exclude_groups("web").unwrap();
        let targets = resolve(&dir, &builder.build()).unwrap();
        assert_eq!(names(&targets), vec!["db1", "db2"]);
    }

    #[test]
    fn test_exclusion_order_does_not_matter() {
        let dir = cluster();
        let mut first = SelectorBuilder::new(&dir);
        first.exclude_groups("canary").unwrap();
        first.include_groups("web").unwrap();

        let mut second = SelectorBuilder::new(&dir);
        second.include_groups("web").unwrap();
        second.exclude_groups("canary").unwrap();

        assert_eq!(
            resolve(&dir, &first.build()).unwrap(),
            resolve(&dir, &second.build()).unwrap()
        );
    }

    #[test]
    fn test_overlapping_inclusions_are_deduplicated() {
        let dir = cluster();
        let selector = NodeSelector {
            include_nodes: vec!["db2".into(), "web1".into()],
            include_groups: vec!["web".into(), "db".into()],
            ..Default::default()
        };
        let targets = resolve(&dir, &selector).unwrap();
        assert_eq!(names(&targets), vec!["web1", "web2", "web3", "db1", "db2"]);
    }

    #[test]
    fn test_interfaces_are_resolved() {
        let dir = cluster();
        let selector = NodeSelector {
            include_groups: vec!["db".into()],
            ..Default::default()
        };
        let targets = resolve(&dir, &selector).unwrap();
        assert_eq!(targets[0], Target::new("db1", "db1"));
        assert_eq!(targets[1], Target::new("db2", "db2.internal"));
    }

    #[test]
    fn test_everything_excluded_is_no_targets() {
        let dir = cluster();
        let selector = NodeSelector {
            include_groups: vec!["db".into()],
            exclude_groups: vec!["db".into()],
            ..Default::default()
        };
        assert_eq!(resolve(&dir, &selector), Err(Error::NoTargets));
    }

    #[test]
    fn test_empty_directory_is_no_targets() {
        let dir = NodeDirectory::new();
        assert_eq!(resolve(&dir, &NodeSelector::all()), Err(Error::NoTargets));
    }

    #[test]
    fn test_unknown_names_fail_resolution() {
        let dir = cluster();
        let selector = NodeSelector {
            include_nodes: vec!["web9".into()],
            ..Default::default()
        };
        assert_eq!(
            resolve(&dir, &selector),
            Err(Error::UnknownNode {
                name: "web9".into()
            })
        );
    }

    #[test]
    fn test_node_without_interface_is_dropped() {
        let dir = NodeDirectory::from_nodes([
            Node::new("a"),
            Node::new("b").with_interfaces(Vec::<String>::new()),
            Node::new("c"),
        ])
        .unwrap();
        let targets = resolve(&dir, &NodeSelector::all()).unwrap();
        assert_eq!(names(&targets), vec!["a", "c"]);
        assert_eq!(targets.dropped(), ["b".to_string()]);
    }

    #[test]
    fn test_only_interfaceless_nodes_is_no_targets() {
        let dir =
            NodeDirectory::from_nodes([Node::new("b").with_interfaces(Vec::<String>::new())])
                .unwrap();
        assert_eq!(resolve(&dir, &NodeSelector::all()), Err(Error::NoTargets));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let dir = cluster();
        let selector = NodeSelector {
            include_groups: vec!["web".into(), "db".into()],
            exclude_nodes: vec!["db1".into()],
            ..Default::default()
        };
        let first = resolve(&dir, &selector).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&dir, &selector).unwrap(), first);
        }
    }

    #[test]
    fn test_from_targets_rejects_empty() {
        assert_eq!(
            ResolvedTargets::from_targets(Vec::new()),
            Err(Error::NoTargets)
        );
        let targets = ResolvedTargets::from_targets(vec![Target::new("x", "x")]).unwrap();
        assert_eq!(targets.len(), 1);
    }
}
