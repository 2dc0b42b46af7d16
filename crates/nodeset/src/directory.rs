//! The node directory: every known node, its interfaces and its groups.
//!
//! Nodes are kept in insertion order. That order is the canonical
//! enumeration order used for resolution, so it must come from the
//! configuration file and not from a hash map.

use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// A managed machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node name, unique within the directory
    pub name: String,
    /// Reachable interfaces (hostnames or addresses), preferred first
    pub interfaces: Vec<String>,
    /// Names of the groups this node belongs to
    pub groups: Vec<String>,
}

impl Node {
    /// Create a node reachable under its own name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            interfaces: vec![name.clone()],
            name,
            groups: Vec::new(),
        }
    }

    /// Replace the interfaces of this node.
    pub fn with_interfaces<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces = interfaces.into_iter().map(Into::into).collect();
        self
    }

    /// Add group memberships.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// The interface used to reach this node, if it has any.
    pub fn interface(&self) -> Option<&str> {
        self.interfaces.first().map(String::as_str)
    }

    /// Check group membership.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Read-only map of node names to interfaces and group memberships.
#[derive(Debug, Clone, Default)]
pub struct NodeDirectory {
    nodes: Vec<Node>,
    declared_groups: BTreeSet<String>,
}

impl NodeDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from nodes in canonical order.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut directory = Self::new();
        for node in nodes {
            directory.add_node(node)?;
        }
        Ok(directory)
    }

    /// Append a node. Names must be unique.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        validate_name(&node.name)?;
        for group in &node.groups {
            validate_name(group)?;
        }
        if self.node(&node.name).is_some() {
            return Err(Error::DuplicateNode { name: node.name });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Declare a group that may have no members.
    pub fn declare_group(&mut self, group: impl Into<String>) -> Result<()> {
        let group = group.into();
        validate_name(&group)?;
        self.declared_groups.insert(group);
        Ok(())
    }

    /// All nodes in canonical order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Whether the group exists, either declared or through a member.
    pub fn has_group(&self, group: &str) -> bool {
        self.declared_groups.contains(group) || self.nodes.iter().any(|n| n.in_group(group))
    }

    /// Members of a group in canonical order.
    pub fn group_members(&self, group: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.in_group(group))
            .map(|n| n.name.as_str())
            .collect()
    }


    /// Reverse lookup from an interface to the owning node.
    pub fn node_for_interface(&self, interface: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.interfaces.iter().any(|i| i == interface))
    }

    /// Find the node matching a hostname.
    ///
    /// Tries the full hostname against names and interfaces, then the
    /// short form (up to the first dot).
    pub fn find_host(&self, hostname: &str) -> Option<&Node> {
        let short = hostname.split('.').next().unwrap_or(hostname);
        [hostname, short].into_iter().find_map(|candidate| {
            self.node(candidate)
                .or_else(|| self.node_for_interface(candidate))
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "name is empty",
        });
    }
    if name.contains(',') || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "name may not contain commas or whitespace",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NodeDirectory {
        NodeDirectory::from_nodes([
            Node::new("web1").with_groups(["web"]),
            Node::new("web2")
                .with_interfaces(["10.0.0.2", "web2-mgmt"])
                .with_groups(["web", "batch"]),
            Node::new("db1").with_groups(["db"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_node_defaults_interface_to_name() {
        let node = Node::new("alpha");
        assert_eq!(node.interface(), Some("alpha"));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut dir = sample();
        let err = dir.add_node(Node::new("web1")).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateNode {
                name: "web1".into()
            }
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut dir = NodeDirectory::new();
        assert!(dir.add_node(Node::new("")).is_err());
        assert!(dir.add_node(Node::new("a,b")).is_err());
        assert!(dir.add_node(Node::new("ok").with_groups(["bad group"])).is_err());
        assert!(dir.declare_group(" ").is_err());
    }

    #[test]
    fn test_group_members_in_canonical_order() {
        let dir = sample();
        assert_eq!(dir.group_members("web"), vec!["web1", "web2"]);
        assert_eq!(dir.group_members("batch"), vec!["web2"]);
        assert!(dir.group_members("nope").is_empty());
    }

    #[test]
    fn test_declared_group_exists_without_members() {
        let mut dir = sample();
        assert!(!dir.has_group("spare"));
        dir.declare_group("spare").unwrap();
        assert!(dir.has_group("spare"));
    }

    #[test]
    fn test_node_for_interface() {
        let dir = sample();
        assert_eq!(dir.node_for_interface("web2-mgmt").unwrap().name, "web2");
        assert!(dir.node_for_interface("10.9.9.9").is_none());
    }

    #[test]
    fn test_find_host_uses_short_name() {
        let dir = sample();
        assert_eq!(dir.find_host("db1.example.com").unwrap().name, "db1");
        assert_eq!(dir.find_host("10.0.0.2").unwrap().name, "web2");
        assert!(dir.find_host("unknown.example.com").is_none());
    }
}
