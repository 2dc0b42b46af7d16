//! Include/exclude selectors for nodes and groups.
//!
//! Selectors are collected while command-line options are processed and
//! frozen into a [`NodeSelector`] before resolution. Every name is
//! checked against the directory as it is added, so a typo fails
//! before anything runs.

use crate::directory::NodeDirectory;
use crate::error::{Error, Result};

/// A frozen include/exclude selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSelector {
    pub include_nodes: Vec<String>,
    pub include_groups: Vec<String>,
    pub exclude_nodes: Vec<String>,
    pub exclude_groups: Vec<String>,
}

impl NodeSelector {
    /// Select every known node.
    pub fn all() -> Self {
        Self::default()
    }

    /// True when no inclusion was given, meaning "all nodes".
    pub fn includes_everything(&self) -> bool {
        self.include_nodes.is_empty() && self.include_groups.is_empty()
    }

    /// Re-check every name against a directory.
    pub fn validate(&self, directory: &NodeDirectory) -> Result<()> {
        for name in self.include_nodes.iter().chain(&self.exclude_nodes) {
            check_node(directory, name)?;
        }
        for name in self.include_groups.iter().chain(&self.exclude_groups) {
            check_group(directory, name)?;
        }
        Ok(())
    }
}

/// Builds a [`NodeSelector`], validating names as they arrive.
///
/// Each method accepts a comma-separated list and may be called
/// repeatedly; duplicates are dropped.
#[derive(Debug)]
pub struct SelectorBuilder<'a> {
    directory: &'a NodeDirectory,
    selector: NodeSelector,
}

impl<'a> SelectorBuilder<'a> {
    pub fn new(directory: &'a NodeDirectory) -> Self {
        Self {
            directory,
            selector: NodeSelector::default(),
        }
    }

    /// Include nodes by name.
    pub fn include_nodes(&mut self, list: &str) -> Result<&mut Self> {
        for name in split_list(list) {
            check_node(self.directory, name)?;
            push_unique(&mut self.selector.include_nodes, name);
        }
        Ok(self)
    }

    /// Include every member of the named groups.
    pub fn include_groups(&mut self, list: &str) -> Result<&mut Self> {
        for name in split_list(list) {
            check_group(self.directory, name)?;
            push_unique(&mut self.selector.include_groups, name);
        }
        Ok(self)
    }

    /// Exclude nodes by name.
    pub fn exclude_nodes(&mut self, list: &str) -> Result<&mut Self> {
        for name in split_list(list) {
            check_node(self.directory, name)?;
            push_unique(&mut self.selector.exclude_nodes, name);
        }
        Ok(self)
    }

    /// Exclude every member of the named groups.
    pub fn exclude_groups(&mut self, list: &str) -> Result<&mut Self> {
        for name in split_list(list) {
            check_group(self.directory, name)?;
            push_unique(&mut self.selector.exclude_groups, name);
        }
        Ok(self)
    }

    /// Freeze the selection.
    pub fn build(&self) -> NodeSelector {
        self.selector.clone()
    }
}

/// Split a comma-separated list, ignoring empty items and surrounding blanks.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

fn check_node(directory: &NodeDirectory, name: &str) -> Result<()> {
    if directory.node(name).is_none() {
        return Err(Error::UnknownNode {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn check_group(directory: &NodeDirectory, name: &str) -> Result<()> {
    if !directory.has_group(name) {
        return Err(Error::UnknownGroup {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Node;

    fn directory() -> NodeDirectory {
        NodeDirectory::from_nodes([
            Node::new("a").with_groups(["g1"]),
            Node::new("b").with_groups(["g1", "g2"]),
            Node::new("c"),
        ])
        .unwrap()
    }

    #[test]
    fn test_split_list() {
        let items: Vec<_> = split_list(" a, b,,c ,").collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_builder_collects_and_dedups() {
        let dir = directory();
        let mut builder = SelectorBuilder::new(&dir);
        builder.include_nodes("a,b").unwrap();
        builder.include_nodes("b").unwrap();
        builder.exclude_groups("g2").unwrap();
        let selector = builder.build();
        assert_eq!(selector.include_nodes, vec!["a", "b"]);
        assert_eq!(selector.exclude_groups, vec!["g2"]);
        assert!(!selector.includes_everything());
    }

    #[test]
    fn test_unknown_node_rejected_at_build_time() {
        let dir = directory();
        let mut builder = SelectorBuilder::new(&dir);
        let err = builder.include_nodes("a,zz").unwrap_err();
        assert_eq!(err, Error::UnknownNode { name: "zz".into() });

        let err = builder.exclude_nodes("yy").unwrap_err();
        assert_eq!(err, Error::UnknownNode { name: "yy".into() });
    }

    #[test]
    fn test_unknown_group_rejected_at_build_time() {
        let dir = directory();
        let mut builder = SelectorBuilder::new(&dir);
        let err = builder.include_groups("g3").unwrap_err();
        assert_eq!(err, Error::UnknownGroup { name: "g3".into() });
        assert!(builder.exclude_groups("g1, g2").is_ok());
    }

    #[test]
    fn test_validate_manual_selector() {
        let dir = directory();
        let selector = NodeSelector {
            exclude_groups: vec!["ghost".into()],
            ..Default::default()
        };
        assert_eq!(
            selector.validate(&dir),
            Err(Error::UnknownGroup {
                name: "ghost".into()
            })
        );
        assert!(NodeSelector::all().validate(&dir).is_ok());
    }
}
