use anyhow::{Context, Result};
use nodeset::{Node, NodeDirectory};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("herd"))
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("herd.toml"))
}

/// Configuration problems detected after parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("num_proc must be at least 1, got {0}")]
    NumProc(usize),

    #[error("ssh_cmd is empty")]
    EmptySshCmd,

    #[error("pkg_cmd is empty")]
    EmptyPkgCmd,

    #[error("package_manager: {0}")]
    PackageManager(String),

    #[error("{0}")]
    Nodes(#[from] nodeset::Error),
}

// ============================================================================
// File format
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Remote shell used to reach a node; the interface and command are appended
    #[serde(default = "default_ssh_cmd")]
    pub ssh_cmd: String,

    /// Extra options appended to `ssh_cmd`
    #[serde(default)]
    pub ssh_options: Option<String>,

    /// Default number of nodes to run on in parallel
    #[serde(default = "default_num_proc")]
    pub num_proc: usize,

    /// Package manager to use instead of detecting one
    #[serde(default)]
    pub package_manager: Option<String>,

    /// Name of the node herd itself runs on
    #[serde(default)]
    pub local_node: Option<String>,

    /// Command run on each node for `herd pkg`; the verb is appended
    #[serde(default = "default_pkg_cmd")]
    pub pkg_cmd: String,

    /// Groups that may exist without members
    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeEntry>,
}

/// One `[[node]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub name: String,
    /// Defaults to the node name; an explicit empty list leaves the node unreachable
    #[serde(default)]
    pub interfaces: Option<Vec<String>>,
    #[serde(default)]
    pub groups: Vec<String>,
}

fn default_ssh_cmd() -> String {
    "ssh -o ConnectTimeout=10 -x -q".to_string()
}

fn default_num_proc() -> usize {
    16
}

fn default_pkg_cmd() -> String {
    "herd pkg --local".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ssh_cmd: default_ssh_cmd(),
            ssh_options: None,
            num_proc: default_num_proc(),
            package_manager: None,
            local_node: None,
            pkg_cmd: default_pkg_cmd(),
            groups: Vec::new(),
            nodes: Vec::new(),
        }
    }
}

impl Config {
    /// Load the configuration file.
    ///
    /// An explicit path must exist. The default path may be missing, in
    /// which case the defaults apply and the directory is empty.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref()),
            None => {
                let path = default_config_path()?;
                if !path.exists() {
                    log::info!("no configuration at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::load_from(&path)
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        log::debug!(
            "loaded {} node(s) from {}",
            config.nodes.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.num_proc < 1 {
            return Err(ConfigError::NumProc(self.num_proc));
        }
        if self.ssh_cmd.trim().is_empty() {
            return Err(ConfigError::EmptySshCmd);
        }
        if self.pkg_cmd.trim().is_empty() {
            return Err(ConfigError::EmptyPkgCmd);
        }
        if let Some(name) = &self.package_manager {
            name.parse::<pkgkit::PackageManagerId>()
                .map_err(|e| ConfigError::PackageManager(e.to_string()))?;
        }
        self.directory()?;
        Ok(())
    }

    /// Build the node directory, nodes in file order.
    pub fn directory(&self) -> std::result::Result<NodeDirectory, ConfigError> {
        let mut directory = NodeDirectory::new();
        for entry in &self.nodes {
            let mut node = Node::new(&entry.name).with_groups(entry.groups.iter().cloned());
            if let Some(interfaces) = &entry.interfaces {
                node = node.with_interfaces(interfaces.iter().cloned());
            }
            directory.add_node(node)?;
        }
        for group in &self.groups {
            directory.declare_group(group.clone())?;
        }
        Ok(directory)
    }
}
