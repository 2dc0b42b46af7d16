//! # nodeset
//!
//! Node directory and node-set resolution for cluster tools.
//!
//! A [`NodeDirectory`] holds every known node with its interfaces and
//! group memberships. A [`NodeSelector`] names nodes and groups to
//! include or exclude, and [`resolve`] turns the two into an ordered,
//! duplicate-free [`ResolvedTargets`] list.
//!
//! ## Example
//!
//! ```
//! use nodeset::{Node, NodeDirectory, SelectorBuilder, resolve};
//!
//! let directory = NodeDirectory::from_nodes([
//!     Node::new("web1").with_groups(["web"]),
//!     Node::new("web2").with_groups(["web"]),
//!     Node::new("web3").with_groups(["web"]),
//! ])?;
//!
//! let mut builder = SelectorBuilder::new(&directory);
//! builder.include_groups("web")?.exclude_nodes("web3")?;
//!
//! let targets = resolve(&directory, &builder.build())?;
//! assert_eq!(targets.node_names(), vec!["web1", "web2"]);
//! # Ok::<(), nodeset::Error>(())
//! ```
//!
//! ## Rules
//!
//! - No inclusion at all selects every node.
//! - Exclusion always wins, whatever the order selectors were given in.
//! - Unknown names are rejected when the selector is built.
//! - An empty result is [`Error::NoTargets`].

pub mod directory;
pub mod error;
pub mod resolver;
pub mod selector;

pub use directory::{Node, NodeDirectory};
pub use error::{Error, Result};
pub use resolver::{ResolvedTargets, Target, resolve};
pub use selector::{NodeSelector, SelectorBuilder, split_list};
