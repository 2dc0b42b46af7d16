//! # fanout
//!
//! Bounded parallel dispatch of one command per node.
//!
//! The dispatcher splits every task into two roles:
//!
//! - **coordinating**: build the per-node command ([`RemoteShell::task`])
//!   and render it ([`format_command`]); in dry-run mode this is all
//!   that happens
//! - **executing**: run it through a [`TaskExecutor`], tagging each output
//!   line with the node name and recording the exit status
//!
//! A fixed number of worker slots claims ranks in order, so launch order
//! follows rank order and the concurrency ceiling is never exceeded. One
//! node failing never affects another; the [`DispatchReport`] holds one
//! [`DispatchResult`] per target.
//!
//! ## Example
//!
//! ```no_run
//! use fanout::{DispatchOptions, Dispatcher, RemoteShell};
//! use nodeset::{NodeDirectory, Node, NodeSelector, resolve};
//!
//! let directory = NodeDirectory::from_nodes([Node::new("web1"), Node::new("web2")])?;
//! let targets = resolve(&directory, &NodeSelector::all())?;
//!
//! let shell = RemoteShell::from_template("ssh -o ConnectTimeout=10")?;
//! let remote = vec!["uptime".to_string()];
//!
//! let dispatcher = Dispatcher::new(DispatchOptions {
//!     max_concurrency: Some(8),
//!     ..Default::default()
//! });
//! let report = dispatcher.run(&targets, |rank, target| shell.task(rank, target, &remote))?;
//! std::process::exit(i32::from(report.exit_code()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Aggregation
//!
//! With output streaming turned off, [`aggregate`] groups results with
//! identical output and [`render`] prints one block per group, labelled
//! with a compact node list such as `web[1-4],db2`.

pub mod aggregate;
pub mod cancel;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod result;
pub mod sink;
pub mod task;

pub use aggregate::{OutputGroup, aggregate, compact_nodes, render};
pub use cancel::CancelToken;
pub use dispatcher::{DispatchOptions, DispatchProgress, Dispatcher, NoProgress};
pub use error::{Error, Result};
pub use executor::{ExecContext, Execution, ProcessExecutor, TaskExecutor};
pub use result::{DispatchReport, DispatchResult, TaskStatus};
pub use sink::{OutputSink, SharedBuffer};
pub use task::{RemoteShell, Task, format_command};
