//! # pkgkit
//!
//! One interface over many OS package managers.
//!
//! - [`platform`] guesses the package manager of the local system from
//!   the kernel name and, on Linux, distribution release files
//! - [`registry`] maps a [`PackageManagerId`] to a [`Backend`] and picks
//!   the effective manager (override, then configuration, then detection)
//! - [`Verb`] is one of the six operations every backend supports:
//!   list, install, remove, update, upgrade, clean
//!
//! ## Example
//!
//! ```no_run
//! use pkgkit::{BackendContext, Verb, VerbKind, platform, registry};
//! # use pkgkit::backend::RecordingRunner;
//! use std::sync::Arc;
//!
//! # let runner = Arc::new(RecordingRunner::new());
//! let selection = registry::choose(None, None, platform::detect)?;
//! let verb = Verb::new(VerbKind::Upgrade, vec![])?;
//! let ctx = BackendContext::new(runner).with_dry_run(verb.default_dry_run());
//! let backend = registry::resolve(selection.id, ctx)?;
//! verb.apply(backend.as_ref())?;
//! # Ok::<(), pkgkit::Error>(())
//! ```

pub mod backend;
pub mod error;
pub mod id;
pub mod platform;
pub mod registry;
pub mod verb;

pub use backend::{Backend, BackendContext, CommandRunner, Invocation};
pub use error::{Error, ErrorCategory, Result};
pub use id::PackageManagerId;
pub use registry::{Selection, Source};
pub use verb::{Verb, VerbKind};
