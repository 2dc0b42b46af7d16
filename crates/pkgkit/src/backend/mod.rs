//! Backend abstraction for OS package managers.
//!
//! Every package manager speaks the same six verbs through the
//! [`Backend`] trait. A backend only decides *which* commands to run;
//! running them goes through a [`CommandRunner`], so the real process
//! runner lives in the binary and tests use [`RecordingRunner`].
//!
//! # Testing
//!
//! ```
//! use pkgkit::backend::{Backend, BackendContext, RecordingRunner};
//! use pkgkit::backend::apt_get::AptGet;
//! use std::sync::Arc;
//!
//! let runner = Arc::new(RecordingRunner::new());
//! let apt = AptGet::new(BackendContext::new(runner.clone()));
//! apt.install(&["curl".to_string()]).unwrap();
//!
//! assert_eq!(runner.commands(), vec!["DEBIAN_FRONTEND=noninteractive apt-get -y install curl"]);
//! ```

pub mod apt_get;
pub mod brew;
pub mod bsdpkg;
pub mod pacman;
pub mod yum;
pub mod zypper;

use crate::error::{Error, Result};
use crate::id::PackageManagerId;
use std::sync::{Arc, Mutex, PoisonError};

/// One package-manager command: program, arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
        }
    }

    /// Append package names as trailing arguments.
    #[must_use]
    pub fn packages(mut self, names: &[String]) -> Self {
        self.args.extend(names.iter().cloned());
        self
    }

    /// Set an environment variable for this command only.
    #[must_use]
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Render as a replayable shell line, `KEY=value prog args...`.
    pub fn display(&self) -> String {
        let env = self.env.iter().map(|(k, v)| format!("{k}={}", shell_words::quote(v)));
        let argv = std::iter::once(shell_words::quote(&self.program).into_owned())
            .chain(self.args.iter().map(|a| shell_words::quote(a).into_owned()));
        env.chain(argv).collect::<Vec<_>>().join(" ")
    }
}

/// Runs package-manager commands.
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion.
    ///
    /// # Errors
    ///
    /// Returns `Error::CommandFailed` on a non-zero exit and `Error::Io`
    /// when the program cannot be started.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// What every backend needs: a runner and the dry-run toggle.
#[derive(Clone)]
pub struct BackendContext {
    runner: Arc<dyn CommandRunner>,
    /// Only `upgrade` consults this: in dry-run it lists available
    /// upgrades instead of applying them.
    pub dry_run: bool,
}

impl BackendContext {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one command, logging it first.
    pub fn run(&self, invocation: &Invocation) -> Result<()> {
        log::debug!("running {}", invocation.display());
        self.runner.run(invocation)
    }
}

impl std::fmt::Debug for BackendContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendContext")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// The uniform six-verb interface over an OS package manager.
pub trait Backend: Send + Sync {
    /// Which package manager this is.
    fn id(&self) -> PackageManagerId;

    /// List installed packages, or only the named ones.
    fn list(&self, packages: &[String]) -> Result<()>;

    /// Install the named packages.
    fn install(&self, packages: &[String]) -> Result<()>;

    /// Remove the named packages.
    fn remove(&self, packages: &[String]) -> Result<()>;

    /// Refresh the package database.
    fn update(&self) -> Result<()>;

    /// Upgrade installed packages; in dry-run, show what would change.
    fn upgrade(&self) -> Result<()>;

    /// Clean the package cache.
    fn clean(&self) -> Result<()>;
}

/// Runner that records commands instead of running them.
///
/// Commands whose program matches one registered with
/// [`RecordingRunner::fail_on`] report `Error::CommandFailed`.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    failing: Vec<String>,
}

impl RecordingRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` fail.
    #[must_use]
    pub fn fail_on(mut self, program: &str) -> Self {
        self.failing.push(program.to_string());
        self
    }

    /// Everything run so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Everything run so far, rendered as shell lines.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(Invocation::display).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());

        if self.failing.contains(&invocation.program) {
            return Err(Error::CommandFailed {
                command: invocation.display(),
                status: "exit status 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A context around a fresh recording runner.
    pub fn context(dry_run: bool) -> (Arc<RecordingRunner>, BackendContext) {
        let runner = Arc::new(RecordingRunner::new());
        let ctx = BackendContext::new(runner.clone()).with_dry_run(dry_run);
        (runner, ctx)
    }

    pub fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_arguments() {
        let inv = Invocation::new("pkg_add", ["-r"]).packages(&["two words".to_string()]);
        assert_eq!(inv.display(), "pkg_add -r 'two words'");
    }

    #[test]
    fn test_display_includes_env() {
        let inv = Invocation::new("apt-get", ["clean"]).env("DEBIAN_FRONTEND", "noninteractive");
        assert_eq!(inv.display(), "DEBIAN_FRONTEND=noninteractive apt-get clean");
    }

    #[test]
    fn test_recording_runner_failure() {
        let runner = RecordingRunner::new().fail_on("yum");
        assert!(runner.run(&Invocation::new("rpm", ["-qa"])).is_ok());

        let err = runner.run(&Invocation::new("yum", ["makecache"])).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { ref command, .. } if command == "yum makecache"));
        assert_eq!(runner.calls().len(), 2);
    }
}
