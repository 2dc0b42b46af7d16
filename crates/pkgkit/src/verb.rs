//! The six package verbs, validated and ready to apply.

use crate::backend::Backend;
use crate::error::{Error, Result};
use std::fmt;

/// One package operation. Exactly one is performed per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    List(Vec<String>),
    Install(Vec<String>),
    Remove(Vec<String>),
    Update,
    Upgrade,
    Clean,
}

/// Verb selector without its arguments, as picked on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbKind {
    List,
    Install,
    Remove,
    Update,
    Upgrade,
    Clean,
}

impl VerbKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Install => "install",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Upgrade => "upgrade",
            Self::Clean => "clean",
        }
    }

    /// Short flag used to pass this verb to `herd pkg`.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::List => "-l",
            Self::Install => "-i",
            Self::Remove => "-R",
            Self::Update => "-u",
            Self::Upgrade => "-U",
            Self::Clean => "-C",
        }
    }
}

impl Verb {
    /// Build a verb from its kind and the remaining arguments.
    ///
    /// # Errors
    ///
    /// `install` and `remove` need at least one package name;
    /// `update`, `upgrade` and `clean` take none.
    pub fn new(kind: VerbKind, packages: Vec<String>) -> Result<Self> {
        let verb = kind.as_str();
        match kind {
            VerbKind::List => Ok(Self::List(packages)),
            VerbKind::Install | VerbKind::Remove if packages.is_empty() => {
                Err(Error::MissingPackages { verb })
            }
            VerbKind::Install => Ok(Self::Install(packages)),
            VerbKind::Remove => Ok(Self::Remove(packages)),
            _ if !packages.is_empty() => Err(Error::ExtraArguments { verb }),
            VerbKind::Update => Ok(Self::Update),
            VerbKind::Upgrade => Ok(Self::Upgrade),
            VerbKind::Clean => Ok(Self::Clean),
        }
    }

    pub fn kind(&self) -> VerbKind {
        match self {
            Self::List(_) => VerbKind::List,
            Self::Install(_) => VerbKind::Install,
            Self::Remove(_) => VerbKind::Remove,
            Self::Update => VerbKind::Update,
            Self::Upgrade => VerbKind::Upgrade,
            Self::Clean => VerbKind::Clean,
        }
    }

    pub fn packages(&self) -> &[String] {
        match self {
            Self::List(p) | Self::Install(p) | Self::Remove(p) => p,
            Self::Update | Self::Upgrade | Self::Clean => &[],
        }
    }

    /// Whether the verb runs in dry-run unless confirmed.
    ///
    /// Only `upgrade` does: unconfirmed, it shows the available upgrades.
    pub fn default_dry_run(&self) -> bool {
        matches!(self, Self::Upgrade)
    }

    /// Arguments that request this verb from `herd pkg` on another node.
    pub fn to_args(&self, confirmed: bool) -> Vec<String> {
        let mut args = vec![self.kind().flag().to_string()];
        if confirmed && self.default_dry_run() {
            args.push("--fix".to_string());
        }
        args.extend(self.packages().iter().cloned());
        args
    }

    /// Perform the verb with a backend.
    pub fn apply(&self, backend: &dyn Backend) -> Result<()> {
        log::info!("{} {}", backend.id(), self);
        match self {
            Self::List(p) => backend.list(p),
            Self::Install(p) => backend.install(p),
            Self::Remove(p) => backend.remove(p),
            Self::Update => backend.update(),
            Self::Upgrade => backend.upgrade(),
            Self::Clean => backend.clean(),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().as_str())?;
        for package in self.packages() {
            write!(f, " {package}")?;
        }
        Ok(())
    }
}
