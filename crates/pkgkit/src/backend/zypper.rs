//! SUSE: `zypper`, with `rpm` for listing.

use crate::backend::{Backend, BackendContext, Invocation};
use crate::error::Result;
use crate::id::PackageManagerId;

#[derive(Debug, Clone)]
pub struct Zypper {
    ctx: BackendContext,
}

impl Zypper {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }

    fn zypper(args: &[&str]) -> Invocation {
        Invocation::new("zypper", ["--non-interactive"].iter().chain(args).copied())
    }
}

impl Backend for Zypper {
    fn id(&self) -> PackageManagerId {
        PackageManagerId::Zypper
    }

    fn list(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            self.ctx.run(&Invocation::new("rpm", ["-qa"]))
        } else {
            self.ctx.run(&Invocation::new("rpm", ["-q"]).packages(packages))
        }
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        self.ctx
            .run(&Self::zypper(&["install", "--auto-agree-with-licenses"]).packages(packages))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Self::zypper(&["remove"]).packages(packages))
    }

    fn update(&self) -> Result<()> {
        self.ctx.run(&Self::zypper(&["refresh"]))
    }

    fn upgrade(&self) -> Result<()> {
        if self.ctx.dry_run {
            self.ctx.run(&Self::zypper(&["update", "--dry-run"]))
        } else {
            self.ctx.run(&Self::zypper(&["update"]))
        }
    }

    fn clean(&self) -> Result<()> {
        self.ctx.run(&Self::zypper(&["clean"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{context, names};

    #[test]
    fn test_commands_are_non_interactive() {
        let (runner, ctx) = context(false);
        let zypper = Zypper::new(ctx);
        zypper.install(&names(&["vim"])).unwrap();
        zypper.remove(&names(&["vim"])).unwrap();
        zypper.update().unwrap();
        zypper.clean().unwrap();
        assert_eq!(
            runner.commands(),
            vec![
                "zypper --non-interactive install --auto-agree-with-licenses vim",
                "zypper --non-interactive remove vim",
                "zypper --non-interactive refresh",
                "zypper --non-interactive clean",
            ]
        );
    }

    #[test]
    fn test_upgrade_dry_run() {
        let (runner, ctx) = context(true);
        Zypper::new(ctx).upgrade().unwrap();
        assert_eq!(runner.commands(), vec!["zypper --non-interactive update --dry-run"]);
    }
}
