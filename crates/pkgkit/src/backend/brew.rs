//! macOS: Homebrew.

use crate::backend::{Backend, BackendContext, Invocation};
use crate::error::Result;
use crate::id::PackageManagerId;

#[derive(Debug, Clone)]
pub struct Brew {
    ctx: BackendContext,
}

impl Brew {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

impl Backend for Brew {
    fn id(&self) -> PackageManagerId {
        PackageManagerId::Brew
    }

    fn list(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("brew", ["list"]).packages(packages))
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("brew", ["install"]).packages(packages))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("brew", ["uninstall"]).packages(packages))
    }

    fn update(&self) -> Result<()> {
        self.ctx.run(&Invocation::new("brew", ["update"]))
    }

    fn upgrade(&self) -> Result<()> {
        if self.ctx.dry_run {
            self.ctx.run(&Invocation::new("brew", ["outdated"]))
        } else {
            self.ctx.run(&Invocation::new("brew", ["upgrade"]))
        }
    }

    fn clean(&self) -> Result<()> {
        self.ctx.run(&Invocation::new("brew", ["cleanup"]))
    }
}
