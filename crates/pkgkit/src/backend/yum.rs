//! Red Hat, Fedora and Yellow Dog: `yum`, with `rpm` for listing.

use crate::backend::{Backend, BackendContext, Invocation};
use crate::error::Result;
use crate::id::PackageManagerId;

#[derive(Debug, Clone)]
pub struct Yum {
    ctx: BackendContext,
}

impl Yum {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

impl Backend for Yum {
    fn id(&self) -> PackageManagerId {
        PackageManagerId::Yum
    }

    fn list(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            self.ctx.run(&Invocation::new("rpm", ["-qa"]))
        } else {
            self.ctx.run(&Invocation::new("rpm", ["-q"]).packages(packages))
        }
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("yum", ["-y", "install"]).packages(packages))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("yum", ["-y", "remove"]).packages(packages))
    }

    fn update(&self) -> Result<()> {
        self.ctx.run(&Invocation::new("yum", ["makecache"]))
    }

    fn upgrade(&self) -> Result<()> {
        if self.ctx.dry_run {
            self.ctx.run(&Invocation::new("yum", ["check-update"]))
        } else {
            self.ctx.run(&Invocation::new("yum", ["-y", "update"]))
        }
    }

    fn clean(&self) -> Result<()> {
        self.ctx.run(&Invocation::new("yum", ["clean", "packages"]))
    }
}
