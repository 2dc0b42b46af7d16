//! Debian and derivatives: `apt-get`, with `dpkg` for listing.

use crate::backend::{Backend, BackendContext, Invocation};
use crate::error::Result;
use crate::id::PackageManagerId;

const NONINTERACTIVE: (&str, &str) = ("DEBIAN_FRONTEND", "noninteractive");

#[derive(Debug, Clone)]
pub struct AptGet {
    ctx: BackendContext,
}

impl AptGet {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }

    fn apt(&self, args: &[&str]) -> Invocation {
        Invocation::new("apt-get", args.iter().copied()).env(NONINTERACTIVE.0, NONINTERACTIVE.1)
    }
}

impl Backend for AptGet {
    fn id(&self) -> PackageManagerId {
        PackageManagerId::AptGet
    }

    fn list(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("dpkg", ["-l"]).packages(packages))
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&self.apt(&["-y", "install"]).packages(packages))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&self.apt(&["-y", "remove"]).packages(packages))
    }

    fn update(&self) -> Result<()> {
        self.ctx.run(&self.apt(&["update"]))
    }

    fn upgrade(&self) -> Result<()> {
        if self.ctx.dry_run {
            self.ctx.run(&self.apt(&["-s", "upgrade"]))
        } else {
            self.ctx.run(&self.apt(&["-y", "upgrade"]))
        }
    }

    fn clean(&self) -> Result<()> {
        self.ctx.run(&self.apt(&["clean"]))
    }
}
