//! Arch Linux: `pacman`.

use crate::backend::{Backend, BackendContext, Invocation};
use crate::error::Result;
use crate::id::PackageManagerId;

#[derive(Debug, Clone)]
pub struct Pacman {
    ctx: BackendContext,
}

impl Pacman {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

impl Backend for Pacman {
    fn id(&self) -> PackageManagerId {
        PackageManagerId::Pacman
    }

    fn list(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("pacman", ["-Q"]).packages(packages))
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        self.ctx
            .run(&Invocation::new("pacman", ["-S", "--noconfirm"]).packages(packages))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.ctx
            .run(&Invocation::new("pacman", ["-Rs", "--noconfirm"]).packages(packages))
    }

    fn update(&self) -> Result<()> {
        self.ctx.run(&Invocation::new("pacman", ["-Sy"]))
    }

    fn upgrade(&self) -> Result<()> {
        if self.ctx.dry_run {
            self.ctx.run(&Invocation::new("pacman", ["-Qu"]))
        } else {
            self.ctx.run(&Invocation::new("pacman", ["-Su", "--noconfirm"]))
        }
    }

    fn clean(&self) -> Result<()> {
        self.ctx.run(&Invocation::new("pacman", ["-Sc", "--noconfirm"]))
    }
}
