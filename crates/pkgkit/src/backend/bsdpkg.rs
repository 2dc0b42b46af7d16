//! The BSD package tools: `pkg_info`, `pkg_add`, `pkg_delete`.
//!
//! FreeBSD fetches remote packages with `pkg_add -r` and upgrades the
//! base system with `freebsd-update`; NetBSD and OpenBSD upgrade
//! packages with `pkg_add -u`. There is no package database to refresh
//! and no cache to clean, so `update` and `clean` do nothing.

use crate::backend::{Backend, BackendContext, Invocation};
use crate::error::Result;
use crate::id::PackageManagerId;
use crate::platform;

#[derive(Debug, Clone)]
pub struct Bsdpkg {
    ctx: BackendContext,
    freebsd: bool,
}

impl Bsdpkg {
    /// Backend for the BSD flavor we are running on.
    pub fn new(ctx: BackendContext) -> Self {
        Self::for_platform(ctx, &platform::kernel_name())
    }

    /// Backend for a named BSD flavor, e.g. `FreeBSD`.
    pub fn for_platform(ctx: BackendContext, platform: &str) -> Self {
        Self {
            ctx,
            freebsd: platform == "FreeBSD",
        }
    }
}

impl Backend for Bsdpkg {
    fn id(&self) -> PackageManagerId {
        PackageManagerId::Bsdpkg
    }

    fn list(&self, packages: &[String]) -> Result<()> {
        self.ctx.run(&Invocation::new("pkg_info", Vec::<String>::new()).packages(packages))
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        let args: &[&str] = if self.freebsd { &["-r"] } else { &[] };
        self.ctx
            .run(&Invocation::new("pkg_add", args.iter().copied()).packages(packages))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.ctx
            .run(&Invocation::new("pkg_delete", Vec::<String>::new()).packages(packages))
    }

    fn update(&self) -> Result<()> {
        log::info!("bsdpkg has no package database to update");
        Ok(())
    }

    fn upgrade(&self) -> Result<()> {
        match (self.freebsd, self.ctx.dry_run) {
            (true, true) => self.ctx.run(&Invocation::new("freebsd-update", ["fetch"])),
            (true, false) => self.ctx.run(&Invocation::new("freebsd-update", ["install"])),
            (false, true) => self.ctx.run(&Invocation::new("pkg_add", ["-u", "-n"])),
            (false, false) => self.ctx.run(&Invocation::new("pkg_add", ["-u"])),
        }
    }

    fn clean(&self) -> Result<()> {
        log::info!("bsdpkg keeps no package cache to clean");
        Ok(())
    }
}
