//! Platform detection: pick a package manager for the local system.
//!
//! Detection is a best effort. Linux distributions are recognized by a
//! release file in `/etc`, checked in table order so that the first
//! match wins for distributions that ship several of them. Other
//! platforms map directly from the kernel name.
//!
//! Detection only returns a value. Whether it becomes the effective
//! package manager is the caller's decision, and a failure can always
//! be overridden by configuring the manager explicitly.
//!
//! # Example
//!
//! ```no_run
//! match pkgkit::platform::detect() {
//!     Ok(id) => println!("using {id}"),
//!     Err(e) => eprintln!("{e}: {}", e.category().advice()),
//! }
//! ```

use crate::error::{Error, Result};
use crate::id::PackageManagerId;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Linux release files and the package manager they imply, in precedence order.
pub const LINUX_MARKERS: [(&str, PackageManagerId); 9] = [
    ("/etc/debian_version", PackageManagerId::AptGet),
    ("/etc/SuSE-release", PackageManagerId::Zypper),
    ("/etc/redhat-release", PackageManagerId::Yum),
    ("/etc/arch-release", PackageManagerId::Pacman),
    ("/etc/gentoo-release", PackageManagerId::Portage),
    ("/etc/slackware-version", PackageManagerId::Swaret),
    ("/etc/fedora-release", PackageManagerId::Yum),
    ("/etc/yellowdog-release", PackageManagerId::Yum),
    ("/etc/mandrake-release", PackageManagerId::Urpmi),
];

/// Kernel names that map straight to `bsdpkg`.
pub const BSD_PLATFORMS: [&str; 3] = ["NetBSD", "OpenBSD", "FreeBSD"];

/// Platforms we recognize but have no package management for.
pub const UNSUPPORTED_PLATFORMS: [&str; 22] = [
    "4.4BSD",
    "4.3bsd",
    "BSD/OS",
    "SunOS",
    "AIX",
    "OSF1",
    "HP-UX",
    "HI-UX",
    "IRIX",
    "UNICOS",
    "UNICOS/mp",
    "ConvexOS",
    "Minix",
    "Windows_95",
    "Windows_NT",
    "CYGWIN",
    "MinGW",
    "LynxOS",
    "UNIX_System_V",
    "BeOS",
    "TOPS-10",
    "TOPS-20",
];

/// What detection needs to know about a system.
pub trait SystemProbe {
    /// Kernel/OS name as `uname -s` reports it, e.g. `Linux` or `Darwin`.
    fn os_name(&self) -> String;

    /// Whether a file exists. Errors (permission denied, ...) count as absent.
    fn exists(&self, path: &Path) -> bool;
}

/// Probe for the machine we are running on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSystem;

impl SystemProbe for LocalSystem {
    fn os_name(&self) -> String {
        kernel_name()
    }

    fn exists(&self, path: &Path) -> bool {
        probe_path(path)
    }
}

/// Probe with a fixed OS name and a filesystem rooted elsewhere.
///
/// Marker paths are looked up under `root`, which makes detection
/// testable and lets it inspect a mounted image or chroot.
#[derive(Debug, Clone)]
pub struct RootedProbe {
    os_name: String,
    root: PathBuf,
}

impl RootedProbe {
    pub fn new(os_name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            os_name: os_name.into(),
            root: root.into(),
        }
    }
}

impl SystemProbe for RootedProbe {
    fn os_name(&self) -> String {
        self.os_name.clone()
    }

    fn exists(&self, path: &Path) -> bool {
        let relative = path.strip_prefix("/").unwrap_or(path);
        probe_path(&self.root.join(relative))
    }
}

/// Detect the package manager for the local system.
pub fn detect() -> Result<PackageManagerId> {
    detect_with(&LocalSystem)
}

/// Detect the package manager using the given probe.
pub fn detect_with(probe: &dyn SystemProbe) -> Result<PackageManagerId> {
    let platform = probe.os_name();

    match platform.as_str() {
        "Linux" => {
            log::info!("detected platform Linux");
            for (marker, id) in LINUX_MARKERS {
                if probe.exists(Path::new(marker)) {
                    log::info!("detected {}, choosing package manager {}", marker, id);
                    return Ok(id);
                }
            }
            Err(Error::UnknownDistribution)
        }
        "Darwin" => {
            log::info!("detected platform macOS, choosing package manager brew");
            Ok(PackageManagerId::Brew)
        }
        p if BSD_PLATFORMS.contains(&p) => {
            log::info!("detected platform {}, choosing package manager bsdpkg", p);
            Ok(PackageManagerId::Bsdpkg)
        }
        p if UNSUPPORTED_PLATFORMS.contains(&p) => {
            log::info!("detected platform {}", p);
            Err(Error::PlatformNotSupported { platform })
        }
        _ => Err(Error::UnrecognizedPlatform { platform }),
    }
}

/// The kernel name of the running system.
///
/// Asks `uname -s` first and falls back to the compile-time target OS.
pub fn kernel_name() -> String {
    let from_uname = Command::new("uname")
        .arg("-s")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|name| !name.is_empty());

    from_uname.unwrap_or_else(|| fallback_kernel_name(std::env::consts::OS).to_string())
}

fn fallback_kernel_name(os: &str) -> &str {
    match os {
        "linux" | "android" => "Linux",
        "macos" | "ios" => "Darwin",
        "freebsd" => "FreeBSD",
        "netbsd" => "NetBSD",
        "openbsd" => "OpenBSD",
        "dragonfly" => "DragonFly",
        "solaris" | "illumos" => "SunOS",
        "aix" => "AIX",
        "windows" => "Windows_NT",
        other => other,
    }
}

fn probe_path(path: &Path) -> bool {
    match path.try_exists() {
        Ok(exists) => exists,
        Err(e) => {
            log::debug!("cannot probe {}: {}", path.display(), e);
            false
        }
    }
}
