//! Static registry from [`PackageManagerId`] to backend constructors.
//!
//! The known set is larger than the set with backends: an identifier
//! may be configured or detected before anyone has written its backend.
//! The two failure modes stay distinct:
//!
//! - a name outside the known set is an *unknown* manager
//! - a known identifier without a backend is an *unsupported* manager

use crate::backend::apt_get::AptGet;
use crate::backend::brew::Brew;
use crate::backend::bsdpkg::Bsdpkg;
use crate::backend::pacman::Pacman;
use crate::backend::yum::Yum;
use crate::backend::zypper::Zypper;
use crate::backend::{Backend, BackendContext};
use crate::error::{Error, Result};
use crate::id::PackageManagerId;
use std::fmt;

/// Construct the backend for an identifier.
///
/// # Errors
///
/// Returns `Error::UnsupportedManager` for known identifiers without a backend.
pub fn resolve(id: PackageManagerId, ctx: BackendContext) -> Result<Box<dyn Backend>> {
    let backend: Box<dyn Backend> = match id {
        PackageManagerId::AptGet => Box::new(AptGet::new(ctx)),
        PackageManagerId::Yum => Box::new(Yum::new(ctx)),
        PackageManagerId::Zypper => Box::new(Zypper::new(ctx)),
        PackageManagerId::Pacman => Box::new(Pacman::new(ctx)),
        PackageManagerId::Brew => Box::new(Brew::new(ctx)),
        PackageManagerId::Bsdpkg => Box::new(Bsdpkg::new(ctx)),
        PackageManagerId::Portage | PackageManagerId::Swaret | PackageManagerId::Urpmi => {
            return Err(Error::UnsupportedManager { id });
        }
    };
    Ok(backend)
}

/// Whether a backend exists for this identifier.
pub fn is_supported(id: PackageManagerId) -> bool {
    !matches!(
        id,
        PackageManagerId::Portage | PackageManagerId::Swaret | PackageManagerId::Urpmi
    )
}

/// Identifiers that have a backend, in display order.
pub fn supported() -> Vec<PackageManagerId> {
    PackageManagerId::ALL
        .into_iter()
        .filter(|id| is_supported(*id))
        .collect()
}

/// Where the effective package manager came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `--manager` on the command line
    Override,
    /// `package_manager` in the configuration file
    Configured,
    /// Platform detection
    Detected,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Override => "command line",
            Self::Configured => "configuration",
            Self::Detected => "detection",
        })
    }
}

/// The effective package manager and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: PackageManagerId,
    pub source: Source,
}

/// Pick the effective package manager.
///
/// An override beats the configured value, which beats detection.
/// Detection only runs when neither is given.
///
/// # Errors
///
/// Returns `Error::UnknownManager` when the chosen name is not known,
/// or whatever `detect` returns.
pub fn choose<F>(
    override_name: Option<&str>,
    configured: Option<&str>,
    detect: F,
) -> Result<Selection>
where
    F: FnOnce() -> Result<PackageManagerId>,
{
    let selection = if let Some(name) = override_name {
        Selection {
            id: name.parse()?,
            source: Source::Override,
        }
    } else if let Some(name) = configured {
        Selection {
            id: name.parse()?,
            source: Source::Configured,
        }
    } else {
        Selection {
            id: detect()?,
            source: Source::Detected,
        }
    };

    log::info!("package manager {} (from {})", selection.id, selection.source);
    Ok(selection)
}
