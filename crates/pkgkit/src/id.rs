//! The closed set of package-manager identifiers.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Symbolic name of an OS package-management tool.
///
/// This is the full known set: everything an operator may configure or
/// force, which is more than detection can return and more than has a
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageManagerId {
    AptGet,
    Yum,
    Zypper,
    Pacman,
    Portage,
    Swaret,
    Urpmi,
    Brew,
    Bsdpkg,
}

impl PackageManagerId {
    /// Every known identifier, in display order.
    pub const ALL: [Self; 9] = [
        Self::AptGet,
        Self::Yum,
        Self::Zypper,
        Self::Pacman,
        Self::Portage,
        Self::Swaret,
        Self::Urpmi,
        Self::Brew,
        Self::Bsdpkg,
    ];

    /// The name used in configuration and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AptGet => "apt-get",
            Self::Yum => "yum",
            Self::Zypper => "zypper",
            Self::Pacman => "pacman",
            Self::Portage => "portage",
            Self::Swaret => "swaret",
            Self::Urpmi => "urpmi",
            Self::Brew => "brew",
            Self::Bsdpkg => "bsdpkg",
        }
    }

    /// Known names, comma-separated, for help and error messages.
    pub fn known_names() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PackageManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManagerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::UnknownManager {
                name: s.to_string(),
            })
    }
}
