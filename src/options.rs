//! Configuration options for Zinc output.
//!
//! - [`ZincOptions`]: writer configuration
//! - [`Version`]: the Zinc grammar version declared in grid headers
//!
//! ## Examples
//!
//! ```rust
//! use haystack_zinc::{grid_to_string_with_options, Grid, Version, ZincOptions};
//!
//! let grid = Grid::empty();
//! let zinc = grid_to_string_with_options(&grid, ZincOptions::v2()).unwrap();
//! assert_eq!(zinc, "ver:\"2.0\"\nempty\n");
//!
//! let options = ZincOptions::new().with_version(Version::V3);
//! assert_eq!(options.version.as_str(), "3.0");
//! ```

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Zinc grammar version.
///
/// Version 2 predates extended strings: an [`XStr`](crate::XStr) cannot be
/// written at all, and a `Bin` may be read with an unquoted mime type.
///
/// # Examples
///
/// ```rust
/// use haystack_zinc::Version;
///
/// assert_eq!("2.0".parse::<Version>().unwrap(), Version::V2);
/// assert_eq!(Version::V3.major(), 3);
/// assert!("4.0".parse::<Version>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Version {
    V2,
    #[default]
    V3,
}

impl Version {
    /// Returns the text form used in `ver:"..."` headers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Version::V2 => "2.0",
            Version::V3 => "3.0",
        }
    }

    /// Returns the major version number.
    #[must_use]
    pub const fn major(&self) -> u8 {
        match self {
            Version::V2 => 2,
            Version::V3 => 3,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "2.0" => Ok(Version::V2),
            "3.0" => Ok(Version::V3),
            _ => Err(Error::invalid("version", format!("unsupported version {}", s))),
        }
    }
}

/// Configuration options for Zinc serialization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZincOptions {
    pub version: Version,
}

impl ZincOptions {
    /// Creates default options (version 3.0).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use haystack_zinc::{Version, ZincOptions};
    ///
    /// assert_eq!(ZincOptions::new().version, Version::V3);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for the legacy 2.0 grammar.
    #[must_use]
    pub fn v2() -> Self {
        ZincOptions {
            version: Version::V2,
        }
    }

    /// Sets the version written into grid headers.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}
