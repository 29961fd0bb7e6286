//! Resolution of library revisions to key storage modes.
//!
//! Library revisions before OpenSSL 1.1.0 expose the RSA key as a plain
//! struct whose fields are assigned directly. Later revisions hide the
//! struct and transfer ownership through `set0`/`get0` accessor calls. The
//! mode is fixed at build time through the `legacy-fields` cargo feature.

use core::fmt;
use core::str::FromStr;

/// First OpenSSL version whose RSA key is only reachable through accessors.
const OPENSSL_ACCESSOR_VERSION: u32 = 0x1010_0000;

/// First LibreSSL version providing the OpenSSL 1.1.0 accessor API.
const LIBRESSL_ACCESSOR_VERSION: u32 = 0x2070_000f;

/// OpenSSL version emulated by LibreSSL 2.7.0 and later.
const LIBRESSL_MODERN_EQUIVALENT: u32 = 0x1010_000f;

/// OpenSSL version emulated by LibreSSL releases before 2.7.0.
const LIBRESSL_LEGACY_EQUIVALENT: u32 = 0x1000_107f;

/// How key parameters are stored and transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Parameters are assigned to public struct fields. Assignment cannot
    /// fail.
    Legacy,
    /// Parameters are handed over through accessor calls which may refuse
    /// them.
    Modern,
}

impl Mode {
    /// Mode selected for this build.
    pub const CONFIGURED: Mode = if cfg!(feature = "legacy-fields") {
        Mode::Legacy
    } else {
        Mode::Modern
    };

    /// Returns the name used by [`FromStr`] and [`fmt::Display`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Legacy => "legacy",
            Mode::Modern => "modern",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`Mode`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key storage mode `{0}` (expected `legacy` or `modern`)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("legacy") => Ok(Mode::Legacy),
            s if s.eq_ignore_ascii_case("modern") => Ok(Mode::Modern),
            other => Err(ParseModeError(other.into())),
        }
    }
}

/// A library revision identifier, as reported by the library's version
/// number macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Revision {
    /// OpenSSL, identified by `OPENSSL_VERSION_NUMBER`.
    OpenSsl(u32),
    /// LibreSSL, identified by `LIBRESSL_VERSION_NUMBER`. LibreSSL claims to
    /// be OpenSSL 2.0, so its own number is used instead.
    LibreSsl(u32),
}

impl Revision {
    /// Returns the OpenSSL version whose key API this revision provides.
    pub const fn effective_version(self) -> u32 {
        match self {
            Revision::OpenSsl(version) => version,
            Revision::LibreSsl(version) if version >= LIBRESSL_ACCESSOR_VERSION => {
                LIBRESSL_MODERN_EQUIVALENT
            }
            Revision::LibreSsl(_) => LIBRESSL_LEGACY_EQUIVALENT,
        }
    }

    /// Returns the storage mode this revision requires.
    pub const fn mode(self) -> Mode {
        if self.effective_version() < OPENSSL_ACCESSOR_VERSION {
            Mode::Legacy
        } else {
            Mode::Modern
        }
    }
}

impl From<Revision> for Mode {
    fn from(revision: Revision) -> Self {
        revision.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openssl_revisions() {
        assert_eq!(Revision::OpenSsl(0x0090_819f).mode(), Mode::Legacy);
        assert_eq!(Revision::OpenSsl(0x1000_2000).mode(), Mode::Legacy);
        assert_eq!(Revision::OpenSsl(0x100f_ffff).mode(), Mode::Legacy);
        assert_eq!(Revision::OpenSsl(0x1010_0000).mode(), Mode::Modern);
        assert_eq!(Revision::OpenSsl(0x1010_117f).mode(), Mode::Modern);
        assert_eq!(Revision::OpenSsl(0x3000_0000).mode(), Mode::Modern);
    }

    #[test]
    fn libressl_revisions() {
        let old = Revision::LibreSsl(0x2060_000f);
        assert_eq!(old.effective_version(), 0x1000_107f);
        assert_eq!(Mode::from(old), Mode::Legacy);

        let new = Revision::LibreSsl(0x2070_000f);
        assert_eq!(new.effective_version(), 0x1010_000f);
        assert_eq!(Mode::from(new), Mode::Modern);

        // LibreSSL's claimed OpenSSL 2.0 number must not leak through.
        assert_eq!(Revision::LibreSsl(0x3040_200f).mode(), Mode::Modern);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("legacy".parse::<Mode>(), Ok(Mode::Legacy));
        assert_eq!(" Modern ".parse::<Mode>(), Ok(Mode::Modern));
        assert!("accessor".parse::<Mode>().is_err());
        for mode in [Mode::Legacy, Mode::Modern] {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
    }

    #[test]
    fn configured_mode_follows_feature() {
        if cfg!(feature = "legacy-fields") {
            assert_eq!(Mode::CONFIGURED, Mode::Legacy);
        } else {
            assert_eq!(Mode::CONFIGURED, Mode::Modern);
        }
    }
}
