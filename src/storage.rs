//! Key storage for each library revision.
//!
//! [`LegacyFields`] mirrors the public struct of revisions before 1.1.0 and
//! [`AccessorFields`] the opaque object of later revisions. Both are always
//! available; [`ConfiguredStorage`] names the one selected for this build.

mod accessor;
mod legacy;

pub use accessor::AccessorFields;
pub use legacy::LegacyFields;

/// Storage selected by the `legacy-fields` feature.
#[cfg(feature = "legacy-fields")]
pub type ConfiguredStorage = LegacyFields;

/// Storage selected by the `legacy-fields` feature.
#[cfg(not(feature = "legacy-fields"))]
pub type ConfiguredStorage = AccessorFields;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::traits::KeyStorage;

    #[test]
    fn configured_storage_matches_mode() {
        assert_eq!(<ConfiguredStorage as KeyStorage>::MODE, Mode::CONFIGURED);
        assert_eq!(<LegacyFields as KeyStorage>::MODE, Mode::Legacy);
        assert_eq!(<AccessorFields as KeyStorage>::MODE, Mode::Modern);
    }
}
