//! Canonical 16-byte action identifiers.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};

/// Width of a slug in bytes.
pub const SLUG_LEN: usize = 16;

/// Fixed-width key identifying an action category.
///
/// Built from the registration name: the first 16 bytes are copied verbatim
/// and the remainder is zero padded. No case folding or trimming happens
/// here; callers pass exactly the string used at registration. Two names
/// that agree on their first 16 bytes map to the same slug, which is why
/// registration refuses a slug whose on-chain record carries a different
/// display name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Slug(pub [u8; SLUG_LEN]);

impl Slug {
    /// Encode a registration name into its canonical slug.
    pub fn new(name: &str) -> Self {
        let mut bytes = [0u8; SLUG_LEN];
        let src = name.as_bytes();
        let len = src.len().min(SLUG_LEN);
        bytes[..len].copy_from_slice(&src[..len]);
        Slug(bytes)
    }

    pub const fn from_bytes(bytes: [u8; SLUG_LEN]) -> Self {
        Slug(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; SLUG_LEN] {
        &self.0
    }

    /// The stored name with trailing zero padding stripped.
    ///
    /// Inverse of [`Slug::new`] only for names that fit in 16 bytes; longer
    /// names come back truncated.
    pub fn display_name(&self) -> String {
        let end = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl From<&str> for Slug {
    fn from(name: &str) -> Self {
        Slug::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_planting_layout() {
        let slug = Slug::new("tree_planting");
        assert_eq!(
            slug.as_bytes(),
            &[
                0x74, 0x72, 0x65, 0x65, 0x5f, 0x70, 0x6c, 0x61, 0x6e, 0x74, 0x69, 0x6e, 0x67,
                0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn test_distinct_names_distinct_slugs() {
        assert_ne!(Slug::new("tree_planting"), Slug::new("waste_collection"));
        assert_ne!(Slug::new("bike_commute"), Slug::new("bike_commutes"));
    }

    #[test]
    fn test_long_names_truncate_to_sixteen_bytes() {
        let slug = Slug::new("a_very_long_action_name");
        assert_eq!(slug.as_bytes(), b"a_very_long_acti");
        // names that agree on the first 16 bytes collide
        assert_eq!(slug, Slug::new("a_very_long_actionable_name"));
    }

    #[test]
    fn test_display_name_strips_padding() {
        assert_eq!(Slug::new("tree_planting").display_name(), "tree_planting");
        assert_eq!(Slug::new("").display_name(), "");
        assert_eq!(Slug::new("exactly_16_chars").display_name(), "exactly_16_chars");
    }

    #[test]
    fn test_borsh_is_raw_sixteen_bytes() {
        let slug = Slug::new("tree_planting");
        let encoded = borsh::to_vec(&slug).unwrap();
        assert_eq!(encoded.len(), SLUG_LEN);
        assert_eq!(encoded, slug.as_bytes());
    }

    #[test]
    fn test_determinism() {
        for name in ["tree_planting", "waste_collection", "x"] {
            assert_eq!(Slug::new(name), Slug::new(name));
        }
    }
}
