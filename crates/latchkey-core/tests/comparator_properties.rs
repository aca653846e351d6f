//! Property-based tests for identifier comparison.
//!
//! These tests use proptest to generate arbitrary card identifiers and verify
//! that the positional comparator behaves as an exact equality check.

use latchkey_core::{Identifier, uid_equal};
use proptest::prelude::*;

/// Strategy for generating identifier byte strings (4-10 bytes).
fn uid_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 4..=10)
}

proptest! {
    /// Property: comparing an identifier with itself always matches.
    #[test]
    fn prop_uid_equal_is_reflexive(a in uid_bytes()) {
        prop_assert!(uid_equal(&a, &a, a.len()));
    }

    /// Property: equal-length sequences match iff every position matches.
    #[test]
    fn prop_uid_equal_matches_slice_equality(
        a in uid_bytes(),
        b in uid_bytes(),
    ) {
        let len = a.len().min(b.len());
        prop_assert_eq!(uid_equal(&a, &b, len), a[..len] == b[..len]);
    }

    /// Property: flipping any single byte breaks the match.
    #[test]
    fn prop_single_byte_difference_never_matches(
        a in uid_bytes(),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let mut b = a.clone();
        let i = index.index(b.len());
        b[i] ^= flip;
        prop_assert!(!uid_equal(&a, &b, a.len()));
    }

    /// Property: Identifier equality agrees with byte equality.
    #[test]
    fn prop_identifier_eq_agrees_with_bytes(a in uid_bytes(), b in uid_bytes()) {
        let ia = Identifier::new(&a).unwrap();
        let ib = Identifier::new(&b).unwrap();
        prop_assert_eq!(ia == ib, a == b);
    }

    /// Property: display output parses back to the same identifier.
    #[test]
    fn prop_identifier_display_parses(a in uid_bytes()) {
        let uid = Identifier::new(&a).unwrap();
        let parsed: Identifier = uid.to_string().parse().unwrap();
        prop_assert_eq!(parsed, uid);
    }
}
