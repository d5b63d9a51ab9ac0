//! # Identifier Normalizer Properties
//!
//! Property tests over arbitrary identity input: normalization never
//! panics, canonical output is a fixed point, and a bare number never
//! gets a type committed silently.

use proptest::prelude::*;

use stampbook_core::{normalize_identity, IdType, Normalization, RawIdentity};

fn id_type_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("V".to_string()),
        Just("e".to_string()),
        Just(" J ".to_string()),
        Just("X".to_string()),
        "[A-Za-z]{0,2}",
    ]
}

fn id_type() -> impl Strategy<Value = IdType> {
    prop_oneof![Just(IdType::V), Just(IdType::E), Just(IdType::J)]
}

proptest! {
    /// Any input maps to exactly one variant without panicking.
    #[test]
    fn normalize_never_panics(
        t in id_type_text(),
        n in "[0-9.\\- a-z]{0,16}",
        c in "[VEJvejx0-9.\\- ]{0,16}",
    ) {
        let _ = normalize_identity(&RawIdentity::new(&t, &n, &c));
    }

    /// Writing back a committed identity and normalizing again is a no-op.
    #[test]
    fn canonical_output_is_fixed_point(
        t in id_type_text(),
        n in "[0-9.\\-]{0,14}",
        c in "[VEJvej0-9.\\- ]{0,14}",
    ) {
        if let Some(canonical) = normalize_identity(&RawIdentity::new(&t, &n, &c)).canonical() {
            let stored = RawIdentity::new(
                canonical.id_type.as_str(),
                &canonical.id_number,
                &canonical.cedula(),
            );
            prop_assert_eq!(
                normalize_identity(&stored),
                Normalization::Unchanged(canonical.clone())
            );
        }
    }

    /// A bare digit cédula is always deferred with a `V` proposal.
    #[test]
    fn bare_digits_are_ambiguous(digits in "[0-9]{1,12}") {
        let n = normalize_identity(&RawIdentity::from_cedula(&digits));
        match n {
            Normalization::Ambiguous(proposal) => {
                prop_assert_eq!(proposal.id_type, IdType::V);
                prop_assert_eq!(proposal.id_number, digits);
            }
            other => prop_assert!(false, "expected ambiguous, got {:?}", other),
        }
    }

    /// A committed cédula always equals `{idType}-{idNumber}`.
    #[test]
    fn committed_cedula_is_composite(t in id_type(), digits in "[0-9]{6,12}") {
        let n = normalize_identity(&RawIdentity::new(t.as_str(), &digits, ""));
        let canonical = n.canonical().cloned();
        prop_assert!(canonical.is_some());
        let canonical = canonical.unwrap();
        prop_assert_eq!(canonical.cedula(), format!("{}-{}", t, digits));
    }
}
