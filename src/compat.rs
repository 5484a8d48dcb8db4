//! Decides whether one attribute may reference another as a foreign key.
//!
//! This is the single source of truth for relationship validation and
//! for the candidate pools the editor offers (`engine`). The matrix is
//! deliberately conservative: exact base-type matches only, no implicit
//! widening across integer sizes.

use crate::catalog::AttributeType;
use crate::schema::Attribute;

/// Precision assumed for a `numeric` attribute during compatibility
/// checks when none is set. Differs from the catalog's creation default
/// on purpose; see DESIGN.md.
pub(crate) const REFERENCE_DEFAULT_PRECISION: u32 = 38;

/// Scale assumed during compatibility checks when none is set.
pub(crate) const REFERENCE_DEFAULT_SCALE: u32 = 0;

/// May `foreign` legally reference `primary`?
///
/// Strings are the one asymmetric case: the referencing column must be
/// at least as long as the referenced key.
pub fn is_compatible(primary: &Attribute, foreign: &Attribute) -> bool {
    match (primary.data_type, foreign.data_type) {
        (AttributeType::Text, AttributeType::Text) => true,
        (AttributeType::String, AttributeType::String) => {
            primary.effective_length() <= foreign.effective_length()
        }
        (AttributeType::LargeInt, AttributeType::LargeInt)
        | (AttributeType::Integer, AttributeType::Integer)
        | (AttributeType::SmallInt, AttributeType::SmallInt)
        | (AttributeType::Double, AttributeType::Double)
        | (AttributeType::Float, AttributeType::Float) => true,
        (AttributeType::Numeric, AttributeType::Numeric) => {
            primary.precision.unwrap_or(REFERENCE_DEFAULT_PRECISION)
                == foreign.precision.unwrap_or(REFERENCE_DEFAULT_PRECISION)
                && primary.scale.unwrap_or(REFERENCE_DEFAULT_SCALE)
                    == foreign.scale.unwrap_or(REFERENCE_DEFAULT_SCALE)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(ty: AttributeType) -> Attribute {
        Attribute::new("a", ty)
    }

    #[test]
    fn test_exact_matches_are_symmetric() {
        for ty in [
            AttributeType::Text,
            AttributeType::SmallInt,
            AttributeType::Integer,
            AttributeType::LargeInt,
            AttributeType::Float,
            AttributeType::Double,
        ] {
            let a = attr(ty);
            let b = attr(ty);
            assert_eq!(is_compatible(&a, &b), is_compatible(&b, &a), "{ty}");
        }

        let a = attr(AttributeType::Numeric).with_precision(12).with_scale(4);
        let b = attr(AttributeType::Numeric).with_precision(12).with_scale(4);
        assert!(is_compatible(&a, &b));
        assert!(is_compatible(&b, &a));
    }

    #[test]
    fn test_cross_type_pairs_are_incompatible() {
        for left in AttributeType::ALL {
            for right in AttributeType::ALL {
                if left != right {
                    assert!(
                        !is_compatible(&attr(left), &attr(right)),
                        "{left} vs {right} must be incompatible"
                    );
                }
            }
        }
    }

    #[test]
    fn test_no_integer_widening() {
        assert!(!is_compatible(
            &attr(AttributeType::Integer),
            &attr(AttributeType::LargeInt)
        ));
        assert!(!is_compatible(
            &attr(AttributeType::SmallInt),
            &attr(AttributeType::Integer)
        ));
        assert!(!is_compatible(
            &attr(AttributeType::Float),
            &attr(AttributeType::Double)
        ));
    }

    #[test]
    fn test_string_length_rule_is_asymmetric() {
        let short_key = attr(AttributeType::String).with_length(10);
        let long_ref = attr(AttributeType::String).with_length(255);

        assert!(is_compatible(&short_key, &long_ref));
        assert!(!is_compatible(&long_ref, &short_key));
    }

    #[test]
    fn test_string_length_defaults_to_255() {
        let unset = attr(AttributeType::String);
        let explicit = attr(AttributeType::String).with_length(255);
        assert!(is_compatible(&unset, &explicit));
        assert!(is_compatible(&explicit, &unset));

        let narrow = attr(AttributeType::String).with_length(100);
        assert!(!is_compatible(&unset, &narrow));
    }

    #[test]
    fn test_numeric_requires_equal_precision_and_scale() {
        let a = attr(AttributeType::Numeric).with_precision(10).with_scale(2);
        let b = attr(AttributeType::Numeric).with_precision(10).with_scale(2);
        let c = attr(AttributeType::Numeric).with_precision(12).with_scale(2);
        let d = attr(AttributeType::Numeric).with_precision(10).with_scale(0);

        assert!(is_compatible(&a, &b));
        assert!(!is_compatible(&a, &c));
        assert!(!is_compatible(&a, &d));

        // Unset parameters fall back to 38/0 for the check.
        let unset = attr(AttributeType::Numeric);
        let max = attr(AttributeType::Numeric).with_precision(38).with_scale(0);
        assert!(is_compatible(&unset, &max));
        assert!(!is_compatible(&unset, &a));
    }

    #[test]
    fn test_same_type_non_key_pairs_stay_incompatible() {
        // Types outside the matrix never pair, even with themselves.
        for ty in [
            AttributeType::Boolean,
            AttributeType::Uuid,
            AttributeType::Date,
            AttributeType::Time,
            AttributeType::DateTime,
            AttributeType::Timestamp,
            AttributeType::Json,
            AttributeType::Geometry,
            AttributeType::Geography,
        ] {
            assert!(!is_compatible(&attr(ty), &attr(ty)), "{ty}");
        }
    }
}
