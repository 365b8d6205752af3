//! Shared arithmetic helpers for the computation.
//!
//! All amounts are [`Decimal`] so that summing many lines never drifts the
//! way binary floating point does.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to whole pence, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use ct_core::calculations::common::round_to_pence;
///
/// assert_eq!(round_to_pence(dec!(12590.004)), dec!(12590.00));
/// assert_eq!(round_to_pence(dec!(12590.005)), dec!(12590.01));
/// assert_eq!(round_to_pence(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_to_pence(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Floors a value at zero. Used wherever a figure is a hard non-negative
/// quantity, such as tax payable after reliefs.
///
/// ```
/// use rust_decimal_macros::dec;
/// use ct_core::calculations::common::floor_at_zero;
///
/// assert_eq!(floor_at_zero(dec!(-500)), dec!(0));
/// assert_eq!(floor_at_zero(dec!(500)), dec!(500));
/// ```
pub fn floor_at_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Sums optional amounts, treating absent values as contributing nothing.
pub fn sum_present<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    values.into_iter().flatten().sum()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_to_pence tests
    // =========================================================================

    #[test]
    fn round_to_pence_rounds_down_below_midpoint() {
        assert_eq!(round_to_pence(dec!(10.004)), dec!(10.00));
    }

    #[test]
    fn round_to_pence_rounds_up_at_midpoint() {
        assert_eq!(round_to_pence(dec!(10.005)), dec!(10.01));
    }

    #[test]
    fn round_to_pence_leaves_whole_pounds_alone() {
        assert_eq!(round_to_pence(dec!(12590)), dec!(12590));
    }

    // =========================================================================
    // floor_at_zero tests
    // =========================================================================

    #[test]
    fn floor_at_zero_clamps_negative() {
        assert_eq!(floor_at_zero(dec!(-0.01)), dec!(0));
    }

    #[test]
    fn floor_at_zero_keeps_zero() {
        assert_eq!(floor_at_zero(dec!(0)), dec!(0));
    }

    // =========================================================================
    // sum_present tests
    // =========================================================================

    #[test]
    fn sum_present_skips_none() {
        let total = sum_present([Some(dec!(5000)), None, Some(dec!(250.50))]);

        assert_eq!(total, dec!(5250.50));
    }

    #[test]
    fn sum_present_of_nothing_is_zero() {
        assert_eq!(sum_present(std::iter::empty()), dec!(0));
    }

    #[test]
    fn sum_present_has_no_drift_over_many_terms() {
        let total = sum_present(std::iter::repeat_n(Some(dec!(0.10)), 1000));

        assert_eq!(total, dec!(100.00));
    }
}
