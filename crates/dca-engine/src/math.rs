//! Division and compounding helpers that never panic. Zero denominators
//! and non-positive bases give zero; overflow saturates at the signed bound.

use rust_decimal::{Decimal, MathematicalOps};

/// `Decimal::MIN` when `negative`, else `Decimal::MAX`
fn saturated(negative: bool) -> Decimal {
    if negative { Decimal::MIN } else { Decimal::MAX }
}

/// `numerator / denominator`, 0 when the denominator is zero
pub(crate) fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .unwrap_or_else(|| saturated(numerator.is_sign_negative() != denominator.is_sign_negative()))
}

/// `part / whole * 100`, 0 when `whole` is zero
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    safe_div(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
}

/// `base ^ exponent` for a fractional exponent.
///
/// Non-positive bases have no real power here and yield 0.
pub(crate) fn fractional_pow(base: Decimal, exponent: Decimal) -> Decimal {
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if exponent.is_zero() || base == Decimal::ONE {
        return Decimal::ONE;
    }
    base.checked_powd(exponent).unwrap_or_else(|| {
        // Growth overflows upward; decay underflows to zero.
        if (base > Decimal::ONE) == exponent.is_sign_positive() {
            Decimal::MAX
        } else {
            Decimal::ZERO
        }
    })
}

/// `base ^ periods` for a whole number of periods
pub(crate) fn compound(base: Decimal, periods: i64) -> Decimal {
    if periods <= 0 {
        return Decimal::ONE;
    }
    base.checked_powi(periods).unwrap_or_else(|| {
        if base.abs() <= Decimal::ONE {
            Decimal::ZERO
        } else {
            saturated(base.is_sign_negative() && periods % 2 == 1)
        }
    })
}

/// Growth over `days` at an annual rate given in percent
pub(crate) fn annual_growth_factor(annual_rate_percent: Decimal, days: i64) -> Decimal {
    let base = Decimal::ONE + annual_rate_percent / Decimal::ONE_HUNDRED;
    let years = Decimal::from(days) / Decimal::from(365);
    fractional_pow(base, years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_zero_guards() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_of(dec!(5), dec!(50)), dec!(10));
        assert_eq!(fractional_pow(dec!(-1), dec!(0.5)), Decimal::ZERO);
    }

    #[test]
    fn test_one_year_growth_matches_rate() {
        let factor = annual_growth_factor(dec!(10), 365);
        assert!(close(factor, dec!(1.1), dec!(0.000001)));

        let half = annual_growth_factor(dec!(21), 365 / 2);
        assert!(close(half, dec!(1.0996), dec!(0.001)));
    }

    #[test]
    fn test_compound_whole_periods() {
        assert_eq!(compound(dec!(1.1), 2), dec!(1.21));
        assert_eq!(compound(dec!(1.1), 0), Decimal::ONE);
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(fractional_pow(dec!(6), dec!(40)), Decimal::MAX);
        assert_eq!(annual_growth_factor(dec!(500), 365 * 40), Decimal::MAX);
        assert_eq!(compound(dec!(2), 1000), Decimal::MAX);
        assert_eq!(safe_div(Decimal::MAX, dec!(0.5)), Decimal::MAX);
        assert_eq!(safe_div(Decimal::MAX, dec!(-0.5)), Decimal::MIN);
        assert_eq!(percent_of(Decimal::MAX, Decimal::ONE), Decimal::MAX);
    }
}
