use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

pub const SOURCE_CURRENCY: &str = "EUR";
pub const TARGET_CURRENCY: &str = "USD";

/// Where a run's exchange rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Live,
    Fallback,
}

/// EUR→USD conversion factor shared read-only by a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRate {
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub origin: RateOrigin,
}

impl ExchangeRate {
    #[must_use]
    pub fn live(rate: Decimal, fetched_at: DateTime<Utc>) -> Self {
        Self {
            rate,
            fetched_at,
            origin: RateOrigin::Live,
        }
    }

    #[must_use]
    pub fn fallback(rate: Decimal) -> Self {
        Self {
            rate,
            fetched_at: Utc::now(),
            origin: RateOrigin::Fallback,
        }
    }
}

/// Converts a source-currency amount, rounding half-up to cents.
#[must_use]
pub fn convert(amount: Decimal, rate: &ExchangeRate) -> Decimal {
    (amount * rate.rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn rate(raw: &str) -> ExchangeRate {
        ExchangeRate::live(Decimal::from_str(raw).unwrap(), Utc::now())
    }

    #[test]
    fn convert_rounds_half_up() {
        let amount = Decimal::from_str("10.005").unwrap();
        assert_eq!(convert(amount, &rate("1.10")).to_string(), "11.01");
    }

    #[test]
    fn convert_rounds_down_below_midpoint() {
        let amount = Decimal::from_str("0.25").unwrap();
        // 0.25 * 1.1581 = 0.289525
        assert_eq!(convert(amount, &rate("1.1581")).to_string(), "0.29");
        let amount = Decimal::from_str("1.00").unwrap();
        // 1.00 * 1.0849 = 1.0849
        assert_eq!(convert(amount, &rate("1.0849")).to_string(), "1.08");
    }

    #[test]
    fn convert_zero_is_zero() {
        assert_eq!(convert(Decimal::ZERO, &rate("1.08")), Decimal::ZERO);
    }

    #[test]
    fn fallback_rate_is_tagged() {
        let r = ExchangeRate::fallback(Decimal::new(116, 2));
        assert_eq!(r.origin, RateOrigin::Fallback);
    }
}
