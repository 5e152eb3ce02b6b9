//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Floating-point percentage in the `[0, 100]` range.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`] by checking the provided value is not less
    /// than `0` and not greater than `100`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Returns this [`Percent`] share of the provided `value`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn of(self, value: Decimal) -> Option<Decimal> {
        value.checked_mul(self.0)?.checked_div(Decimal::ONE_HUNDRED)
    }

    /// Returns the raw value of this [`Percent`], e.g. `6` for `6%`.
    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Percent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let val = f64::deserialize(deserializer)?;
        Decimal::try_from(val)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| D::Error::custom("invalid percent value"))
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Percent;

    #[test]
    fn bounds() {
        assert!(Percent::from_str("0").is_ok());
        assert!(Percent::from_str("100").is_ok());
        assert!(Percent::from_str("-0.1").is_err());
        assert!(Percent::from_str("100.01").is_err());
    }

    #[test]
    fn takes_share() {
        let ninety = Percent::from_str("90").unwrap();

        assert_eq!(
            ninety.of(Decimal::from(100_000)),
            Some(Decimal::from(90_000)),
        );
        assert_eq!(
            Percent::from_str("6").unwrap().of(Decimal::from(90_000)),
            Some(Decimal::from(5_400)),
        );
    }

    #[test]
    fn share_overflow_is_none() {
        let six = Percent::from_str("6").unwrap();

        assert_eq!(six.of(Decimal::MAX), None);
        assert_eq!(
            Percent::from_str("0").unwrap().of(Decimal::MAX),
            Some(Decimal::ZERO),
        );
    }
}
