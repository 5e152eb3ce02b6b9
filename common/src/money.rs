//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::{define_kind, Percent};

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Returns the provided [`Percent`] share of this [`Money`].
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn share(self, percent: Percent) -> Option<Self> {
        Some(Self {
            amount: percent.of(self.amount)?,
            currency: self.currency,
        })
    }

    /// Multiplies this [`Money`] by the provided `quantity`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: Decimal) -> Option<Self> {
        Some(Self {
            amount: self.amount.checked_mul(quantity)?,
            currency: self.currency,
        })
    }

    /// Adds the `other` [`Money`] to this one.
    ///
    /// [`None`] is returned on overflow or if currencies differ.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        (self.currency == other.currency).then_some(())?;
        Some(Self {
            amount: self.amount.checked_add(other.amount)?,
            currency: self.currency,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{}{currency}", amount.normalize())
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Pound Sterling."]
        Gbp = 3,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use crate::Percent;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn usd(s: &str) -> Money {
        Money {
            amount: decimal(s),
            currency: Currency::Usd,
        }
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45USD").unwrap(), usd("123.45"));
        assert_eq!(
            Money::from_str("10GBP").unwrap(),
            Money {
                amount: decimal("10"),
                currency: Currency::Gbp,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Us").is_err());
        assert!(Money::from_str("123.45Usdollar").is_err());
    }

    #[test]
    fn to_string_drops_trailing_zeros() {
        assert_eq!(usd("123.45").to_string(), "123.45USD");
        assert_eq!(usd("123.00").to_string(), "123USD");
        assert_eq!(usd("5400.000").to_string(), "5400USD");
        assert_eq!(usd("0.50").to_string(), "0.5USD");
    }

    #[test]
    fn takes_percent_share() {
        let six = Percent::from_str("6").unwrap();

        assert_eq!(usd("90000").share(six), Some(usd("5400")));
        assert_eq!(usd("0").share(six), Some(usd("0")));
        assert_eq!(
            Money {
                amount: Decimal::MAX,
                currency: Currency::Usd,
            }
            .share(six),
            None,
        );
    }

    #[test]
    fn adds_only_same_currency() {
        assert_eq!(usd("5400").checked_add(usd("100")), Some(usd("5500")));
        assert_eq!(
            usd("1").checked_add(Money {
                amount: decimal("1"),
                currency: Currency::Eur,
            }),
            None,
        );
    }
}
