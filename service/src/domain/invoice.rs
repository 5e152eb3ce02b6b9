//! [`Invoice`] definitions.

use common::{unit, DateTimeOf, Money};
use rust_decimal::Decimal;

use crate::domain::{define_id, define_text, partner, property};

/// Customer invoice issued to the buyer of a sold [`Property`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Invoice {
    /// ID of this [`Invoice`].
    pub id: Id,

    /// ID of the sold [`Property`].
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// ID of the [`Partner`] being invoiced.
    ///
    /// [`Partner`]: crate::domain::Partner
    pub partner_id: partner::Id,

    /// Accounting journal this [`Invoice`] is registered in.
    pub journal: Journal,

    /// [`Line`]s of this [`Invoice`].
    pub lines: Vec<Line>,

    /// When this [`Invoice`] was issued.
    pub created_at: CreationDateTime,
}

impl Invoice {
    /// Returns the total amount of this [`Invoice`].
    ///
    /// [`None`] is returned if there are no [`Line`]s, their currencies
    /// differ, or the sum overflows.
    #[must_use]
    pub fn total(&self) -> Option<Money> {
        let (first, rest) = self.lines.split_first()?;
        rest.iter()
            .try_fold(first.amount()?, |sum, l| sum.checked_add(l.amount()?))
    }
}

/// Single line of an [`Invoice`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Line {
    /// Human-readable label of this [`Line`].
    pub label: String,

    /// Number of units.
    pub quantity: Decimal,

    /// Price of a single unit.
    pub unit_price: Money,
}

impl Line {
    /// Returns `quantity × unit_price` of this [`Line`].
    #[must_use]
    pub fn amount(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

define_id! {
    #[doc = "ID of an [`Invoice`]."]
    pub struct Id;
}

define_text! {
    #[doc = "Code of an accounting journal."]
    pub struct Journal(String) where len <= 16;
}

/// [`DateTime`] when an [`Invoice`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Invoice, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{partner, property};

    use super::{Id, Invoice, Journal, Line};

    fn line(quantity: i64, unit_price: &str) -> Line {
        Line {
            label: "Fee".into(),
            quantity: Decimal::from(quantity),
            unit_price: Money::from_str(unit_price).unwrap(),
        }
    }

    fn invoice(lines: Vec<Line>) -> Invoice {
        Invoice {
            id: Id::new(),
            property_id: property::Id::new(),
            partner_id: partner::Id::new(),
            journal: Journal::new("INV").unwrap(),
            lines,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn sums_lines() {
        let inv = invoice(vec![line(1, "5400USD"), line(2, "100USD")]);

        assert_eq!(inv.total(), Some(Money::from_str("5600USD").unwrap()));
    }

    #[test]
    fn no_total_for_mixed_currencies_or_no_lines() {
        assert_eq!(invoice(vec![]).total(), None);
        assert_eq!(
            invoice(vec![line(1, "1USD"), line(1, "1EUR")]).total(),
            None,
        );
    }
}
