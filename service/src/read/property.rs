//! [`Property`]-related read definitions.

use derive_more::{Deref, From, Into};

use crate::domain::Property;

/// [`Property`]s a salesperson is still marketing, i.e. the ones being new or
/// having received offers.
#[derive(Clone, Debug, Default, Deref, From, Into)]
pub struct ActiveListings(pub Vec<Property>);

pub mod list {
    //! [`Property`] list definitions.

    use std::cmp::Ordering;

    use common::define_pagination;
    use derive_more::{Display, From, Into};
    use rust_decimal::Decimal;

    use crate::domain::property;
    #[cfg(doc)]
    use crate::domain::Property;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Page`].
    pub type Node = property::Id;

    /// Cursor pointing to a specific [`Property`] in a list.
    pub type Cursor = property::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`property::Name`] (or its part) to fuzzy search for.
        pub name: Option<property::Name>,

        /// [`property::State`] to match exactly.
        pub state: Option<property::State>,

        /// Condition on the best offer price.
        pub best_price: Option<PriceCondition>,

        /// Indicator whether inactive [`Property`]s should be listed too.
        pub with_inactive: bool,
    }

    /// Condition comparing a price with a `value`.
    #[derive(Clone, Copy, Debug)]
    pub struct PriceCondition {
        /// [`Comparison`] to apply.
        pub comparison: Comparison,

        /// Value to compare with.
        pub value: Decimal,
    }

    impl PriceCondition {
        /// Checks whether the provided `price` satisfies this
        /// [`PriceCondition`].
        #[must_use]
        pub fn matches(&self, price: property::Price) -> bool {
            self.comparison.holds(price.value().cmp(&self.value))
        }
    }

    /// Comparison operator.
    #[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
    pub enum Comparison {
        /// `=`
        #[display("=")]
        Eq,

        /// `!=`
        #[display("!=")]
        Ne,

        /// `>`
        #[display(">")]
        Gt,

        /// `<`
        #[display("<")]
        Lt,

        /// `>=`
        #[display(">=")]
        Ge,

        /// `<=`
        #[display("<=")]
        Le,
    }

    impl Comparison {
        /// Checks whether the provided [`Ordering`] of the left operand
        /// against the right one satisfies this [`Comparison`].
        #[must_use]
        pub fn holds(self, ord: Ordering) -> bool {
            match self {
                Self::Eq => ord.is_eq(),
                Self::Ne => ord.is_ne(),
                Self::Gt => ord.is_gt(),
                Self::Lt => ord.is_lt(),
                Self::Ge => ord.is_ge(),
                Self::Le => ord.is_le(),
            }
        }

        /// Returns SQL operator of this [`Comparison`].
        #[must_use]
        pub const fn sql(self) -> &'static str {
            match self {
                Self::Eq => "=",
                Self::Ne => "<>",
                Self::Gt => ">",
                Self::Lt => "<",
                Self::Ge => ">=",
                Self::Le => "<=",
            }
        }
    }

    /// Total count of [`Property`] list items.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);

    #[cfg(test)]
    mod spec {
        use std::cmp::Ordering;

        use super::Comparison;

        #[test]
        fn comparison_holds() {
            use Comparison as C;
            use Ordering::{Equal, Greater, Less};

            for (cmp, holding) in [
                (C::Eq, &[Equal][..]),
                (C::Ne, &[Less, Greater]),
                (C::Gt, &[Greater]),
                (C::Lt, &[Less]),
                (C::Ge, &[Equal, Greater]),
                (C::Le, &[Less, Equal]),
            ] {
                for ord in [Less, Equal, Greater] {
                    assert_eq!(
                        cmp.holds(ord),
                        holding.contains(&ord),
                        "{cmp} {ord:?}",
                    );
                }
            }
        }
    }
}
