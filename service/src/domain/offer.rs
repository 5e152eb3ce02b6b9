//! [`Offer`] definitions.

use common::{define_kind, unit, DateOf, DateTimeOf};
use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

#[cfg(doc)]
use common::{Date, DateTime};

use crate::domain::{
    define_id, partner,
    property::{self, Price, Property},
};

/// Price proposal of a [`Partner`] for a [`Property`].
///
/// [`Partner`]: crate::domain::Partner
#[derive(Clone, Debug)]
pub struct Offer {
    /// ID of this [`Offer`].
    pub id: Id,

    /// ID of the [`Property`] this [`Offer`] is made for.
    pub property_id: property::Id,

    /// ID of the [`Partner`] making this [`Offer`].
    ///
    /// [`Partner`]: crate::domain::Partner
    pub partner_id: partner::Id,

    /// Proposed [`Price`].
    pub price: Price,

    /// [`Status`] of this [`Offer`].
    pub status: Status,

    /// [`Validity`] of this [`Offer`] since its creation.
    pub validity: Validity,

    /// [`DateTime`] when this [`Offer`] was created.
    pub created_at: CreationDateTime,
}

impl Offer {
    /// Proposes a new [`Offer`] for the provided [`Property`], moving it into
    /// the [`property::State::OfferReceived`] state.
    ///
    /// The `existing` [`Offer`]s of the [`Property`] define the minimum
    /// acceptable `price`: a new [`Offer`] cannot be cheaper than all of them.
    ///
    /// # Errors
    ///
    /// With [`InvalidOfferError`] if the `price` is negative or below the
    /// minimum.
    pub fn propose(
        property: &mut Property,
        partner_id: partner::Id,
        price: Decimal,
        validity: Validity,
        existing: &[Self],
    ) -> Result<Self, InvalidOfferError> {
        let price = Price::new(price).ok_or(InvalidOfferError::NegativePrice)?;
        if let Some(minimum) = existing
            .iter()
            .filter(|o| o.property_id == property.id)
            .map(|o| o.price)
            .min()
        {
            if price < minimum {
                return Err(InvalidOfferError::BelowMinimum { price, minimum });
            }
        }

        property.receive_offer();

        Ok(Self {
            id: Id::new(),
            property_id: property.id,
            partner_id,
            price,
            status: Status::InReview,
            validity,
            created_at: CreationDateTime::now(),
        })
    }

    /// Returns the [`Date`] this [`Offer`] stops being valid on.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn deadline(&self) -> DeadlineDate {
        self.created_at
            .date::<(Self, unit::Deadline)>()
            .checked_add_days(i64::from(self.validity.days()))
            .expect("bounded `Validity` never overflows `Date`")
    }

    /// Sets the [`Validity`] of this [`Offer`] so it ends on the provided
    /// `deadline`.
    ///
    /// # Errors
    ///
    /// If the `deadline` is too far away from the creation [`Date`].
    pub fn set_deadline(
        &mut self,
        deadline: DeadlineDate,
    ) -> Result<(), InvalidValidityError> {
        let days = deadline.days_since(self.created_at.date::<()>());
        self.validity = i32::try_from(days)
            .ok()
            .and_then(Validity::new)
            .ok_or(InvalidValidityError { days })?;
        Ok(())
    }

    /// Accepts this [`Offer`] in isolation from its siblings.
    ///
    /// Use [`Property::accept_offer()`] to keep the siblings consistent.
    ///
    /// # Errors
    ///
    /// If this [`Offer`] is refused.
    pub fn accept(&mut self) -> Result<(), InvalidTransitionError> {
        if self.status == Status::Refused {
            return Err(InvalidTransitionError::AcceptRefused);
        }
        self.status = Status::Accepted;
        Ok(())
    }

    /// Refuses this [`Offer`].
    ///
    /// # Errors
    ///
    /// If this [`Offer`] is accepted.
    pub fn refuse(&mut self) -> Result<(), InvalidTransitionError> {
        if self.status == Status::Accepted {
            return Err(InvalidTransitionError::RefuseAccepted);
        }
        self.status = Status::Refused;
        Ok(())
    }
}

define_id! {
    #[doc = "ID of an [`Offer`]."]
    pub struct Id;
}

/// Number of days an [`Offer`] stays valid after its creation.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Validity(i32);

impl Validity {
    /// Maximum absolute number of days a [`Validity`] may span.
    pub const MAX_DAYS: i32 = 36_500;

    /// Creates a new [`Validity`] if the provided `days` fit into
    /// [`Validity::MAX_DAYS`] in either direction.
    #[must_use]
    pub fn new(days: i32) -> Option<Self> {
        (days.abs() <= Self::MAX_DAYS).then_some(Self(days))
    }

    /// Returns the number of days of this [`Validity`].
    #[must_use]
    pub const fn days(self) -> i32 {
        self.0
    }
}

impl Default for Validity {
    fn default() -> Self {
        Self(7)
    }
}

define_kind! {
    #[doc = "Status of an [`Offer`]."]
    enum Status {
        #[doc = "Awaiting a decision."]
        InReview = 1,

        #[doc = "Accepted by the seller."]
        Accepted = 2,

        #[doc = "Refused by the seller."]
        Refused = 3,
    }
}

/// [`DateTime`] when an [`Offer`] was created.
pub type CreationDateTime = DateTimeOf<(Offer, unit::Creation)>;

/// [`Date`] an [`Offer`] expires on.
pub type DeadlineDate = DateOf<(Offer, unit::Deadline)>;

/// Rejected [`Offer`] proposal.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidOfferError {
    /// Proposed price is negative.
    #[display("Offer price cannot be negative")]
    NegativePrice,

    /// Proposed price is below every existing [`Offer`].
    #[display("Offer price `{price}` is lower than the minimum `{minimum}`")]
    BelowMinimum {
        /// Proposed price.
        price: Price,

        /// Lowest price among the existing [`Offer`]s.
        minimum: Price,
    },
}

/// Forbidden [`Status`] change of an [`Offer`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidTransitionError {
    /// Refused [`Offer`] cannot be accepted.
    #[display("Refused offers cannot be accepted")]
    AcceptRefused,

    /// Accepted [`Offer`] cannot be refused.
    #[display("Accepted offers cannot be refused")]
    RefuseAccepted,

    /// Another [`Offer`] of the same [`Property`] is accepted already.
    #[display("Another offer of the property is accepted already")]
    AnotherAccepted,

    /// [`Property`] is sold or cancelled.
    #[display("Offers of a `{state}` property cannot be accepted")]
    PropertyClosed {
        /// [`property::State`] of the [`Property`].
        #[error(not(source))]
        state: property::State,
    },
}

/// [`Validity`] out of the supported range.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("Validity of {days} days is out of range")]
pub struct InvalidValidityError {
    /// Requested number of days.
    #[error(not(source))]
    pub days: i64,
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{
        partner,
        property::{self, Price, Property},
        user,
    };

    use super::{
        InvalidOfferError, InvalidTransitionError, Offer, Status, Validity,
    };

    fn property() -> Property {
        let created_at = DateTime::now().coerce();
        Property {
            id: property::Id::new(),
            name: property::Name::new("Loft").unwrap(),
            description: property::Description::new("Top floor").unwrap(),
            is_active: true,
            type_id: None,
            tag_ids: vec![],
            state: property::State::New,
            postcode: None,
            available_from: Property::default_availability(created_at),
            expected_price: Price::new(Decimal::from(100_000)).unwrap(),
            selling_price: Price::ZERO,
            bedrooms: property::DEFAULT_BEDROOMS,
            living_area: property::Area::ZERO,
            facades: 0,
            has_garage: false,
            has_garden: false,
            garden_area: property::Area::ZERO,
            garden_orientation: None,
            is_garden_walled: false,
            buyer_id: None,
            salesperson_id: user::Id::new(),
            created_at,
        }
    }

    fn propose(
        property: &mut Property,
        price: i64,
        existing: &[Offer],
    ) -> Result<Offer, InvalidOfferError> {
        Offer::propose(
            property,
            partner::Id::new(),
            Decimal::from(price),
            Validity::default(),
            existing,
        )
    }

    fn created_on(date: &str) -> Offer {
        let mut p = property();
        let mut offer = propose(&mut p, 1, &[]).unwrap();
        offer.created_at =
            DateTime::from_rfc3339(&format!("{date}T15:00:00Z"))
                .unwrap()
                .coerce();
        offer
    }

    #[test]
    fn first_offer_marks_property_received() {
        let mut p = property();

        let offer = propose(&mut p, 1, &[]).unwrap();

        assert_eq!(offer.status, Status::InReview);
        assert_eq!(offer.validity.days(), 7);
        assert_eq!(p.state, property::State::OfferReceived);
    }

    #[test]
    fn rejects_negative_price() {
        let mut p = property();

        assert!(matches!(
            propose(&mut p, -1, &[]),
            Err(InvalidOfferError::NegativePrice),
        ));
        assert_eq!(p.state, property::State::New);
    }

    #[test]
    fn rejects_price_below_all_existing() {
        let mut p = property();
        let first = propose(&mut p, 80_000, &[]).unwrap();
        let second = propose(&mut p, 90_000, &[first.clone()]).unwrap();
        let existing = [first, second];

        assert!(matches!(
            propose(&mut p, 79_999, &existing),
            Err(InvalidOfferError::BelowMinimum { .. }),
        ));
        assert!(propose(&mut p, 80_000, &existing).is_ok());
        assert!(propose(&mut p, 85_000, &existing).is_ok());
    }

    #[test]
    fn deadline_follows_validity() {
        let offer = created_on("2024-01-01");

        assert_eq!(offer.deadline().to_string(), "2024-01-08");
    }

    #[test]
    fn validity_follows_deadline() {
        let mut offer = created_on("2024-01-01");

        offer.set_deadline("2024-01-15".parse().unwrap()).unwrap();

        assert_eq!(offer.validity.days(), 14);
        assert_eq!(offer.deadline().to_string(), "2024-01-15");
    }

    #[test]
    fn rejects_far_deadline() {
        let mut offer = created_on("2024-01-01");

        assert!(offer.set_deadline("2224-01-01".parse().unwrap()).is_err());
        assert_eq!(offer.validity.days(), 7);
    }

    #[test]
    fn accepted_and_refused_are_final() {
        let mut offer = created_on("2024-01-01");
        offer.accept().unwrap();
        assert!(matches!(
            offer.refuse(),
            Err(InvalidTransitionError::RefuseAccepted),
        ));
        assert_eq!(offer.status, Status::Accepted);

        let mut offer = created_on("2024-01-01");
        offer.refuse().unwrap();
        assert!(matches!(
            offer.accept(),
            Err(InvalidTransitionError::AcceptRefused),
        ));
        assert_eq!(offer.status, Status::Refused);
    }
}
