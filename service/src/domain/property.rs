//! [`Property`] definitions.

use common::{define_kind, unit, DateOf, DateTimeOf};
use derive_more::{Display, Error, From};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

#[cfg(doc)]
use common::{Date, DateTime};

use crate::domain::{
    define_id, define_text,
    offer::{self, Offer},
    partner, property_tag, property_type, user,
};

/// Real estate listed for sale by the agency.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// Listing title of this [`Property`].
    pub name: Name,

    /// [`Description`] of this [`Property`].
    pub description: Description,

    /// Indicator whether this [`Property`] is visible in listings.
    pub is_active: bool,

    /// [`PropertyType`] of this [`Property`], if any.
    ///
    /// [`PropertyType`]: crate::domain::PropertyType
    pub type_id: Option<property_type::Id>,

    /// [`PropertyTag`]s attached to this [`Property`].
    ///
    /// [`PropertyTag`]: crate::domain::PropertyTag
    pub tag_ids: Vec<property_tag::Id>,

    /// Current [`State`] of this [`Property`].
    pub state: State,

    /// [`Postcode`] of this [`Property`], if known.
    pub postcode: Option<Postcode>,

    /// [`Date`] since which this [`Property`] is available.
    pub available_from: AvailabilityDate,

    /// Price the seller expects to get.
    pub expected_price: Price,

    /// Price of the accepted [`Offer`], or zero if none was accepted yet.
    pub selling_price: Price,

    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Living area in square meters.
    pub living_area: Area,

    /// Number of facades.
    pub facades: u16,

    /// Indicator whether this [`Property`] has a garage.
    pub has_garage: bool,

    /// Indicator whether this [`Property`] has a garden.
    pub has_garden: bool,

    /// Garden area in square meters.
    pub garden_area: Area,

    /// [`GardenOrientation`] of the garden, if any.
    pub garden_orientation: Option<GardenOrientation>,

    /// Indicator whether the garden is walled.
    pub is_garden_walled: bool,

    /// [`Partner`] whose [`Offer`] was accepted.
    ///
    /// [`Partner`]: crate::domain::Partner
    pub buyer_id: Option<partner::Id>,

    /// [`User`] responsible for selling this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub salesperson_id: user::Id,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,
}

/// Garden area set when a garden is switched on.
const DEFAULT_GARDEN_AREA: Decimal = Decimal::TEN;

/// Lowest allowed ratio of the selling price to the expected price.
const SELLING_PRICE_FLOOR: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Number of bedrooms a new [`Property`] has unless told otherwise.
pub const DEFAULT_BEDROOMS: u16 = 2;

impl Property {
    /// Returns the [`AvailabilityDate`] a [`Property`] created at the
    /// provided [`DateTime`] gets by default: three months later.
    #[must_use]
    pub fn default_availability(
        created_at: CreationDateTime,
    ) -> AvailabilityDate {
        let created = created_at.date::<(Self, unit::Availability)>();
        created.checked_add_months(3).unwrap_or(created)
    }

    /// Returns the sum of the living and garden areas.
    #[must_use]
    pub fn total_area(&self) -> Area {
        Area(self.living_area.0.saturating_add(self.garden_area.0))
    }

    /// Indicates whether this [`Property`] is still being marketed by its
    /// salesperson.
    #[must_use]
    pub fn is_active_listing(&self) -> bool {
        matches!(self.state, State::New | State::OfferReceived)
    }

    /// Switches the garden of this [`Property`] on or off.
    ///
    /// Switching on fills in the default orientation and area. Switching off
    /// clears them only if they still hold those defaults.
    pub fn toggle_garden(&mut self, enabled: bool) {
        if self.has_garden == enabled {
            return;
        }
        self.has_garden = enabled;

        if enabled {
            self.garden_orientation = Some(GardenOrientation::North);
            self.garden_area = Area(DEFAULT_GARDEN_AREA);
        } else if self.garden_area.0 == DEFAULT_GARDEN_AREA
            && self.garden_orientation == Some(GardenOrientation::North)
        {
            self.garden_area = Area::ZERO;
            self.garden_orientation = None;
        }
    }

    /// Checks the selling price of this [`Property`] is not below 90% of its
    /// expected price.
    ///
    /// # Errors
    ///
    /// With [`ValidationError::SellingPriceTooLow`] if a non-zero selling
    /// price is below the floor.
    pub fn validate_selling_price(&self) -> Result<(), ValidationError> {
        check_selling_price(self.selling_price, self.expected_price)
    }

    /// Moves this [`Property`] into [`State::OfferReceived`] if it has not
    /// progressed beyond [`State::New`] yet.
    pub fn receive_offer(&mut self) {
        if self.state == State::New {
            self.state = State::OfferReceived;
        }
    }

    /// Accepts the [`Offer`] with the provided ID among the `offers` of this
    /// [`Property`], refusing all the other ones.
    ///
    /// Nothing is changed if an error is returned.
    ///
    /// # Errors
    ///
    /// - [`AcceptanceError::UnknownOffer`] if the [`Offer`] is not among the
    ///   `offers`;
    /// - [`AcceptanceError::Transition`] if the [`Offer`] was refused, another
    ///   [`Offer`] is already accepted, or this [`Property`] is sold or
    ///   cancelled;
    /// - [`AcceptanceError::Validation`] if the [`Offer`] price is below the
    ///   selling price floor.
    pub fn accept_offer(
        &mut self,
        offer_id: offer::Id,
        offers: &mut [Offer],
    ) -> Result<(), AcceptanceError> {
        use offer::{InvalidTransitionError as E, Status};

        let accepted = offers
            .iter()
            .find(|o| o.id == offer_id && o.property_id == self.id)
            .ok_or(AcceptanceError::UnknownOffer)?;

        if accepted.status == Status::Refused {
            return Err(E::AcceptRefused.into());
        }
        if matches!(self.state, State::Sold | State::Cancelled) {
            return Err(E::PropertyClosed { state: self.state }.into());
        }
        if offers
            .iter()
            .any(|o| o.id != offer_id && o.status == Status::Accepted)
        {
            return Err(E::AnotherAccepted.into());
        }
        check_selling_price(accepted.price, self.expected_price)?;

        let (price, buyer_id) = (accepted.price, accepted.partner_id);
        for offer in offers.iter_mut() {
            if offer.id == offer_id {
                offer.accept()?;
            } else {
                offer.status = Status::Refused;
            }
        }
        self.selling_price = price;
        self.buyer_id = Some(buyer_id);
        self.state = State::OfferAccepted;

        Ok(())
    }

    /// Marks this [`Property`] as sold.
    ///
    /// Returns `false` if it has been sold already.
    ///
    /// # Errors
    ///
    /// If this [`Property`] is cancelled.
    pub fn mark_sold(&mut self) -> Result<bool, InvalidTransitionError> {
        match self.state {
            State::Cancelled => Err(InvalidTransitionError::SellCancelled),
            State::Sold => Ok(false),
            State::New | State::OfferReceived | State::OfferAccepted => {
                self.state = State::Sold;
                Ok(true)
            }
        }
    }

    /// Marks this [`Property`] as cancelled.
    ///
    /// # Errors
    ///
    /// If this [`Property`] is sold.
    pub fn mark_cancelled(&mut self) -> Result<(), InvalidTransitionError> {
        if self.state == State::Sold {
            return Err(InvalidTransitionError::CancelSold);
        }
        self.state = State::Cancelled;
        Ok(())
    }

    /// Checks whether this [`Property`] may be deleted.
    ///
    /// # Errors
    ///
    /// Unless this [`Property`] is [`State::New`] or [`State::Cancelled`].
    pub fn authorize_deletion(&self) -> Result<(), DeletionForbiddenError> {
        match self.state {
            State::New | State::Cancelled => Ok(()),
            State::OfferReceived | State::OfferAccepted | State::Sold => {
                Err(DeletionForbiddenError { state: self.state })
            }
        }
    }
}

/// Returns the highest price among the provided [`Offer`]s, or zero if there
/// are none.
pub fn best_price<'o>(offers: impl IntoIterator<Item = &'o Offer>) -> Price {
    offers
        .into_iter()
        .map(|o| o.price)
        .max()
        .unwrap_or(Price::ZERO)
}

/// Checks the `selling` price against the floor derived from the `expected`
/// one.
fn check_selling_price(
    selling: Price,
    expected: Price,
) -> Result<(), ValidationError> {
    if selling.0.is_zero() {
        return Ok(());
    }
    let floor = expected.0 * SELLING_PRICE_FLOOR;
    if selling.0 < floor {
        return Err(ValidationError::SellingPriceTooLow { selling, expected });
    }
    Ok(())
}

define_id! {
    #[doc = "ID of a [`Property`]."]
    pub struct Id;
}

define_text! {
    #[doc = "Listing title of a [`Property`]."]
    pub struct Name(String) where len <= 256;
}

define_text! {
    #[doc = "Free-form description of a [`Property`]."]
    pub struct Description(String) where len <= 16384;
}

define_text! {
    #[doc = "Postal code of a [`Property`]."]
    pub struct Postcode(String) where len <= 16;
}

/// Non-negative price of a [`Property`] or an [`Offer`].
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Zero [`Price`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Price`] if the provided `value` is not negative.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (!value.is_sign_negative() || value.is_zero()).then_some(Self(value))
    }

    /// Returns the raw [`Decimal`] value of this [`Price`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

/// Non-negative area in square meters.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Area(Decimal);

impl Area {
    /// Zero [`Area`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Area`] if the provided `value` is not negative.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (!value.is_sign_negative() || value.is_zero()).then_some(Self(value))
    }

    /// Returns the raw [`Decimal`] value of this [`Area`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

define_kind! {
    #[doc = "State of a [`Property`] listing."]
    enum State {
        #[doc = "Listed without any [`Offer`]s."]
        New = 1,

        #[doc = "At least one [`Offer`] was made."]
        OfferReceived = 2,

        #[doc = "An [`Offer`] was accepted."]
        OfferAccepted = 3,

        #[doc = "Sold to the buyer."]
        Sold = 4,

        #[doc = "Withdrawn from the market."]
        Cancelled = 5,
    }
}

define_kind! {
    #[doc = "Side of the world a garden faces."]
    enum GardenOrientation {
        #[doc = "North."]
        North = 1,

        #[doc = "South."]
        South = 2,

        #[doc = "East."]
        East = 3,

        #[doc = "West."]
        West = 4,
    }
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`Date`] since which a [`Property`] is available.
pub type AvailabilityDate = DateOf<(Property, unit::Availability)>;

/// Violation of [`Property`] price rules.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ValidationError {
    /// Price is negative.
    #[display("Price cannot be negative")]
    NegativePrice,

    /// Area is negative.
    #[display("Area cannot be negative")]
    NegativeArea,

    /// Selling price is below 90% of the expected one.
    #[display(
        "Selling price `{selling}` is below 90% of expected price `{expected}`"
    )]
    SellingPriceTooLow {
        /// Selling price being checked.
        selling: Price,

        /// Expected price of the [`Property`].
        expected: Price,
    },
}

/// Forbidden [`State`] change of a [`Property`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidTransitionError {
    /// Cancelled [`Property`] cannot be sold.
    #[display("Cancelled properties cannot be sold")]
    SellCancelled,

    /// Sold [`Property`] cannot be cancelled.
    #[display("Sold properties cannot be cancelled")]
    CancelSold,
}

/// [`Property`] cannot be deleted in its current [`State`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("Property in `{state}` state cannot be deleted")]
pub struct DeletionForbiddenError {
    /// [`State`] the [`Property`] is in.
    #[error(not(source))]
    pub state: State,
}

/// Error of [`Property::accept_offer()`].
#[derive(Clone, Copy, Debug, Display, Error, From)]
pub enum AcceptanceError {
    /// [`Offer`] does not belong to the [`Property`].
    #[display("Offer does not belong to the property")]
    UnknownOffer,

    /// [`Offer`] or [`Property`] cannot change its state.
    #[from]
    Transition(offer::InvalidTransitionError),

    /// New selling price violates [`Property`] price rules.
    #[from]
    Validation(ValidationError),
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{
        offer::{self, Offer, Status},
        partner, user,
    };

    use super::{
        AcceptanceError, Area, Description, GardenOrientation, Id,
        InvalidTransitionError, Name, Price, Property, State,
        DEFAULT_BEDROOMS,
    };

    fn price(v: i64) -> Price {
        Price::new(Decimal::from(v)).unwrap()
    }

    fn property(expected: i64) -> Property {
        let created_at = DateTime::from_rfc3339("2024-01-01T10:00:00Z")
            .unwrap()
            .coerce();
        Property {
            id: Id::new(),
            name: Name::new("Cozy cottage").unwrap(),
            description: Description::new("Near the lake").unwrap(),
            is_active: true,
            type_id: None,
            tag_ids: vec![],
            state: State::New,
            postcode: None,
            available_from: Property::default_availability(created_at),
            expected_price: price(expected),
            selling_price: Price::ZERO,
            bedrooms: DEFAULT_BEDROOMS,
            living_area: Area::new(Decimal::from(100)).unwrap(),
            facades: 0,
            has_garage: false,
            has_garden: false,
            garden_area: Area::ZERO,
            garden_orientation: None,
            is_garden_walled: false,
            buyer_id: None,
            salesperson_id: user::Id::new(),
            created_at,
        }
    }

    fn offer(property: &Property, amount: i64) -> Offer {
        Offer {
            id: offer::Id::new(),
            property_id: property.id,
            partner_id: partner::Id::new(),
            price: price(amount),
            status: Status::InReview,
            validity: offer::Validity::default(),
            created_at: property.created_at.coerce(),
        }
    }

    #[test]
    fn available_three_months_after_creation() {
        let p = property(0);

        assert_eq!(p.available_from.to_string(), "2024-04-01");
    }

    #[test]
    fn total_area_follows_toggled_garden() {
        let mut p = property(0);
        assert_eq!(p.total_area().value(), Decimal::from(100));

        p.toggle_garden(true);
        assert_eq!(p.garden_orientation, Some(GardenOrientation::North));
        assert_eq!(p.total_area().value(), Decimal::from(110));

        p.toggle_garden(false);
        assert_eq!(p.garden_orientation, None);
        assert_eq!(p.total_area().value(), Decimal::from(100));
    }

    #[test]
    fn garden_toggle_keeps_user_values() {
        let mut p = property(0);
        p.toggle_garden(true);
        p.garden_area = Area::new(Decimal::from(25)).unwrap();

        p.toggle_garden(false);

        assert!(!p.has_garden);
        assert_eq!(p.garden_area.value(), Decimal::from(25));
        assert_eq!(p.garden_orientation, Some(GardenOrientation::North));
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(Price::new(Decimal::from(-1)).is_none());
        assert!(Area::new(Decimal::from(-1)).is_none());
        assert!(Price::new(Decimal::ZERO).is_some());
    }

    #[test]
    fn selling_price_floor() {
        let mut p = property(100_000);
        assert!(p.validate_selling_price().is_ok());

        p.selling_price = price(90_000);
        assert!(p.validate_selling_price().is_ok());

        p.selling_price = price(89_999);
        assert!(p.validate_selling_price().is_err());

        p.selling_price = Price::ZERO;
        assert!(p.validate_selling_price().is_ok());
    }

    #[test]
    fn best_price_is_max_or_zero() {
        let p = property(0);
        assert_eq!(super::best_price(&Vec::<Offer>::new()), Price::ZERO);

        let offers = [offer(&p, 80_000), offer(&p, 95_000), offer(&p, 90_000)];
        assert_eq!(super::best_price(&offers), price(95_000));
    }

    #[test]
    fn accepting_refuses_siblings() {
        let mut p = property(100_000);
        p.receive_offer();
        let mut offers = [offer(&p, 80_000), offer(&p, 90_000)];
        let (first, second) = (offers[0].id, offers[1].id);

        p.accept_offer(second, &mut offers).unwrap();

        assert_eq!(p.state, State::OfferAccepted);
        assert_eq!(p.selling_price, price(90_000));
        assert_eq!(p.buyer_id, Some(offers[1].partner_id));
        assert_eq!(offers[1].status, Status::Accepted);
        assert_eq!(offers[0].status, Status::Refused);
        assert!(matches!(
            p.accept_offer(first, &mut offers),
            Err(AcceptanceError::Transition(
                offer::InvalidTransitionError::AcceptRefused,
            )),
        ));
    }

    #[test]
    fn accepting_below_floor_changes_nothing() {
        let mut p = property(100_000);
        p.receive_offer();
        let mut offers = [offer(&p, 80_000), offer(&p, 85_000)];
        let id = offers[0].id;

        assert!(matches!(
            p.accept_offer(id, &mut offers),
            Err(AcceptanceError::Validation(_)),
        ));
        assert_eq!(p.state, State::OfferReceived);
        assert_eq!(p.selling_price, Price::ZERO);
        assert_eq!(p.buyer_id, None);
        assert!(offers.iter().all(|o| o.status == Status::InReview));
    }

    #[test]
    fn only_one_offer_can_be_accepted() {
        let mut p = property(100_000);
        let mut offers = [offer(&p, 95_000), offer(&p, 96_000)];
        let (first, second) = (offers[0].id, offers[1].id);
        p.accept_offer(first, &mut offers).unwrap();
        offers[1].status = Status::InReview;

        assert!(matches!(
            p.accept_offer(second, &mut offers),
            Err(AcceptanceError::Transition(
                offer::InvalidTransitionError::AnotherAccepted,
            )),
        ));
    }

    #[test]
    fn closed_property_accepts_nothing() {
        let mut p = property(100_000);
        let mut offers = [offer(&p, 95_000)];
        let id = offers[0].id;
        p.mark_cancelled().unwrap();

        assert!(p.accept_offer(id, &mut offers).is_err());
        assert_eq!(offers[0].status, Status::InReview);
    }

    #[test]
    fn sold_and_cancelled_exclude_each_other() {
        let mut sold = property(0);
        assert!(sold.mark_sold().unwrap());
        assert!(!sold.mark_sold().unwrap());
        assert!(matches!(
            sold.mark_cancelled(),
            Err(InvalidTransitionError::CancelSold),
        ));
        assert_eq!(sold.state, State::Sold);

        let mut cancelled = property(0);
        cancelled.mark_cancelled().unwrap();
        assert!(matches!(
            cancelled.mark_sold(),
            Err(InvalidTransitionError::SellCancelled),
        ));
        assert_eq!(cancelled.state, State::Cancelled);
    }

    #[test]
    fn deletion_allowed_only_when_new_or_cancelled() {
        let mut p = property(0);
        for (state, allowed) in [
            (State::New, true),
            (State::OfferReceived, false),
            (State::OfferAccepted, false),
            (State::Sold, false),
            (State::Cancelled, true),
        ] {
            p.state = state;
            assert_eq!(p.authorize_deletion().is_ok(), allowed, "{state}");
        }
    }

    #[test]
    fn receiving_offer_never_reverts_state() {
        let mut p = property(0);
        p.receive_offer();
        assert_eq!(p.state, State::OfferReceived);

        p.state = State::OfferAccepted;
        p.receive_offer();
        assert_eq!(p.state, State::OfferAccepted);
    }
}
