//! [`Offer`]-related definitions.

use common::{Date, DateTime};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A price proposal of a `Partner` for a `Property`.
#[derive(Clone, Debug, From)]
pub struct Offer(domain::Offer);

/// A price proposal of a `Partner` for a `Property`.
#[graphql_object(context = Context)]
impl Offer {
    /// Unique identifier of this `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Property` this `Offer` is made for.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.property",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn property(&self) -> api::Property {
        #[expect(
            unsafe_code,
            reason = "`Offer` is deleted together with its `Property`"
        )]
        unsafe {
            api::Property::new_unchecked(self.0.property_id)
        }
    }

    /// `Partner` making this `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.partner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn partner(&self) -> api::Partner {
        #[expect(unsafe_code, reason = "`Partner`s are never deleted")]
        unsafe {
            api::Partner::new_unchecked(self.0.partner_id)
        }
    }

    /// Proposed price.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn price(&self) -> scalar::Decimal {
        self.0.price.value().into()
    }

    /// Status of this `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Number of days this `Offer` stays valid after its creation.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.validity",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn validity(&self) -> i32 {
        self.0.validity.days()
    }

    /// `Date` this `Offer` stops being valid on.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.deadline",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn deadline(&self) -> Date {
        self.0.deadline().coerce()
    }

    /// `DateTime` when this `Offer` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of an `Offer`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::offer::Id)]
#[into(domain::offer::Id)]
#[graphql(name = "OfferId", transparent)]
pub struct Id(Uuid);

/// Status of an `Offer`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "OfferStatus")]
pub enum Status {
    /// Awaiting a decision.
    InReview,

    /// Accepted by the seller.
    Accepted,

    /// Refused by the seller.
    Refused,
}

impl From<domain::offer::Status> for Status {
    fn from(status: domain::offer::Status) -> Self {
        use domain::offer::Status as S;
        match status {
            S::InReview => Self::InReview,
            S::Accepted => Self::Accepted,
            S::Refused => Self::Refused,
        }
    }
}
