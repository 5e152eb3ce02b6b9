//! [`Property`]-related definitions.

use std::future;

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A real estate listed for sale.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    id: Id,

    /// Underlying [`domain::Property`].
    property: OnceCell<domain::Property>,
}

impl From<domain::Property> for Property {
    fn from(property: domain::Property) -> Self {
        Self {
            id: property.id.into(),
            property: OnceCell::new_with(Some(property)),
        }
    }
}

impl Property {
    /// Creates a new [`Property`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Property`] with the provided ID exists,
    /// otherwise accessing this [`Property`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            property: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Property`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Property`] doesn't exist.
    async fn property(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Property, Error> {
        let id = self.id.into();
        self.property
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::property::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|p| {
                        future::ready(p.ok_or_else(|| {
                            api::query::PropertyError::NotExists.into()
                        }))
                    })
            })
            .await
    }

    /// Returns the [`domain::Offer`]s made for this [`Property`].
    async fn domain_offers(
        &self,
        ctx: &Context,
    ) -> Result<Vec<domain::Offer>, Error> {
        ctx.service()
            .execute(query::offers::ByProperty::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }
}

/// A real estate listed for sale.
#[graphql_object(context = Context)]
impl Property {
    /// Unique identifier of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Listing title of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.property(ctx).await?.name.clone().into())
    }

    /// Free-form description of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.description",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn description(
        &self,
        ctx: &Context,
    ) -> Result<Description, Error> {
        Ok(self.property(ctx).await?.description.clone().into())
    }

    /// Indicator whether this `Property` is visible in listings.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.isActive",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_active(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.property(ctx).await?.is_active)
    }

    /// `PropertyType` of this `Property`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.type",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn r#type(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::PropertyType>, Error> {
        Ok(self.property(ctx).await?.type_id.map(|id| {
            #[expect(unsafe_code, reason = "`PropertyType`s are never deleted")]
            unsafe {
                api::PropertyType::new_unchecked(id)
            }
        }))
    }

    /// `PropertyTag`s attached to this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.tags",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn tags(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::PropertyTag>, Error> {
        let ids = self.property(ctx).await?.tag_ids.clone();
        let mut tags = ctx
            .service()
            .execute(query::property_tag::ByIds::by(ids.clone()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        Ok(ids
            .iter()
            .filter_map(|id| tags.remove(id))
            .map(Into::into)
            .collect())
    }

    /// Current state of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.state",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn state(&self, ctx: &Context) -> Result<State, Error> {
        Ok(self.property(ctx).await?.state.into())
    }

    /// Postal code of this `Property`, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.postcode",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn postcode(
        &self,
        ctx: &Context,
    ) -> Result<Option<Postcode>, Error> {
        Ok(self.property(ctx).await?.postcode.clone().map(Into::into))
    }

    /// `Date` since which this `Property` is available.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.availableFrom",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn available_from(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.property(ctx).await?.available_from.coerce())
    }

    /// Price the seller expects to get.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.expectedPrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn expected_price(
        &self,
        ctx: &Context,
    ) -> Result<scalar::Decimal, Error> {
        Ok(self.property(ctx).await?.expected_price.value().into())
    }

    /// Price of the accepted `Offer`, or zero if none was accepted yet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.sellingPrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn selling_price(
        &self,
        ctx: &Context,
    ) -> Result<scalar::Decimal, Error> {
        Ok(self.property(ctx).await?.selling_price.value().into())
    }

    /// Highest price among the `Offer`s, or zero if there are none.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.bestPrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn best_price(
        &self,
        ctx: &Context,
    ) -> Result<scalar::Decimal, Error> {
        let offers = self.domain_offers(ctx).await?;
        Ok(domain::property::best_price(&offers).value().into())
    }

    /// Number of bedrooms.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.bedrooms",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn bedrooms(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.property(ctx).await?.bedrooms.into())
    }

    /// Living area in square meters.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.livingArea",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn living_area(
        &self,
        ctx: &Context,
    ) -> Result<scalar::Decimal, Error> {
        Ok(self.property(ctx).await?.living_area.value().into())
    }

    /// Number of facades.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.facades",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn facades(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.property(ctx).await?.facades.into())
    }

    /// Indicator whether this `Property` has a garage.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.hasGarage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn has_garage(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.property(ctx).await?.has_garage)
    }

    /// Indicator whether this `Property` has a garden.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.hasGarden",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn has_garden(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.property(ctx).await?.has_garden)
    }

    /// Garden area in square meters.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.gardenArea",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn garden_area(
        &self,
        ctx: &Context,
    ) -> Result<scalar::Decimal, Error> {
        Ok(self.property(ctx).await?.garden_area.value().into())
    }

    /// Side of the world the garden faces, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.gardenOrientation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn garden_orientation(
        &self,
        ctx: &Context,
    ) -> Result<Option<GardenOrientation>, Error> {
        Ok(self.property(ctx).await?.garden_orientation.map(Into::into))
    }

    /// Indicator whether the garden is walled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.isGardenWalled",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_garden_walled(
        &self,
        ctx: &Context,
    ) -> Result<bool, Error> {
        Ok(self.property(ctx).await?.is_garden_walled)
    }

    /// Sum of the living and garden areas in square meters.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.totalArea",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_area(
        &self,
        ctx: &Context,
    ) -> Result<scalar::Decimal, Error> {
        Ok(self.property(ctx).await?.total_area().value().into())
    }

    /// `Offer`s made for this `Property`, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.offers",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn offers(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Offer>, Error> {
        Ok(self
            .domain_offers(ctx)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// `Partner` of the accepted `Offer`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.buyer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn buyer(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Partner>, Error> {
        Ok(self.property(ctx).await?.buyer_id.map(|id| {
            #[expect(unsafe_code, reason = "`Partner`s are never deleted")]
            unsafe {
                api::Partner::new_unchecked(id)
            }
        }))
    }

    /// `User` marketing this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.salesperson",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn salesperson(
        &self,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let id = self.property(ctx).await?.salesperson_id;
        #[expect(unsafe_code, reason = "`User`s are never deleted")]
        let user = unsafe { api::User::new_unchecked(id) };
        Ok(user)
    }

    /// `Invoice`s issued on the sale of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.invoices",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn invoices(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Invoice>, Error> {
        ctx.service()
            .execute(query::invoices::ByProperty::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|invoices| invoices.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `Property` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.property(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Property`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::property::Id)]
#[into(domain::property::Id)]
#[graphql(name = "PropertyId", transparent)]
pub struct Id(Uuid);

/// Listing title of a `Property`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyName",
    with = scalar::Via::<domain::property::Name>,
)]
pub struct Name(domain::property::Name);

/// Free-form description of a `Property`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyDescription",
    with = scalar::Via::<domain::property::Description>,
)]
pub struct Description(domain::property::Description);

/// Postal code of a `Property`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyPostcode",
    with = scalar::Via::<domain::property::Postcode>,
)]
pub struct Postcode(domain::property::Postcode);

/// State of a `Property` listing.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "PropertyState")]
pub enum State {
    /// Listed without any offers.
    New,

    /// At least one offer was made.
    OfferReceived,

    /// An offer was accepted.
    OfferAccepted,

    /// Sold to the buyer.
    Sold,

    /// Withdrawn from the market.
    Cancelled,
}

impl From<domain::property::State> for State {
    fn from(state: domain::property::State) -> Self {
        use domain::property::State as S;
        match state {
            S::New => Self::New,
            S::OfferReceived => Self::OfferReceived,
            S::OfferAccepted => Self::OfferAccepted,
            S::Sold => Self::Sold,
            S::Cancelled => Self::Cancelled,
        }
    }
}

impl From<State> for domain::property::State {
    fn from(state: State) -> Self {
        match state {
            State::New => Self::New,
            State::OfferReceived => Self::OfferReceived,
            State::OfferAccepted => Self::OfferAccepted,
            State::Sold => Self::Sold,
            State::Cancelled => Self::Cancelled,
        }
    }
}

/// Side of the world a garden faces.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum GardenOrientation {
    /// North.
    North,

    /// South.
    South,

    /// East.
    East,

    /// West.
    West,
}

impl From<domain::property::GardenOrientation> for GardenOrientation {
    fn from(orientation: domain::property::GardenOrientation) -> Self {
        use domain::property::GardenOrientation as O;
        match orientation {
            O::North => Self::North,
            O::South => Self::South,
            O::East => Self::East,
            O::West => Self::West,
        }
    }
}

impl From<GardenOrientation> for domain::property::GardenOrientation {
    fn from(orientation: GardenOrientation) -> Self {
        use GardenOrientation as O;
        match orientation {
            O::North => Self::North,
            O::South => Self::South,
            O::East => Self::East,
            O::West => Self::West,
        }
    }
}

pub mod list {
    //! Definitions related to the [`Property`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{
        graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar,
    };
    use service::{query, read, Query as _};

    use super::{Id, Property};
    use crate::{api::scalar, AsError, Context, Error};

    /// Cursor for the `Property` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::property::list::Cursor)]
    #[graphql(
        name = "PropertyListCursor",
        with = scalar::Via::<read::property::list::Cursor>,
    )]
    pub struct Cursor(pub read::property::list::Cursor);

    /// Edge in the [`Property`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::property::list::Edge);

    /// Edge in the `Property` list.
    #[graphql_object(name = "PropertyListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `PropertyListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `PropertyListEdge`.
        #[must_use]
        pub fn node(&self) -> Property {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees \
                          `Property` existence"
            )]
            unsafe {
                Property::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Property`] list.
    #[derive(Clone, Debug)]
    pub struct Connection {
        /// Underlying [`read::property::list::Page`].
        page: read::property::list::Page,

        /// [`read::property::list::Filter`] the page was selected with.
        filter: read::property::list::Filter,
    }

    impl Connection {
        /// Creates a new [`Connection`] out of the provided
        /// [`read::property::list::Page`] selected with the provided
        /// [`read::property::list::Filter`].
        #[must_use]
        pub fn new(
            page: read::property::list::Page,
            filter: read::property::list::Filter,
        ) -> Self {
            Self { page, filter }
        }
    }

    /// Connection of the `Property` list.
    #[graphql_object(name = "PropertyListConnection", context = Context)]
    impl Connection {
        /// Edges in this `PropertyListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.page.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.page.page_info(),
                filter: self.filter.clone(),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::property::list::PageInfo`].
        info: read::property::list::PageInfo,

        /// [`read::property::list::Filter`] to count the total with.
        filter: read::property::list::Filter,
    }

    /// Information about a `PropertyListConnection` page.
    #[graphql_object(name = "PropertyListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> Option<Cursor> {
            self.info.start_cursor.map(Into::into)
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> Option<Cursor> {
            self.info.end_cursor.map(Into::into)
        }

        /// Total count of `Property`s matching the filter.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            let filter = self.filter.clone();
            ctx.service()
                .execute(query::properties::TotalCount::by(filter))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }

    /// Condition on the best offer price of a `Property`.
    #[derive(Clone, Copy, Debug, GraphQLInputObject)]
    #[graphql(name = "PropertyPriceCondition")]
    pub struct PriceCondition {
        /// Comparison to apply.
        pub comparison: Comparison,

        /// Value to compare the best offer price with.
        pub value: scalar::Decimal,
    }

    impl From<PriceCondition> for read::property::list::PriceCondition {
        fn from(cond: PriceCondition) -> Self {
            Self {
                comparison: cond.comparison.into(),
                value: cond.value.into(),
            }
        }
    }

    /// Comparison operator.
    #[derive(Clone, Copy, Debug, GraphQLEnum)]
    #[graphql(name = "PriceComparison")]
    pub enum Comparison {
        /// Equal to.
        Eq,

        /// Not equal to.
        Ne,

        /// Greater than.
        Gt,

        /// Less than.
        Lt,

        /// Greater than or equal to.
        Ge,

        /// Less than or equal to.
        Le,
    }

    impl From<Comparison> for read::property::list::Comparison {
        fn from(cmp: Comparison) -> Self {
            match cmp {
                Comparison::Eq => Self::Eq,
                Comparison::Ne => Self::Ne,
                Comparison::Gt => Self::Gt,
                Comparison::Lt => Self::Lt,
                Comparison::Ge => Self::Ge,
                Comparison::Le => Self::Le,
            }
        }
    }
}
