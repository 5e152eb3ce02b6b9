//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

/// Root of all GraphQL queries.
///
/// Every query requires an authenticated `User`.
#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        Self::user(my_id, ctx).await
    }

    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Partner` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PARTNER_NOT_EXISTS` - the `Partner` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "partner",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn partner(
        id: api::partner::Id,
        ctx: &Context,
    ) -> Result<api::Partner, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::partner::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| PartnerError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `PropertyType`s ordered by their names.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "propertyTypes",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn property_types(
        ctx: &Context,
    ) -> Result<Vec<api::PropertyType>, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::property_type::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|types| types.into_iter().map(Into::into).collect())
    }

    /// Returns all the `PropertyTag`s ordered by their names.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "propertyTags",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn property_tags(
        ctx: &Context,
    ) -> Result<Vec<api::PropertyTag>, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::property_tag::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|tags| tags.into_iter().map(Into::into).collect())
    }

    /// Returns the `Property` with the specified ID.
    ///
    /// Inactive `Property`s are returned too.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "property",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::property::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| PropertyError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Property`s.
    ///
    /// `name` is searched fuzzily, `bestPrice` is compared with the highest
    /// price among the `Offer`s of a `Property`. Inactive `Property`s are
    /// skipped unless `withInactive` is `true`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            best_price = ?best_price,
            first = ?first,
            gql.name = "properties",
            last = ?last,
            name = ?name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            state = ?state,
            with_inactive = ?with_inactive,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    pub async fn properties(
        first: Option<i32>,
        after: Option<api::property::list::Cursor>,
        last: Option<i32>,
        before: Option<api::property::list::Cursor>,
        name: Option<api::property::Name>,
        state: Option<api::property::State>,
        best_price: Option<api::property::list::PriceCondition>,
        with_inactive: Option<bool>,
        ctx: &Context,
    ) -> Result<api::property::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        _ = ctx.current_session().await?;

        let arguments = read::property::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        let filter = read::property::list::Filter {
            name: name.map(Into::into),
            state: state.map(Into::into),
            best_price: best_price.map(Into::into),
            with_inactive: with_inactive.unwrap_or_default(),
        };
        ctx.service()
            .execute(query::properties::List::by(
                read::property::list::Selector {
                    arguments,
                    filter: filter.clone(),
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|page| api::property::list::Connection::new(page, filter))
    }

    /// Returns the `Offer` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "offer",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::offer::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| OfferError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum OfferError {
        #[code = "OFFER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Offer` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PartnerError {
        #[code = "PARTNER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Partner` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Property` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PropertyTypeError {
        #[code = "PROPERTY_TYPE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`PropertyType` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
