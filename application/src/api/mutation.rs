//! GraphQL [`Mutation`]s definitions.

use common::Date;
use juniper::{graphql_object, Nullable};
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LOGIN_OCCUPIED` - provided `UserLogin` is occupied by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUser",
            login = %login,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Registers a new `Partner` able to make `Offer`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createPartner",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_partner(
        name: api::partner::Name,
        ctx: &Context,
    ) -> Result<api::Partner, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::CreatePartner { name: name.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `PropertyType`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NAME_OCCUPIED` - provided name is used by another `PropertyType`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createPropertyType",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_property_type(
        name: api::property_type::Name,
        ctx: &Context,
    ) -> Result<api::PropertyType, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::CreatePropertyType { name: name.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `PropertyTag`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NAME_OCCUPIED` - provided name is used by another `PropertyTag`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createPropertyTag",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_property_tag(
        name: api::property_tag::Name,
        ctx: &Context,
    ) -> Result<api::PropertyTag, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::CreatePropertyTag { name: name.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists a new `Property` for sale, marketed by the current `User`.
    ///
    /// `availableFrom` defaults to three months from today, `bedrooms` to 2.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `TYPE_NOT_EXISTS` - provided `PropertyType` does not exist;
    /// - `TAG_NOT_EXISTS` - one of provided `PropertyTag`s does not exist;
    /// - `INVALID_PROPERTY` - provided prices or areas are not valid;
    /// - `COUNT_OUT_OF_RANGE` - `bedrooms` or `facades` is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createProperty",
            name = %name,
            otel.name = Self::SPAN_NAME,
            type_id = ?type_id,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    pub async fn create_property(
        name: api::property::Name,
        description: api::property::Description,
        type_id: Option<api::property_type::Id>,
        tag_ids: Option<Vec<api::property_tag::Id>>,
        postcode: Option<api::property::Postcode>,
        available_from: Option<Date>,
        expected_price: api::scalar::Decimal,
        bedrooms: Option<i32>,
        living_area: Option<api::scalar::Decimal>,
        facades: Option<i32>,
        has_garage: Option<bool>,
        has_garden: Option<bool>,
        garden_area: Option<api::scalar::Decimal>,
        garden_orientation: Option<api::property::GardenOrientation>,
        is_garden_walled: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let bedrooms = bedrooms.map(count).transpose().map_err(ctx.error())?;
        let facades = facades
            .map(count)
            .transpose()
            .map_err(ctx.error())?
            .unwrap_or_default();

        ctx.service()
            .execute(command::CreateProperty {
                name: name.into(),
                description: description.into(),
                type_id: type_id.map(Into::into),
                tag_ids: tag_ids
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                postcode: postcode.map(Into::into),
                available_from: available_from.map(Date::coerce),
                expected_price: expected_price.into(),
                bedrooms,
                living_area: living_area.map(Into::into).unwrap_or_default(),
                facades,
                has_garage: has_garage.unwrap_or_default(),
                has_garden: has_garden.unwrap_or_default(),
                garden_area: garden_area.map(Into::into),
                garden_orientation: garden_orientation.map(Into::into),
                is_garden_walled: is_garden_walled.unwrap_or_default(),
                salesperson_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the provided fields of the `Property` with the specified ID,
    /// leaving the omitted ones untouched.
    ///
    /// Enabling `hasGarden` resets the garden to 10 m² facing north, unless
    /// `gardenArea` or `gardenOrientation` is provided as well. Disabling it
    /// clears them.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does not
    ///                           exist;
    /// - `TYPE_NOT_EXISTS` - provided `PropertyType` does not exist;
    /// - `TAG_NOT_EXISTS` - one of provided `PropertyTag`s does not exist;
    /// - `INVALID_PROPERTY` - resulting prices or areas are not valid;
    /// - `COUNT_OUT_OF_RANGE` - `bedrooms` or `facades` is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProperty",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    pub async fn update_property(
        id: api::property::Id,
        name: Option<api::property::Name>,
        description: Option<api::property::Description>,
        is_active: Option<bool>,
        type_id: Nullable<api::property_type::Id>,
        tag_ids: Option<Vec<api::property_tag::Id>>,
        postcode: Nullable<api::property::Postcode>,
        available_from: Option<Date>,
        expected_price: Option<api::scalar::Decimal>,
        bedrooms: Option<i32>,
        living_area: Option<api::scalar::Decimal>,
        facades: Option<i32>,
        has_garage: Option<bool>,
        has_garden: Option<bool>,
        garden_area: Option<api::scalar::Decimal>,
        garden_orientation: Nullable<api::property::GardenOrientation>,
        is_garden_walled: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        _ = ctx.current_session().await?;

        let changes = command::update_property::Changes {
            name: name.map(Into::into),
            description: description.map(Into::into),
            is_active,
            type_id: type_id.explicit().map(|id| id.map(Into::into)),
            tag_ids: tag_ids
                .map(|ids| ids.into_iter().map(Into::into).collect()),
            postcode: postcode.explicit().map(|p| p.map(Into::into)),
            available_from: available_from.map(Date::coerce),
            expected_price: expected_price.map(Into::into),
            bedrooms: bedrooms
                .map(count)
                .transpose()
                .map_err(ctx.error())?,
            living_area: living_area.map(Into::into),
            facades: facades.map(count).transpose().map_err(ctx.error())?,
            has_garage,
            has_garden,
            garden_area: garden_area.map(Into::into),
            garden_orientation: garden_orientation
                .explicit()
                .map(|o| o.map(Into::into)),
            is_garden_walled,
        };

        ctx.service()
            .execute(command::UpdateProperty {
                property_id: id.into(),
                changes,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Property` with the specified ID along with its `Offer`s.
    ///
    /// Only new or cancelled `Property`s can be deleted.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does not
    ///                           exist;
    /// - `DELETION_FORBIDDEN` - the `Property` is neither new nor cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteProperty",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::property::Id, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::DeleteProperty {
                property_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|p| p.id.into())
    }

    /// Marks the `Property` with the specified ID as sold, invoicing its
    /// buyer.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does not
    ///                           exist;
    /// - `INVALID_TRANSITION` - the `Property` is cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markPropertySold",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_property_sold(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::MarkPropertySold {
                property_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Property` with the specified ID as cancelled.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does not
    ///                           exist;
    /// - `INVALID_TRANSITION` - the `Property` is sold.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markPropertyCancelled",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_property_cancelled(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::MarkPropertyCancelled {
                property_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Makes a new `Offer` of the `Partner` for the `Property`.
    ///
    /// `validity` is measured in days and defaults to 7.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does not
    ///                           exist;
    /// - `PARTNER_NOT_EXISTS` - the `Partner` with the specified ID does not
    ///                          exist;
    /// - `INVALID_OFFER` - the price is negative or lower than every existing
    ///                     `Offer` of the `Property`;
    /// - `INVALID_VALIDITY` - `validity` is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createOffer",
            otel.name = Self::SPAN_NAME,
            partner_id = %partner_id,
            price = %price,
            property_id = %property_id,
            validity = ?validity,
        ),
    )]
    pub async fn create_offer(
        property_id: api::property::Id,
        partner_id: api::partner::Id,
        price: api::scalar::Decimal,
        validity: Option<i32>,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        _ = ctx.current_session().await?;

        let validity = validity
            .map(validity_days)
            .transpose()
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateOffer {
                property_id: property_id.into(),
                partner_id: partner_id.into(),
                price: price.into(),
                validity,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Accepts the `Offer` with the specified ID, refusing all the other
    /// `Offer`s of its `Property`.
    ///
    /// Returns the `Property` with its buyer and selling price updated.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist;
    /// - `INVALID_TRANSITION` - the `Offer` is refused, another `Offer` is
    ///                          already accepted, or the `Property` is sold
    ///                          or cancelled;
    /// - `INVALID_PROPERTY` - the price is lower than 90% of the expected one.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "acceptOffer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn accept_offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::AcceptOffer { offer_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|out| out.property.into())
    }

    /// Refuses the `Offer` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist;
    /// - `INVALID_TRANSITION` - the `Offer` is already accepted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "refuseOffer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn refuse_offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::RefuseOffer { offer_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Sets the validity of the `Offer` with the specified ID in days,
    /// moving its deadline accordingly.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist;
    /// - `INVALID_VALIDITY` - `validity` is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "setOfferValidity",
            id = %id,
            otel.name = Self::SPAN_NAME,
            validity = %validity,
        ),
    )]
    pub async fn set_offer_validity(
        id: api::offer::Id,
        validity: i32,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        _ = ctx.current_session().await?;

        let validity = validity_days(validity).map_err(ctx.error())?;

        ctx.service()
            .execute(command::SetOfferValidity {
                offer_id: id.into(),
                validity,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Sets the deadline of the `Offer` with the specified ID, deriving its
    /// validity from it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist;
    /// - `INVALID_VALIDITY` - `deadline` is more than 36500 days away from
    ///                        the `Offer` creation.
    #[tracing::instrument(
        skip_all,
        fields(
            deadline = %deadline,
            gql.name = "setOfferDeadline",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn set_offer_deadline(
        id: api::offer::Id,
        deadline: Date,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(command::SetOfferDeadline {
                offer_id: id.into(),
                deadline: deadline.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum InputError {
        #[code = "COUNT_OUT_OF_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Count must be between 0 and 65535"]
        CountOutOfRange,

        #[code = "INVALID_VALIDITY"]
        #[status = BAD_REQUEST]
        #[message = "`Offer` validity must not exceed 36500 days in \
                     either direction"]
        Validity,
    }
}

/// Converts the provided GraphQL integer into a non-negative count.
fn count(value: i32) -> Result<u16, Error> {
    u16::try_from(value).map_err(|_| InputError::CountOutOfRange.into())
}

/// Converts the provided number of days into a [`domain::offer::Validity`].
fn validity_days(days: i32) -> Result<domain::offer::Validity, Error> {
    domain::offer::Validity::new(days)
        .ok_or_else(|| InputError::Validity.into())
}

define_error! {
    enum PropertyRulesError {
        #[code = "INVALID_PROPERTY"]
        #[status = BAD_REQUEST]
        #[message = "`Property` prices or areas are invalid"]
        Invalid,

        #[code = "TYPE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`PropertyType` with the provided ID does not exist"]
        TypeNotExists,

        #[code = "TAG_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`PropertyTag` with the provided ID does not exist"]
        TagNotExists,

        #[code = "INVALID_TRANSITION"]
        #[status = CONFLICT]
        #[message = "Sold `Property` cannot be cancelled and cancelled \
                     `Property` cannot be sold"]
        Transition,
    }
}

define_error! {
    enum OfferRulesError {
        #[code = "INVALID_OFFER"]
        #[status = BAD_REQUEST]
        #[message = "`Offer` price cannot be negative or lower than the \
                     lowest existing `Offer`"]
        Invalid,

        #[code = "INVALID_TRANSITION"]
        #[status = CONFLICT]
        #[message = "`Offer` status or its `Property` state forbids \
                     this change"]
        Transition,

        #[code = "INVALID_VALIDITY"]
        #[status = BAD_REQUEST]
        #[message = "`Offer` deadline is too far from its creation"]
        Validity,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LOGIN_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserLogin` is occupied by another \
                             `User`"]
                LoginOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LoginOccupied(_) => Some(Error::LoginOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::create_partner::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_property_type::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`PropertyTypeName` is used by another \
                             `PropertyType`"]
                NameOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NameOccupied(_) => Some(Error::NameOccupied.into()),
        }
    }
}

impl AsError for command::create_property_tag::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`PropertyTagName` is used by another \
                             `PropertyTag`"]
                NameOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NameOccupied(_) => Some(Error::NameOccupied.into()),
        }
    }
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            // Salesperson is the authorized `User`, so it's an internal error.
            Self::SalespersonNotExists(_) => return None,
            Self::TypeNotExists(_) => PropertyRulesError::TypeNotExists.into(),
            Self::TagNotExists(_) => PropertyRulesError::TagNotExists.into(),
            Self::Validation(_) => PropertyRulesError::Invalid.into(),
        })
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => {
                api::query::PropertyError::NotExists.into()
            }
            Self::TypeNotExists(_) => PropertyRulesError::TypeNotExists.into(),
            Self::TagNotExists(_) => PropertyRulesError::TagNotExists.into(),
            Self::Validation(_) => PropertyRulesError::Invalid.into(),
        })
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DELETION_FORBIDDEN"]
                #[status = CONFLICT]
                #[message = "Only new or cancelled `Property` can be deleted"]
                Forbidden,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => {
                api::query::PropertyError::NotExists.into()
            }
            Self::Forbidden(_) => Error::Forbidden.into(),
        })
    }
}

impl AsError for command::mark_property_sold::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => {
                api::query::PropertyError::NotExists.into()
            }
            Self::Transition(_) => PropertyRulesError::Transition.into(),
        })
    }
}

impl AsError for command::mark_property_cancelled::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => {
                api::query::PropertyError::NotExists.into()
            }
            Self::Transition(_) => PropertyRulesError::Transition.into(),
        })
    }
}

impl AsError for command::create_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PropertyNotExists(_) => {
                api::query::PropertyError::NotExists.into()
            }
            Self::PartnerNotExists(_) => {
                api::query::PartnerError::NotExists.into()
            }
            Self::Invalid(_) => OfferRulesError::Invalid.into(),
        })
    }
}

impl AsError for command::accept_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::OfferNotExists(_) => api::query::OfferError::NotExists.into(),
            Self::Transition(_) => OfferRulesError::Transition.into(),
            Self::Validation(_) => PropertyRulesError::Invalid.into(),
        })
    }
}

impl AsError for command::refuse_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::OfferNotExists(_) => api::query::OfferError::NotExists.into(),
            Self::Transition(_) => OfferRulesError::Transition.into(),
        })
    }
}

impl AsError for command::set_offer_validity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::OfferNotExists(_) => {
                Some(api::query::OfferError::NotExists.into())
            }
        }
    }
}

impl AsError for command::set_offer_deadline::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::OfferNotExists(_) => api::query::OfferError::NotExists.into(),
            Self::Validity(_) => OfferRulesError::Validity.into(),
        })
    }
}

#[cfg(test)]
mod spec {
    use super::{count, validity_days};

    #[test]
    fn counts_fit_into_u16() {
        assert_eq!(count(0).unwrap(), 0);
        assert_eq!(count(65_535).unwrap(), u16::MAX);
        assert_eq!(count(-1).unwrap_err().code, "COUNT_OUT_OF_RANGE");
        assert_eq!(count(65_536).unwrap_err().code, "COUNT_OUT_OF_RANGE");
    }

    #[test]
    fn validity_is_bounded() {
        assert_eq!(validity_days(7).unwrap().days(), 7);
        assert_eq!(validity_days(-3).unwrap().days(), -3);
        assert_eq!(
            validity_days(36_501).unwrap_err().code,
            "INVALID_VALIDITY",
        );
    }
}
