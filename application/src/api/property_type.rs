//! [`PropertyType`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A kind of property, e.g. a house or an apartment.
#[derive(Clone, Debug)]
pub struct PropertyType {
    /// ID of this [`PropertyType`].
    id: Id,

    /// Underlying [`domain::PropertyType`].
    ty: OnceCell<domain::PropertyType>,
}

impl From<domain::PropertyType> for PropertyType {
    fn from(ty: domain::PropertyType) -> Self {
        Self {
            id: ty.id.into(),
            ty: OnceCell::new_with(Some(ty)),
        }
    }
}

impl PropertyType {
    /// Creates a new [`PropertyType`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`PropertyType`] with the provided ID exists,
    /// otherwise accessing this [`PropertyType`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            ty: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::PropertyType`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::PropertyType`] doesn't exist.
    async fn ty(&self, ctx: &Context) -> Result<&domain::PropertyType, Error> {
        let id = self.id.into();
        self.ty
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::property_type::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|t| {
                        future::ready(t.ok_or_else(|| {
                            api::query::PropertyTypeError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A kind of property, e.g. a house or an apartment.
#[graphql_object(context = Context)]
impl PropertyType {
    /// Unique identifier of this `PropertyType`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PropertyType.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Unique name of this `PropertyType`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PropertyType.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.ty(ctx).await?.name.clone().into())
    }

    /// `DateTime` when this `PropertyType` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PropertyType.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.ty(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `PropertyType`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::property_type::Id)]
#[into(domain::property_type::Id)]
#[graphql(name = "PropertyTypeId", transparent)]
pub struct Id(Uuid);

/// Name of a `PropertyType`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyTypeName",
    with = scalar::Via::<domain::property_type::Name>,
)]
pub struct Name(domain::property_type::Name);
