//! [`Partner`]-related definitions.

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

/// A counterparty making offers and buying properties.
#[derive(Clone, Debug)]
pub struct Partner {
    /// ID of this [`Partner`].
    id: Id,

    /// Underlying [`domain::Partner`].
    partner: OnceCell<domain::Partner>,
}

impl From<domain::Partner> for Partner {
    fn from(partner: domain::Partner) -> Self {
        Self {
            id: partner.id.into(),
            partner: OnceCell::new_with(Some(partner)),
        }
    }
}

impl Partner {
    /// Creates a new [`Partner`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Partner`] with the provided ID exists,
    /// otherwise accessing this [`Partner`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            partner: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Partner`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Partner`] doesn't exist.
    async fn partner(&self, ctx: &Context) -> Result<&domain::Partner, Error> {
        let id = self.id.into();
        self.partner
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::partner::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|p| {
                        future::ready(p.ok_or_else(|| {
                            api::query::PartnerError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A counterparty making offers and buying properties.
#[graphql_object(context = Context)]
impl Partner {
    /// Unique identifier of this `Partner`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Partner.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Partner`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Partner.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.partner(ctx).await?.name.clone().into())
    }

    /// `DateTime` when this `Partner` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Partner.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.partner(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Partner`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::partner::Id)]
#[into(domain::partner::Id)]
#[graphql(name = "PartnerId", transparent)]
pub struct Id(Uuid);

/// Name of a `Partner`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PartnerName",
    with = scalar::Via::<domain::partner::Name>,
)]
pub struct Name(domain::partner::Name);
