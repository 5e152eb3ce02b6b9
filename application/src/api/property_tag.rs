//! [`PropertyTag`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A label attached to properties, e.g. "cozy" or "renovated".
#[derive(Clone, Debug, From)]
pub struct PropertyTag(domain::PropertyTag);

/// A label attached to properties, e.g. "cozy" or "renovated".
#[graphql_object(context = Context)]
impl PropertyTag {
    /// Unique identifier of this `PropertyTag`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PropertyTag.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Unique name of this `PropertyTag`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PropertyTag.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// `DateTime` when this `PropertyTag` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "PropertyTag.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `PropertyTag`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::property_tag::Id)]
#[into(domain::property_tag::Id)]
#[graphql(name = "PropertyTagId", transparent)]
pub struct Id(Uuid);

/// Name of a `PropertyTag`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PropertyTagName",
    with = scalar::Via::<domain::property_tag::Name>,
)]
pub struct Name(domain::property_tag::Name);
