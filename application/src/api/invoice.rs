//! [`Invoice`]-related definitions.

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A customer invoice issued to the buyer of a sold `Property`.
#[derive(Clone, Debug, From)]
pub struct Invoice(domain::Invoice);

/// A customer invoice issued to the buyer of a sold `Property`.
#[graphql_object(context = Context)]
impl Invoice {
    /// Unique identifier of this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Partner` being invoiced.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.partner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn partner(&self) -> api::Partner {
        #[expect(unsafe_code, reason = "`Partner`s are never deleted")]
        unsafe {
            api::Partner::new_unchecked(self.0.partner_id)
        }
    }

    /// Code of the accounting journal this `Invoice` is registered in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.journal",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn journal(&self) -> String {
        self.0.journal.to_string()
    }

    /// Lines of this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.lines",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn lines(&self) -> Vec<Line> {
        self.0.lines.iter().cloned().map(Line).collect()
    }

    /// Total amount of this `Invoice`.
    ///
    /// `null` if its lines are in different currencies.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.total",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn total(&self) -> Option<Money> {
        self.0.total()
    }

    /// `DateTime` when this `Invoice` was issued.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// A single line of an `Invoice`.
#[derive(Clone, Debug)]
pub struct Line(domain::invoice::Line);

/// A single line of an `Invoice`.
#[graphql_object(name = "InvoiceLine", context = Context)]
impl Line {
    /// Human-readable label of this `InvoiceLine`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    /// Number of units.
    #[must_use]
    pub fn quantity(&self) -> scalar::Decimal {
        self.0.quantity.into()
    }

    /// Price of a single unit.
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.0.unit_price
    }

    /// Amount of this `InvoiceLine`, being `quantity × unitPrice`.
    #[must_use]
    pub fn amount(&self) -> Option<Money> {
        self.0.amount()
    }
}

/// Unique identifier of an `Invoice`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::invoice::Id)]
#[into(domain::invoice::Id)]
#[graphql(name = "InvoiceId", transparent)]
pub struct Id(Uuid);
