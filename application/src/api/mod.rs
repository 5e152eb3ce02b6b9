//! GraphQL API definitions.

pub mod invoice;
mod mutation;
pub mod offer;
pub mod partner;
pub mod property;
pub mod property_tag;
pub mod property_type;
mod query;
pub mod scalar;
pub mod user;

use crate::{define_error, Context};

pub use self::{
    invoice::Invoice, mutation::Mutation, offer::Offer, partner::Partner,
    property::Property, property_tag::PropertyTag,
    property_type::PropertyType, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<
    'static,
    Query,
    Mutation,
    juniper::EmptySubscription<Context>,
>;

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
