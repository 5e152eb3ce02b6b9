//! [`Query`] collection related to a single [`User`].

use common::operations::By;

use crate::{
    domain::{user, User},
    read,
};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// Queries [`Property`]s a [`User`] is still actively selling.
pub type ActiveListings =
    DatabaseQuery<By<read::property::ActiveListings, user::Id>>;
