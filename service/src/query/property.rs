//! [`Query`] collection related to a single [`Property`].

use std::collections::HashMap;

use common::operations::By;

use crate::domain::{property, Property};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Property`] by its [`property::Id`].
pub type ById = DatabaseQuery<By<Option<Property>, property::Id>>;

/// Queries multiple [`Property`]s by their [`property::Id`]s at once.
pub type ByIds =
    DatabaseQuery<By<HashMap<property::Id, Property>, Vec<property::Id>>>;
