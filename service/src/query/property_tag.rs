//! [`Query`] collection related to [`PropertyTag`]s.

use std::collections::HashMap;

use common::operations::By;

use crate::domain::{property_tag, PropertyTag};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`PropertyTag`] by its [`property_tag::Id`].
pub type ById = DatabaseQuery<By<Option<PropertyTag>, property_tag::Id>>;

/// Queries multiple [`PropertyTag`]s by their [`property_tag::Id`]s at once.
pub type ByIds = DatabaseQuery<
    By<HashMap<property_tag::Id, PropertyTag>, Vec<property_tag::Id>>,
>;

/// Queries all the [`PropertyTag`]s ordered by name.
pub type All = DatabaseQuery<By<Vec<PropertyTag>, ()>>;
