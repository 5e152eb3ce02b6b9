//! [`Query`] collection related to [`PropertyType`]s.

use common::operations::By;

use crate::domain::{property_type, PropertyType};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`PropertyType`] by its [`property_type::Id`].
pub type ById = DatabaseQuery<By<Option<PropertyType>, property_type::Id>>;

/// Queries all the [`PropertyType`]s ordered by name.
pub type All = DatabaseQuery<By<Vec<PropertyType>, ()>>;
