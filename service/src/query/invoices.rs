//! [`Query`] collection related to the multiple [`Invoice`]s.

use common::operations::By;

use crate::domain::{property, Invoice};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries all the [`Invoice`]s issued for a sold [`Property`].
pub type ByProperty = DatabaseQuery<By<Vec<Invoice>, property::Id>>;
