//! [`Query`] collection related to the multiple [`Offer`]s.

use common::operations::By;

use crate::domain::{property, Offer};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries all the [`Offer`]s made for a [`Property`], oldest first.
pub type ByProperty = DatabaseQuery<By<Vec<Offer>, property::Id>>;
