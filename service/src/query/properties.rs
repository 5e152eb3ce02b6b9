//! [`Query`] collection related to the multiple [`Property`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a page of [`Property`] listings.
pub type List = DatabaseQuery<
    By<read::property::list::Page, read::property::list::Selector>,
>;

/// Queries total count of [`Property`] listings passing a filter.
pub type TotalCount = DatabaseQuery<
    By<read::property::list::TotalCount, read::property::list::Filter>,
>;
