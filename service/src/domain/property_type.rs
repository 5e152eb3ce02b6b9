//! [`PropertyType`] definitions.

use common::{unit, DateTimeOf};

use crate::domain::{define_id, define_text};

/// Category of a [`Property`] (house, apartment, etc).
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct PropertyType {
    /// ID of this [`PropertyType`].
    pub id: Id,

    /// [`Name`] of this [`PropertyType`].
    pub name: Name,

    /// When this [`PropertyType`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`PropertyType`]."]
    pub struct Id;
}

define_text! {
    #[doc = "Unique name of a [`PropertyType`]."]
    pub struct Name(String) where len <= 128;
}

/// [`DateTime`] when a [`PropertyType`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(PropertyType, unit::Creation)>;
