//! [`PropertyTag`] definitions.

use common::{unit, DateTimeOf};

use crate::domain::{define_id, define_text};

/// Free-form label attached to a [`Property`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct PropertyTag {
    /// ID of this [`PropertyTag`].
    pub id: Id,

    /// [`Name`] of this [`PropertyTag`].
    pub name: Name,

    /// When this [`PropertyTag`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`PropertyTag`]."]
    pub struct Id;
}

define_text! {
    #[doc = "Unique name of a [`PropertyTag`]."]
    pub struct Name(String) where len <= 64;
}

/// [`DateTime`] when a [`PropertyTag`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(PropertyTag, unit::Creation)>;
