//! [`Partner`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

use crate::domain::{define_id, define_text};

/// Counterparty making [`Offer`]s and buying [`Property`]s.
///
/// [`Offer`]: crate::domain::Offer
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Partner {
    /// ID of this [`Partner`].
    pub id: Id,

    /// [`Name`] of this [`Partner`].
    pub name: Name,

    /// [`DateTime`] when this [`Partner`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`Partner`]."]
    pub struct Id;
}

define_text! {
    #[doc = "Name of a [`Partner`]."]
    pub struct Name(String) where len <= 256;
}

/// [`DateTime`] when a [`Partner`] was created.
pub type CreationDateTime = DateTimeOf<(Partner, unit::Creation)>;
