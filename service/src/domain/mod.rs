//! Domain definitions.

pub mod invoice;
pub mod offer;
pub mod partner;
pub mod property;
pub mod property_tag;
pub mod property_type;
pub mod user;

pub use self::{
    invoice::Invoice, offer::Offer, partner::Partner, property::Property,
    property_tag::PropertyTag, property_type::PropertyType, user::User,
};

/// Defines a non-empty, whitespace-trimmed text newtype of a bounded length.
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        pub struct $name:ident(String) where len <= $max:literal;
    ) => {
        #[doc = $doc]
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            PartialEq,
        )]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!(
                "Creates a new [`", stringify!($name), "`] if the given ",
                "`value` is not empty, has no surrounding whitespace and is ",
                "at most ", stringify!($max), " bytes long.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                (value.trim() == value
                    && !value.is_empty()
                    && value.len() <= $max)
                    .then_some(Self(value))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
                    .ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

/// Defines a random [UUID]-backed identifier newtype.
///
/// [UUID]: https://wikipedia.org/wiki/Universally_unique_identifier
macro_rules! define_id {
    (
        #[doc = $doc:literal]
        pub struct $name:ident;
    ) => {
        #[doc = $doc]
        #[derive(
            Clone,
            Copy,
            Debug,
            ::serde::Deserialize,
            ::derive_more::Display,
            Eq,
            ::derive_more::From,
            ::derive_more::FromStr,
            Hash,
            ::derive_more::Into,
            Ord,
            PartialEq,
            PartialOrd,
            ::serde::Serialize,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        pub struct $name(::uuid::Uuid);

        impl $name {
            #[doc = concat!(
                "Creates a new random [`", stringify!($name), "`].",
            )]
            #[must_use]
            pub fn new() -> Self {
                Self(::uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

pub(crate) use define_id;
pub(crate) use define_text;
