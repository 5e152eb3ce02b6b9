//! [`Command`] for editing an existing [`Property`].

use std::collections::HashMap;

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, Area, Price},
        property_tag, property_type, Property, PropertyTag, PropertyType,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing the descriptive fields of a [`Property`].
///
/// [`property::State`], buyer and selling price are driven by offers only
/// and cannot be changed here.
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to edit.
    pub property_id: property::Id,

    /// [`Changes`] to apply.
    pub changes: Changes,
}

/// Changes of a [`Property`], where [`None`] leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct Changes {
    /// New [`property::Name`].
    pub name: Option<property::Name>,

    /// New [`property::Description`].
    pub description: Option<property::Description>,

    /// New visibility in listings.
    pub is_active: Option<bool>,

    /// New [`PropertyType`], or [`Some`]`(`[`None`]`)` to unset it.
    pub type_id: Option<Option<property_type::Id>>,

    /// New full set of [`PropertyTag`]s.
    pub tag_ids: Option<Vec<property_tag::Id>>,

    /// New [`property::Postcode`], or [`Some`]`(`[`None`]`)` to unset it.
    pub postcode: Option<Option<property::Postcode>>,

    /// New availability date.
    pub available_from: Option<property::AvailabilityDate>,

    /// New expected price.
    pub expected_price: Option<Decimal>,

    /// New number of bedrooms.
    pub bedrooms: Option<u16>,

    /// New living area.
    pub living_area: Option<Decimal>,

    /// New number of facades.
    pub facades: Option<u16>,

    /// New garage indicator.
    pub has_garage: Option<bool>,

    /// New garden indicator, applied before the garden details below.
    pub has_garden: Option<bool>,

    /// New garden area.
    pub garden_area: Option<Decimal>,

    /// New garden orientation, or [`Some`]`(`[`None`]`)` to unset it.
    pub garden_orientation: Option<Option<property::GardenOrientation>>,

    /// New walled garden indicator.
    pub is_garden_walled: Option<bool>,
}

impl<Db> Command<UpdateProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<PropertyType>, property_type::Id>>,
            Ok = Option<PropertyType>,
            Err = Traced<database::Error>,
        > + for<'i> Database<
            Select<
                By<
                    HashMap<property_tag::Id, PropertyTag>,
                    &'i [property_tag::Id],
                >,
            >,
            Ok = HashMap<property_tag::Id, PropertyTag>,
            Err = Traced<database::Error>,
        > + Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use property::ValidationError as V;
        use ExecutionError as E;

        let UpdateProperty {
            property_id,
            changes,
        } = cmd;
        let Changes {
            name,
            description,
            is_active,
            type_id,
            tag_ids,
            postcode,
            available_from,
            expected_price,
            bedrooms,
            living_area,
            facades,
            has_garage,
            has_garden,
            garden_area,
            garden_orientation,
            is_garden_walled,
        } = changes;

        let expected_price = expected_price
            .map(|p| Price::new(p).ok_or(E::Validation(V::NegativePrice)))
            .transpose()
            .map_err(tracerr::wrap!())?;
        let [living_area, garden_area] = [living_area, garden_area].map(|a| {
            a.map(|a| Area::new(a).ok_or(E::Validation(V::NegativeArea)))
                .transpose()
        });
        let living_area = living_area.map_err(tracerr::wrap!())?;
        let garden_area = garden_area.map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        if let Some(Some(type_id)) = type_id {
            tx.execute(Select(By::<Option<PropertyType>, _>::new(type_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::TypeNotExists(type_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }
        if let Some(tag_ids) = tag_ids {
            let tag_ids = tag_ids.into_iter().unique().collect::<Vec<_>>();
            let tags = tx
                .execute(Select(By::<HashMap<_, PropertyTag>, _>::new(
                    tag_ids.as_slice(),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if let Some(missing) =
                tag_ids.iter().find(|id| !tags.contains_key(id))
            {
                return Err(tracerr::new!(E::TagNotExists(*missing)));
            }
            property.tag_ids = tag_ids;
        }

        if let Some(name) = name {
            property.name = name;
        }
        if let Some(description) = description {
            property.description = description;
        }
        if let Some(is_active) = is_active {
            property.is_active = is_active;
        }
        if let Some(type_id) = type_id {
            property.type_id = type_id;
        }
        if let Some(postcode) = postcode {
            property.postcode = postcode;
        }
        if let Some(date) = available_from {
            property.available_from = date;
        }
        if let Some(price) = expected_price {
            property.expected_price = price;
        }
        if let Some(bedrooms) = bedrooms {
            property.bedrooms = bedrooms;
        }
        if let Some(area) = living_area {
            property.living_area = area;
        }
        if let Some(facades) = facades {
            property.facades = facades;
        }
        if let Some(has_garage) = has_garage {
            property.has_garage = has_garage;
        }
        if let Some(has_garden) = has_garden {
            property.toggle_garden(has_garden);
        }
        if let Some(area) = garden_area {
            property.garden_area = area;
        }
        if let Some(orientation) = garden_orientation {
            property.garden_orientation = orientation;
        }
        if let Some(walled) = is_garden_walled {
            property.is_garden_walled = walled;
        }

        property
            .validate_selling_price()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`PropertyType`] does not exist.
    #[display("`PropertyType(id: {_0})` does not exist")]
    TypeNotExists(#[error(not(source))] property_type::Id),

    /// [`PropertyTag`] does not exist.
    #[display("`PropertyTag(id: {_0})` does not exist")]
    TagNotExists(#[error(not(source))] property_tag::Id),

    /// Changes violate [`Property`] rules.
    #[display("Invalid `Property`: {_0}")]
    #[from]
    Validation(property::ValidationError),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, AcceptOffer, CreatePropertyTag, UpdateProperty},
        domain::{
            property::{self, GardenOrientation},
            property_tag,
        },
        Command as _,
    };

    use super::{Changes, ExecutionError};

    #[tokio::test]
    async fn keeps_user_entered_garden_when_switched_off() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;

        let on = svc
            .execute(UpdateProperty {
                property_id: p.id,
                changes: Changes {
                    has_garden: Some(true),
                    garden_area: Some(Decimal::from(40)),
                    ..Changes::default()
                },
            })
            .await
            .unwrap();
        let off = svc
            .execute(UpdateProperty {
                property_id: p.id,
                changes: Changes {
                    has_garden: Some(false),
                    ..Changes::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(on.garden_orientation, Some(GardenOrientation::North));
        assert_eq!(on.total_area().value(), Decimal::from(160));
        assert!(!off.has_garden);
        assert_eq!(off.garden_area.value(), Decimal::from(40));
        assert_eq!(off.garden_orientation, Some(GardenOrientation::North));
    }

    #[tokio::test]
    async fn revalidates_selling_price_floor() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 90_000).await;
        drop(svc.execute(AcceptOffer { offer_id: offer.id }).await.unwrap());

        let err = svc
            .execute(UpdateProperty {
                property_id: p.id,
                changes: Changes {
                    expected_price: Some(Decimal::from(110_000)),
                    ..Changes::default()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Validation(
                property::ValidationError::SellingPriceTooLow { .. },
            ),
        ));
    }

    #[tokio::test]
    async fn replaces_tags() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let tag = svc
            .execute(CreatePropertyTag {
                name: property_tag::Name::new("renovated").unwrap(),
            })
            .await
            .unwrap();

        let updated = svc
            .execute(UpdateProperty {
                property_id: p.id,
                changes: Changes {
                    tag_ids: Some(vec![tag.id, tag.id]),
                    ..Changes::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.tag_ids, [tag.id]);
    }
}
