//! [`Command`] for creating a new [`Property`].

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use rust_decimal::Decimal;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        property::{self, Area, Price, State},
        property_tag, property_type, user, Property, PropertyTag,
        PropertyType, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Property`] for sale.
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// [`property::Name`] of a new [`Property`].
    pub name: property::Name,

    /// [`property::Description`] of a new [`Property`].
    pub description: property::Description,

    /// ID of the [`PropertyType`] of a new [`Property`].
    pub type_id: Option<property_type::Id>,

    /// IDs of the [`PropertyTag`]s to attach.
    pub tag_ids: Vec<property_tag::Id>,

    /// [`property::Postcode`] of a new [`Property`].
    pub postcode: Option<property::Postcode>,

    /// Availability date, three months after creation if omitted.
    pub available_from: Option<property::AvailabilityDate>,

    /// Price the seller expects to get.
    pub expected_price: Decimal,

    /// Number of bedrooms, [`property::DEFAULT_BEDROOMS`] if omitted.
    pub bedrooms: Option<u16>,

    /// Living area in square meters.
    pub living_area: Decimal,

    /// Number of facades.
    pub facades: u16,

    /// Indicator whether a new [`Property`] has a garage.
    pub has_garage: bool,

    /// Indicator whether a new [`Property`] has a garden.
    pub has_garden: bool,

    /// Garden area, the garden default if omitted.
    pub garden_area: Option<Decimal>,

    /// Garden orientation, the garden default if omitted.
    pub garden_orientation: Option<property::GardenOrientation>,

    /// Indicator whether the garden is walled.
    pub is_garden_walled: bool,

    /// ID of the [`User`] selling a new [`Property`].
    pub salesperson_id: user::Id,
}

impl<Db> Command<CreateProperty> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
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
        > + Database<Insert<Property>, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;
        use property::ValidationError as V;

        let CreateProperty {
            name,
            description,
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
            salesperson_id,
        } = cmd;

        let expected_price = Price::new(expected_price)
            .ok_or(E::Validation(V::NegativePrice))
            .map_err(tracerr::wrap!())?;
        let living_area = Area::new(living_area)
            .ok_or(E::Validation(V::NegativeArea))
            .map_err(tracerr::wrap!())?;
        let garden_area = garden_area
            .map(|a| Area::new(a).ok_or(E::Validation(V::NegativeArea)))
            .transpose()
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::<Option<User>, _>::new(salesperson_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SalespersonNotExists(salesperson_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        if let Some(type_id) = type_id {
            self.database()
                .execute(Select(By::<Option<PropertyType>, _>::new(type_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::TypeNotExists(type_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        let tag_ids = tag_ids.into_iter().unique().collect::<Vec<_>>();
        let tags = self
            .database()
            .execute(Select(By::<HashMap<_, PropertyTag>, _>::new(
                tag_ids.as_slice(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(missing) = tag_ids.iter().find(|id| !tags.contains_key(id))
        {
            return Err(tracerr::new!(E::TagNotExists(*missing)));
        }

        let created_at = DateTime::now().coerce();
        let mut property = Property {
            id: property::Id::new(),
            name,
            description,
            is_active: true,
            type_id,
            tag_ids,
            state: State::New,
            postcode,
            available_from: available_from.unwrap_or_else(|| {
                Property::default_availability(created_at)
            }),
            expected_price,
            selling_price: Price::ZERO,
            bedrooms: bedrooms.unwrap_or(property::DEFAULT_BEDROOMS),
            living_area,
            facades,
            has_garage,
            has_garden: false,
            garden_area: Area::ZERO,
            garden_orientation: None,
            is_garden_walled,
            buyer_id: None,
            salesperson_id,
            created_at,
        };
        property.toggle_garden(has_garden);
        if let Some(area) = garden_area {
            property.garden_area = area;
        }
        if garden_orientation.is_some() {
            property.garden_orientation = garden_orientation;
        }

        self.database()
            .execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Property(id: {})` listed by `User(id: {salesperson_id})`",
            property.id,
        );

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Salesperson [`User`] does not exist.
    #[display("`User(id: {_0})` does not exist")]
    SalespersonNotExists(#[error(not(source))] user::Id),

    /// [`PropertyType`] does not exist.
    #[display("`PropertyType(id: {_0})` does not exist")]
    TypeNotExists(#[error(not(source))] property_type::Id),

    /// [`PropertyTag`] does not exist.
    #[display("`PropertyTag(id: {_0})` does not exist")]
    TagNotExists(#[error(not(source))] property_tag::Id),

    /// Provided values violate [`Property`] rules.
    #[display("Invalid `Property`: {_0}")]
    #[from]
    Validation(property::ValidationError),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::fixture,
        domain::{
            property::{self, GardenOrientation, State},
            property_tag, user, Property,
        },
        Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn fills_in_defaults() {
        let svc = fixture::service();
        let seller = fixture::user(&svc, "seller").await;

        let p = svc
            .execute(fixture::draft(seller.id, 100_000))
            .await
            .unwrap();

        assert_eq!(p.state, State::New);
        assert!(p.is_active);
        assert_eq!(p.bedrooms, property::DEFAULT_BEDROOMS);
        assert_eq!(
            p.available_from,
            Property::default_availability(p.created_at),
        );
        assert_eq!(p.selling_price, property::Price::ZERO);
        assert_eq!(p.salesperson_id, seller.id);
        assert_eq!(p.total_area().value(), Decimal::from(120));
    }

    #[tokio::test]
    async fn applies_garden_defaults_unless_provided() {
        let svc = fixture::service();
        let seller = fixture::user(&svc, "seller").await;

        let mut draft = fixture::draft(seller.id, 100_000);
        draft.has_garden = true;
        let defaulted = svc.execute(draft.clone()).await.unwrap();

        draft.garden_area = Some(Decimal::from(25));
        draft.garden_orientation = Some(GardenOrientation::South);
        let explicit = svc.execute(draft).await.unwrap();

        assert_eq!(defaulted.garden_area.value(), Decimal::TEN);
        assert_eq!(
            defaulted.garden_orientation,
            Some(GardenOrientation::North),
        );
        assert_eq!(defaulted.total_area().value(), Decimal::from(130));
        assert_eq!(explicit.garden_area.value(), Decimal::from(25));
        assert_eq!(explicit.garden_orientation, Some(GardenOrientation::South));
    }

    #[tokio::test]
    async fn rejects_negative_expected_price() {
        let svc = fixture::service();
        let seller = fixture::user(&svc, "seller").await;

        let err = svc
            .execute(fixture::draft(seller.id, -1))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Validation(
                property::ValidationError::NegativePrice,
            ),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_references() {
        let svc = fixture::service();
        let seller = fixture::user(&svc, "seller").await;
        let tag_id = property_tag::Id::new();

        let mut draft = fixture::draft(seller.id, 100_000);
        draft.tag_ids = vec![tag_id];
        let err = svc.execute(draft).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::TagNotExists(id) if *id == tag_id,
        ));

        let err = svc
            .execute(fixture::draft(user::Id::new(), 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::SalespersonNotExists(_),
        ));
    }
}
