//! [`PropertyType`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property_type, PropertyType},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`PropertyType`] out of a `property_types` table [`Row`].
fn from_row(row: &Row) -> PropertyType {
    PropertyType {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<property_type::Id, PropertyType>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property_type::Id]>,
{
    type Ok = HashMap<property_type::Id, PropertyType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property_type::Id, PropertyType>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property_type::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM property_types \
            WHERE id = ANY($1::UUID[])";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let ty = from_row(row);
                (ty.id, ty)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<PropertyType>, property_type::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<
            By<
                HashMap<property_type::Id, PropertyType>,
                [property_type::Id; 1],
            >,
        >,
        Ok = HashMap<property_type::Id, PropertyType>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<PropertyType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyType>, property_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'n, C> Database<Select<By<Option<PropertyType>, &'n property_type::Name>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<PropertyType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyType>, &'n property_type::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM property_types \
            WHERE name = $1::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[name])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<PropertyType>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<PropertyType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<PropertyType>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM property_types \
            ORDER BY name";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<PropertyType>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<PropertyType>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(ty): Insert<PropertyType>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(ty)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<PropertyType>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(ty): Update<PropertyType>,
    ) -> Result<Self::Ok, Self::Err> {
        let PropertyType {
            id,
            name,
            created_at,
        } = ty;

        const SQL: &str = "\
            INSERT INTO property_types (id, name, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::TIMESTAMPTZ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name";
        self.exec(SQL, &[&id, &name, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
