//! [`PropertyTag`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property_tag, PropertyTag},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds a [`PropertyTag`] out of a `property_tags` table [`Row`].
fn from_row(row: &Row) -> PropertyTag {
    PropertyTag {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<property_tag::Id, PropertyTag>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property_tag::Id]>,
{
    type Ok = HashMap<property_tag::Id, PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property_tag::Id, PropertyTag>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property_tag::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM property_tags \
            WHERE id = ANY($1::UUID[])";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let tag = from_row(row);
                (tag.id, tag)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<PropertyTag>, property_tag::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<
            By<HashMap<property_tag::Id, PropertyTag>, [property_tag::Id; 1]>,
        >,
        Ok = HashMap<property_tag::Id, PropertyTag>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyTag>, property_tag::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'n, C> Database<Select<By<Option<PropertyTag>, &'n property_tag::Name>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyTag>, &'n property_tag::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM property_tags \
            WHERE name = $1::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[name])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<PropertyTag>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<PropertyTag>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM property_tags \
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

impl<C> Database<Insert<PropertyTag>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<PropertyTag>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tag): Insert<PropertyTag>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(tag)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<PropertyTag>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(tag): Update<PropertyTag>,
    ) -> Result<Self::Ok, Self::Err> {
        let PropertyTag {
            id,
            name,
            created_at,
        } = tag;

        const SQL: &str = "\
            INSERT INTO property_tags (id, name, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::TIMESTAMPTZ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name";
        self.exec(SQL, &[&id, &name, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
