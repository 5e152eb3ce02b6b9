//! [`Partner`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{partner, Partner},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Partner>, partner::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Partner>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Partner>, partner::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: partner::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM partners \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                row.map(|row| Partner {
                    id: row.get("id"),
                    name: row.get("name"),
                    created_at: row.get("created_at"),
                })
            })
    }
}

impl<C> Database<Insert<Partner>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Partner>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(partner): Insert<Partner>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(partner)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Partner>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(partner): Update<Partner>,
    ) -> Result<Self::Ok, Self::Err> {
        let Partner {
            id,
            name,
            created_at,
        } = partner;

        const SQL: &str = "\
            INSERT INTO partners (id, name, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::TIMESTAMPTZ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name";
        self.exec(SQL, &[&id, &name, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
