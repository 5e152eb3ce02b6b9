//! [`Property`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, State},
        user, Property,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read::{self, property::list::Filter},
};

/// Columns of the `properties` table, along with the aggregated tags.
const COLUMNS: &str = "\
    id, name, description, is_active, type_id, \
    ARRAY(SELECT tag_id \
          FROM properties_tags \
          WHERE property_id = properties.id \
          ORDER BY tag_id) AS tag_ids, \
    state, postcode, available_from, expected_price, selling_price, \
    bedrooms, living_area, facades, \
    has_garage, has_garden, garden_area, garden_orientation, \
    is_garden_walled, buyer_id, salesperson_id, created_at";

/// Builds a [`Property`] out of a [`Row`] selected with [`COLUMNS`].
fn from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        is_active: row.get("is_active"),
        type_id: row.get("type_id"),
        tag_ids: row.get("tag_ids"),
        state: row.get("state"),
        postcode: row.get("postcode"),
        available_from: row.get("available_from"),
        expected_price: row.get("expected_price"),
        selling_price: row.get("selling_price"),
        bedrooms: u16::try_from(row.get::<_, i32>("bedrooms"))
            .expect("`bedrooms` overflow"),
        living_area: row.get("living_area"),
        facades: u16::try_from(row.get::<_, i32>("facades"))
            .expect("`facades` overflow"),
        has_garage: row.get("has_garage"),
        has_garden: row.get("has_garden"),
        garden_area: row.get("garden_area"),
        garden_orientation: row.get("garden_orientation"),
        is_garden_walled: row.get("is_garden_walled"),
        buyer_id: row.get("buyer_id"),
        salesperson_id: row.get("salesperson_id"),
        created_at: row.get("created_at"),
    }
}

/// Renders SQL conditions of the provided [`Filter`], pushing their
/// parameters into `ps`.
fn conditions<'a>(
    filter: &'a Filter,
    name_pattern: Option<&'a FuzzPattern>,
    ps: &mut Vec<&'a (dyn ToSql + Sync)>,
) -> String {
    let mut sql = String::new();
    if !filter.with_inactive {
        sql.push_str(" AND is_active");
    }
    if let Some(pattern) = name_pattern {
        ps.push(pattern);
        sql.push_str(&format!(
            " AND LOWER(name) SIMILAR TO LOWER(${}::VARCHAR)",
            ps.len(),
        ));
    }
    if let Some(state) = &filter.state {
        ps.push(state);
        sql.push_str(&format!(" AND state = ${}::INT2", ps.len()));
    }
    if let Some(cond) = &filter.best_price {
        ps.push(&cond.value);
        sql.push_str(&format!(
            " AND (SELECT COALESCE(MAX(price), 0) \
                   FROM offers \
                   WHERE property_id = properties.id) {op} ${idx}::NUMERIC",
            op = cond.comparison.sql(),
            idx = ps.len(),
        ));
    }
    sql
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Property>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Property>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE id = ANY($1::UUID[])",
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let property = from_row(row);
                (property.id, property)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, [property::Id; 1]>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            name,
            description,
            is_active,
            type_id,
            tag_ids,
            state,
            postcode,
            available_from,
            expected_price,
            selling_price,
            bedrooms,
            living_area,
            facades,
            has_garage,
            has_garden,
            garden_area,
            garden_orientation,
            is_garden_walled,
            buyer_id,
            salesperson_id,
            created_at,
        } = property;
        let (bedrooms, facades) = (i32::from(bedrooms), i32::from(facades));

        // Tags are synced in the same statement to keep it atomic outside
        // transactions.
        const SQL: &str = "\
            WITH upserted AS (\
                INSERT INTO properties (\
                    id, name, description, is_active, type_id, \
                    state, postcode, available_from, \
                    expected_price, selling_price, \
                    bedrooms, living_area, facades, \
                    has_garage, has_garden, garden_area, garden_orientation, \
                    is_garden_walled, buyer_id, salesperson_id, created_at\
                ) \
                VALUES (\
                    $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::BOOL, $5::UUID, \
                    $6::INT2, $7::VARCHAR, $8::DATE, \
                    $9::NUMERIC, $10::NUMERIC, \
                    $11::INT4, $12::NUMERIC, $13::INT4, \
                    $14::BOOL, $15::BOOL, $16::NUMERIC, $17::INT2, \
                    $18::BOOL, $19::UUID, $20::UUID, $21::TIMESTAMPTZ\
                ) \
                ON CONFLICT (id) DO UPDATE \
                SET name = EXCLUDED.name, \
                    description = EXCLUDED.description, \
                    is_active = EXCLUDED.is_active, \
                    type_id = EXCLUDED.type_id, \
                    state = EXCLUDED.state, \
                    postcode = EXCLUDED.postcode, \
                    available_from = EXCLUDED.available_from, \
                    expected_price = EXCLUDED.expected_price, \
                    selling_price = EXCLUDED.selling_price, \
                    bedrooms = EXCLUDED.bedrooms, \
                    living_area = EXCLUDED.living_area, \
                    facades = EXCLUDED.facades, \
                    has_garage = EXCLUDED.has_garage, \
                    has_garden = EXCLUDED.has_garden, \
                    garden_area = EXCLUDED.garden_area, \
                    garden_orientation = EXCLUDED.garden_orientation, \
                    is_garden_walled = EXCLUDED.is_garden_walled, \
                    buyer_id = EXCLUDED.buyer_id, \
                    salesperson_id = EXCLUDED.salesperson_id \
                RETURNING id\
            ), \
            untagged AS (\
                DELETE FROM properties_tags \
                WHERE property_id = $1::UUID \
                  AND NOT (tag_id = ANY($22::UUID[]))\
            ) \
            INSERT INTO properties_tags (property_id, tag_id) \
            SELECT upserted.id, tags.id \
            FROM upserted, unnest($22::UUID[]) AS tags (id) \
            ON CONFLICT DO NOTHING";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &description,
                &is_active,
                &type_id,
                &state,
                &postcode,
                &available_from,
                &expected_price,
                &selling_price,
                &bedrooms,
                &living_area,
                &facades,
                &has_garage,
                &has_garden,
                &garden_area,
                &garden_orientation,
                &is_garden_walled,
                &buyer_id,
                &salesperson_id,
                &created_at,
                &tag_ids,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        // Offers and tags go away via `ON DELETE CASCADE`.
        const SQL: &str = "\
            WITH unlocked AS (\
                DELETE FROM properties_lock \
                WHERE id = $1::UUID\
            ) \
            DELETE FROM properties \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        // Updating the existing row holds its lock until the transaction
        // ends, so the concurrent ones wait here.
        const SQL: &str = "\
            INSERT INTO properties_lock (id, locked_at) \
            VALUES ($1::UUID, NOW()) \
            ON CONFLICT (id) DO UPDATE \
            SET locked_at = EXCLUDED.locked_at";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::list::Selector { arguments, filter } =
            by.into_inner();

        let limit = i32::try_from(arguments.limit())
            .unwrap_or(i32::MAX)
            .saturating_add(1);
        let name_pattern =
            filter.name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];
        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let filtering = conditions(&filter, name_pattern.as_ref(), &mut ps);

        let direction = arguments.direction();
        let sql = format!(
            "SELECT id \
             FROM properties \
             WHERE true \
                   {cursor} \
                   {filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = direction.operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = direction.sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::property::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C>
    Database<
        Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let name_pattern =
            filter.name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let filtering = conditions(&filter, name_pattern.as_ref(), &mut ps);

        let sql = format!(
            "SELECT COUNT(*)::INT4 \
             FROM properties \
             WHERE true {filtering}",
        );
        self.query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}

impl<C> Database<Select<By<read::property::ActiveListings, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::ActiveListings;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::property::ActiveListings, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE salesperson_id = $1::UUID \
               AND state IN ($2::INT2, $3::INT2) \
             ORDER BY created_at, id",
        );
        Ok(self
            .query(&sql, &[&user_id, &State::New, &State::OfferReceived])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect::<Vec<_>>()
            .into())
    }
}
