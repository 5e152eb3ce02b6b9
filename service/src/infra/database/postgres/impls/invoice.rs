//! [`Invoice`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use itertools::Itertools as _;
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{
        invoice::{self, Invoice},
        property,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<Invoice>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(invoice): Insert<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        let Invoice {
            id,
            property_id,
            partner_id,
            journal,
            lines,
            created_at,
        } = invoice;

        let (labels, quantities, prices, currencies): (
            Vec<_>,
            Vec<_>,
            Vec<_>,
            Vec<_>,
        ) = lines
            .into_iter()
            .map(|l| {
                let Money { amount, currency } = l.unit_price;
                (l.label, l.quantity, amount, currency)
            })
            .multiunzip();

        // Lines go in the same statement to keep the `Invoice` whole outside
        // transactions.
        const SQL: &str = "\
            WITH issued AS (\
                INSERT INTO invoices (\
                    id, property_id, partner_id, journal, created_at\
                ) \
                VALUES (\
                    $1::UUID, $2::UUID, $3::UUID, $4::VARCHAR, \
                    $5::TIMESTAMPTZ\
                ) \
                RETURNING id\
            ) \
            INSERT INTO invoice_lines (\
                invoice_id, position, label, quantity, unit_price, currency\
            ) \
            SELECT issued.id, lines.position, \
                   lines.label, lines.quantity, lines.unit_price, \
                   lines.currency \
            FROM issued, \
                 unnest($6::VARCHAR[], $7::NUMERIC[], $8::NUMERIC[], \
                        $9::INT2[]) \
                 WITH ORDINALITY \
                 AS lines (label, quantity, unit_price, currency, position)";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &partner_id,
                &journal,
                &created_at,
                &labels,
                &quantities,
                &prices,
                &currencies,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Invoice>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Invoice>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, partner_id, journal, created_at \
            FROM invoices \
            WHERE property_id = $1::UUID \
            ORDER BY created_at, id";
        let mut invoices = self
            .query(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Invoice {
                id: row.get("id"),
                property_id: row.get("property_id"),
                partner_id: row.get("partner_id"),
                journal: row.get("journal"),
                lines: vec![],
                created_at: row.get("created_at"),
            })
            .collect::<Vec<_>>();
        if invoices.is_empty() {
            return Ok(invoices);
        }

        let ids = invoices.iter().map(|i| i.id).collect::<Vec<_>>();
        const LINES_SQL: &str = "\
            SELECT invoice_id, label, quantity, unit_price, currency \
            FROM invoice_lines \
            WHERE invoice_id = ANY($1::UUID[]) \
            ORDER BY invoice_id, position";
        let mut lines = self
            .query(LINES_SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let line = invoice::Line {
                    label: row.get("label"),
                    quantity: row.get::<_, Decimal>("quantity"),
                    unit_price: Money {
                        amount: row.get("unit_price"),
                        currency: row.get("currency"),
                    },
                };
                (row.get::<_, invoice::Id>("invoice_id"), line)
            })
            .into_group_map();
        for inv in &mut invoices {
            inv.lines = lines.remove(&inv.id).unwrap_or_default();
        }

        Ok(invoices)
    }
}
