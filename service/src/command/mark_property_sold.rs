//! [`Command`] for marking a [`Property`] as sold.

use common::operations::{
    By, Commit, Insert, Lock, Perform, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    billing::PropertySold,
    domain::{property, Invoice, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Property`] as sold.
///
/// Once the sale is committed, the buyer is invoiced. Invoicing failures are
/// logged and don't undo the sale.
#[derive(Clone, Copy, Debug)]
pub struct MarkPropertySold {
    /// ID of the sold [`Property`].
    pub property_id: property::Id,
}

impl<Db> Command<MarkPropertySold> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Invoice>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkPropertySold,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkPropertySold { property_id } = cmd;

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

        if !property.mark_sold().map_err(tracerr::from_and_wrap!(=> E))? {
            return Ok(property);
        }

        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::info!("`Property(id: {property_id})` sold");

        let event = PropertySold {
            property_id,
            buyer_id: property.buyer_id,
            selling_price: property.selling_price,
        };
        match self.execute(Perform(event)).await {
            Ok(invoice) => log::info!(
                "`Invoice(id: {})` issued for `Property(id: {property_id})`",
                invoice.id,
            ),
            Err(e) => log::error!(
                "Failed to invoice sold `Property(id: {property_id})`: {e}",
            ),
        }

        Ok(property)
    }
}

/// Error of [`MarkPropertySold`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Property`] cannot be sold.
    #[display("Cannot sell `Property`: {_0}")]
    #[from]
    Transition(property::InvalidTransitionError),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{
        operations::{By, Select},
        Money,
    };
    use rust_decimal::Decimal;

    use crate::{
        command::{
            fixture, AcceptOffer, CreateOffer, MarkPropertyCancelled,
            MarkPropertySold,
        },
        domain::{
            property::{InvalidTransitionError, State},
            Invoice, Property,
        },
        infra::Database as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn invoices_buyer_once() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 90_000).await;
        drop(svc.execute(AcceptOffer { offer_id: offer.id }).await.unwrap());

        let sold = svc
            .execute(MarkPropertySold { property_id: p.id })
            .await
            .unwrap();
        let again = svc
            .execute(MarkPropertySold { property_id: p.id })
            .await
            .unwrap();

        assert_eq!(sold.state, State::Sold);
        assert_eq!(again.state, State::Sold);
        let invoices = svc
            .database()
            .execute(Select(By::<Vec<Invoice>, _>::new(p.id)))
            .await
            .unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].partner_id, offer.partner_id);
        assert_eq!(
            invoices[0].total(),
            Some(Money::from_str("5500USD").unwrap()),
        );
    }

    #[tokio::test]
    async fn keeps_sale_when_invoicing_fails() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 90_000).await;
        drop(svc.execute(AcceptOffer { offer_id: offer.id }).await.unwrap());
        svc.database().reject_invoices(true);

        let sold = svc
            .execute(MarkPropertySold { property_id: p.id })
            .await
            .unwrap();

        assert_eq!(sold.state, State::Sold);
        let stored = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(p.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.state, State::Sold);
        let invoices = svc
            .database()
            .execute(Select(By::<Vec<Invoice>, _>::new(p.id)))
            .await
            .unwrap();
        assert!(invoices.is_empty());
    }

    #[tokio::test]
    async fn keeps_sale_when_fee_overflows() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 0).await;
        let buyer = fixture::partner(&svc).await;
        let offer = svc
            .execute(CreateOffer {
                property_id: p.id,
                partner_id: buyer.id,
                price: Decimal::MAX,
                validity: None,
            })
            .await
            .unwrap();
        drop(svc.execute(AcceptOffer { offer_id: offer.id }).await.unwrap());

        let sold = svc
            .execute(MarkPropertySold { property_id: p.id })
            .await
            .unwrap();

        assert_eq!(sold.state, State::Sold);
        assert_eq!(sold.selling_price.value(), Decimal::MAX);
        let invoices = svc
            .database()
            .execute(Select(By::<Vec<Invoice>, _>::new(p.id)))
            .await
            .unwrap();
        assert!(invoices.is_empty());
    }

    #[tokio::test]
    async fn refuses_to_sell_cancelled_property() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        drop(
            svc.execute(MarkPropertyCancelled { property_id: p.id })
                .await
                .unwrap(),
        );

        let err = svc
            .execute(MarkPropertySold { property_id: p.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(InvalidTransitionError::SellCancelled),
        ));
    }
}
