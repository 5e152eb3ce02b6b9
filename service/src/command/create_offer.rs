//! [`Command`] for creating a new [`Offer`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{offer, partner, property, Offer, Partner, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for proposing a price for a [`Property`] on behalf of a
/// [`Partner`].
#[derive(Clone, Copy, Debug)]
pub struct CreateOffer {
    /// ID of the [`Property`] the [`Offer`] is made for.
    pub property_id: property::Id,

    /// ID of the [`Partner`] making the [`Offer`].
    pub partner_id: partner::Id,

    /// Proposed price.
    pub price: Decimal,

    /// [`offer::Validity`] of the [`Offer`], 7 days if omitted.
    pub validity: Option<offer::Validity>,
}

impl<Db> Command<CreateOffer> for Service<Db>
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
            Select<By<Option<Partner>, partner::Id>>,
            Ok = Option<Partner>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Offer>, property::Id>>,
            Ok = Vec<Offer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Offer>, Err = Traced<database::Error>>
        + Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateOffer {
            property_id,
            partner_id,
            price,
            validity,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Select(By::<Option<Partner>, _>::new(partner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PartnerNotExists(partner_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        // Keep the minimum price stable until the new `Offer` is stored.
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
        let existing = tx
            .execute(Select(By::<Vec<Offer>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let state = property.state;
        let offer = Offer::propose(
            &mut property,
            partner_id,
            price,
            validity.unwrap_or_default(),
            &existing,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Insert(offer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        if property.state != state {
            tx.execute(Insert(property))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!(
            "`Offer(id: {})` of {} made for `Property(id: {property_id})`",
            offer.id,
            offer.price,
        );

        Ok(offer)
    }
}

/// Error of [`CreateOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Partner`] does not exist.
    #[display("`Partner(id: {_0})` does not exist")]
    PartnerNotExists(#[error(not(source))] partner::Id),

    /// [`Offer`] is rejected.
    #[display("Invalid `Offer`: {_0}")]
    #[from]
    Invalid(offer::InvalidOfferError),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, CreateOffer, MarkPropertyCancelled},
        domain::{
            offer::{InvalidOfferError, Status},
            partner,
            property::{self, State},
            Property,
        },
        infra::{Database as _, Memory},
        Service,
    };

    use super::ExecutionError;

    async fn stored(svc: &Service<Memory>, id: property::Id) -> Property {
        svc.database()
            .execute(Select(By::<Option<Property>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn first_offer_moves_property_to_received() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;

        let offer = fixture::offer(&svc, p.id, 1).await;

        assert_eq!(offer.status, Status::InReview);
        assert_eq!(offer.validity.days(), 7);
        assert_eq!(stored(&svc, p.id).await.state, State::OfferReceived);
    }

    #[tokio::test]
    async fn rejects_price_below_minimum() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        drop(fixture::offer(&svc, p.id, 80_000).await);
        let partner = fixture::partner(&svc).await;

        let err = svc
            .execute(CreateOffer {
                property_id: p.id,
                partner_id: partner.id,
                price: Decimal::from(70_000),
                validity: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(InvalidOfferError::BelowMinimum { .. }),
        ));
    }

    #[tokio::test]
    async fn does_not_revert_later_state() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        drop(
            svc.execute(MarkPropertyCancelled { property_id: p.id })
                .await
                .unwrap(),
        );

        drop(fixture::offer(&svc, p.id, 10).await);

        assert_eq!(stored(&svc, p.id).await.state, State::Cancelled);
    }

    #[tokio::test]
    async fn rejects_unknown_partner() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;

        let err = svc
            .execute(CreateOffer {
                property_id: p.id,
                partner_id: partner::Id::new(),
                price: Decimal::ONE,
                validity: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PartnerNotExists(_)));
    }
}
