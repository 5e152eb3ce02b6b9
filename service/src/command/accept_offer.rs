//! [`Command`] for accepting an [`Offer`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        offer,
        property::{self, AcceptanceError},
        Offer, Property,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for accepting an [`Offer`], which refuses all the other
/// [`Offer`]s of the same [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct AcceptOffer {
    /// ID of the [`Offer`] to accept.
    pub offer_id: offer::Id,
}

/// Output of [`AcceptOffer`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Property`] the accepted [`Offer`] is made for.
    pub property: Property,

    /// All the [`Offer`]s of the [`Property`] after the acceptance.
    pub offers: Vec<Offer>,
}

impl<Db> Command<AcceptOffer> for Service<Db>
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
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Offer>, property::Id>>,
            Ok = Vec<Offer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Offer>, Err = Traced<database::Error>>
        + Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AcceptOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptOffer { offer_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let property_id = tx
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?
            .property_id;

        // Siblings must not change while being refused.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;
        let mut offers = tx
            .execute(Select(By::<Vec<Offer>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let before = offers.iter().map(|o| o.status).collect::<Vec<_>>();

        property
            .accept_offer(offer_id, &mut offers)
            .map_err(|e| match e {
                AcceptanceError::UnknownOffer => E::OfferNotExists(offer_id),
                AcceptanceError::Transition(e) => E::Transition(e),
                AcceptanceError::Validation(e) => E::Validation(e),
            })
            .map_err(tracerr::wrap!())?;

        for (offer, status) in offers.iter().zip(before) {
            if offer.status != status {
                tx.execute(Insert(offer.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
        }
        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Offer(id: {offer_id})` accepted for \
             `Property(id: {property_id})`",
        );

        Ok(Output { property, offers })
    }
}

/// Error of [`AcceptOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),

    /// [`Offer`] cannot be accepted.
    #[display("Cannot accept `Offer`: {_0}")]
    Transition(offer::InvalidTransitionError),

    /// Accepted price violates [`Property`] rules.
    #[display("Cannot accept `Offer`: {_0}")]
    Validation(property::ValidationError),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, AcceptOffer, MarkPropertyCancelled, RefuseOffer},
        domain::{
            offer::{self, InvalidTransitionError, Status},
            property::{self, State},
        },
        Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn accepts_one_and_refuses_siblings() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let low = fixture::offer(&svc, p.id, 80_000).await;
        let high = fixture::offer(&svc, p.id, 90_000).await;

        let out = svc.execute(AcceptOffer { offer_id: high.id }).await.unwrap();

        assert_eq!(out.property.state, State::OfferAccepted);
        assert_eq!(out.property.selling_price.value(), Decimal::from(90_000));
        assert_eq!(out.property.buyer_id, Some(high.partner_id));
        let status_of = |id: offer::Id| {
            out.offers.iter().find(|o| o.id == id).map(|o| o.status)
        };
        assert_eq!(status_of(high.id), Some(Status::Accepted));
        assert_eq!(status_of(low.id), Some(Status::Refused));
    }

    #[tokio::test]
    async fn rejects_price_below_floor() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 80_000).await;

        let err = svc
            .execute(AcceptOffer { offer_id: offer.id })
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
    async fn rejects_refused_offer() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 95_000).await;
        drop(svc.execute(RefuseOffer { offer_id: offer.id }).await.unwrap());

        let err = svc
            .execute(AcceptOffer { offer_id: offer.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(InvalidTransitionError::AcceptRefused),
        ));
    }

    #[tokio::test]
    async fn rejects_offer_of_cancelled_property() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 95_000).await;
        drop(
            svc.execute(MarkPropertyCancelled { property_id: p.id })
                .await
                .unwrap(),
        );

        let err = svc
            .execute(AcceptOffer { offer_id: offer.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(
                InvalidTransitionError::PropertyClosed { .. },
            ),
        ));
    }
}
