//! [`Command`] for refusing an [`Offer`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{offer, property, Offer, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for refusing an [`Offer`].
///
/// The [`Property`] the [`Offer`] is made for stays untouched.
#[derive(Clone, Copy, Debug)]
pub struct RefuseOffer {
    /// ID of the [`Offer`] to refuse.
    pub offer_id: offer::Id,
}

impl<Db> Command<RefuseOffer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Offer>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RefuseOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RefuseOffer { offer_id } = cmd;

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

        // Avoid racing with a concurrent acceptance.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut offer = tx
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;

        offer.refuse().map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Insert(offer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(offer)
    }
}

/// Error of [`RefuseOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),

    /// [`Offer`] cannot be refused.
    #[display("Cannot refuse `Offer`: {_0}")]
    #[from]
    Transition(offer::InvalidTransitionError),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::{fixture, AcceptOffer, RefuseOffer},
        domain::{
            offer::{InvalidTransitionError, Status},
            property::State,
            Property,
        },
        infra::Database as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn leaves_property_untouched() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 95_000).await;

        let refused = svc
            .execute(RefuseOffer { offer_id: offer.id })
            .await
            .unwrap();

        assert_eq!(refused.status, Status::Refused);
        let stored = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(p.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.state, State::OfferReceived);
    }

    #[tokio::test]
    async fn rejects_accepted_offer() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 95_000).await;
        drop(svc.execute(AcceptOffer { offer_id: offer.id }).await.unwrap());

        let err = svc
            .execute(RefuseOffer { offer_id: offer.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(InvalidTransitionError::RefuseAccepted),
        ));
    }
}
