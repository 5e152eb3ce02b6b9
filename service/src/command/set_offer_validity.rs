//! [`Command`] for setting the validity of an [`Offer`].

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

/// [`Command`] for setting the number of days an [`Offer`] stays valid.
#[derive(Clone, Copy, Debug)]
pub struct SetOfferValidity {
    /// ID of the [`Offer`] to change.
    pub offer_id: offer::Id,

    /// New [`offer::Validity`] of the [`Offer`].
    pub validity: offer::Validity,
}

impl<Db> Command<SetOfferValidity> for Service<Db>
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

    async fn execute(
        &self,
        cmd: SetOfferValidity,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetOfferValidity { offer_id, validity } = cmd;

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

        offer.validity = validity;

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

/// Error of [`SetOfferValidity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, SetOfferValidity},
        domain::offer,
        Command as _,
    };

    #[tokio::test]
    async fn moves_deadline() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 1).await;

        let updated = svc
            .execute(SetOfferValidity {
                offer_id: offer.id,
                validity: offer::Validity::new(14).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(
            updated.deadline(),
            offer.deadline().checked_add_days(7).unwrap(),
        );
    }
}
