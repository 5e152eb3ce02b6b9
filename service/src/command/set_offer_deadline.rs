//! [`Command`] for setting the deadline of an [`Offer`].

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

/// [`Command`] for setting the deadline of an [`Offer`], which recomputes
/// its [`offer::Validity`].
#[derive(Clone, Copy, Debug)]
pub struct SetOfferDeadline {
    /// ID of the [`Offer`] to change.
    pub offer_id: offer::Id,

    /// New [`offer::DeadlineDate`] of the [`Offer`].
    pub deadline: offer::DeadlineDate,
}

impl<Db> Command<SetOfferDeadline> for Service<Db>
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
        cmd: SetOfferDeadline,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetOfferDeadline { offer_id, deadline } = cmd;

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

        offer
            .set_deadline(deadline)
            .map_err(tracerr::from_and_wrap!(=> E))?;

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

/// Error of [`SetOfferDeadline`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),

    /// Deadline is out of the supported range.
    #[display("Cannot set deadline: {_0}")]
    #[from]
    Validity(offer::InvalidValidityError),
}

#[cfg(test)]
mod spec {
    use common::unit;

    use crate::{
        command::{fixture, SetOfferDeadline},
        domain::{offer, Offer},
        Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn recomputes_validity() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        let offer = fixture::offer(&svc, p.id, 1).await;
        let deadline = offer
            .created_at
            .date::<(Offer, unit::Deadline)>()
            .checked_add_days(30)
            .unwrap();

        let updated = svc
            .execute(SetOfferDeadline {
                offer_id: offer.id,
                deadline,
            })
            .await
            .unwrap();

        assert_eq!(updated.validity.days(), 30);
        assert_eq!(updated.deadline(), deadline);
    }

    #[tokio::test]
    async fn rejects_unknown_offer() {
        let svc = fixture::service();

        let err = svc
            .execute(SetOfferDeadline {
                offer_id: offer::Id::new(),
                deadline: "2024-01-15".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::OfferNotExists(_)));
    }
}
