//! [`Command`] for withdrawing a [`Property`] from the market.

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Property`] as cancelled.
#[derive(Clone, Copy, Debug)]
pub struct MarkPropertyCancelled {
    /// ID of the [`Property`] to cancel.
    pub property_id: property::Id,
}

impl<Db> Command<MarkPropertyCancelled> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
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
        cmd: MarkPropertyCancelled,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkPropertyCancelled { property_id } = cmd;

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

        property
            .mark_cancelled()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`MarkPropertyCancelled`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Property`] cannot be cancelled.
    #[display("Cannot cancel `Property`: {_0}")]
    #[from]
    Transition(property::InvalidTransitionError),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, MarkPropertyCancelled, MarkPropertySold},
        domain::property::{InvalidTransitionError, State},
        Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn cancels_listing() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;

        let cancelled = svc
            .execute(MarkPropertyCancelled { property_id: p.id })
            .await
            .unwrap();

        assert_eq!(cancelled.state, State::Cancelled);
    }

    #[tokio::test]
    async fn refuses_to_cancel_sold_property() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        drop(
            svc.execute(MarkPropertySold { property_id: p.id })
                .await
                .unwrap(),
        );

        let err = svc
            .execute(MarkPropertyCancelled { property_id: p.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transition(InvalidTransitionError::CancelSold),
        ));
    }
}
