//! [`Command`] for deleting a [`Property`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Offer;
use crate::{
    domain::{property, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Property`] along with its [`Offer`]s.
#[derive(Clone, Copy, Debug)]
pub struct DeleteProperty {
    /// ID of the [`Property`] to delete.
    pub property_id: property::Id,
}

impl<Db> Command<DeleteProperty> for Service<Db>
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
            Delete<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty { property_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid racing with new offers.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        property
            .authorize_deletion()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Delete(By::<Property, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Property(id: {property_id})` deleted");

        Ok(property)
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`Property`] is in a [`property::State`] forbidding deletion.
    #[display("Cannot delete `Property`: {_0}")]
    #[from]
    Forbidden(property::DeletionForbiddenError),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::{fixture, DeleteProperty, MarkPropertyCancelled},
        domain::{property::State, Offer, Property},
        infra::Database as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn deletes_new_property() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;

        drop(
            svc.execute(DeleteProperty { property_id: p.id })
                .await
                .unwrap(),
        );

        let stored = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(p.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn forbids_deleting_property_with_offers() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        drop(fixture::offer(&svc, p.id, 50_000).await);

        let err = svc
            .execute(DeleteProperty { property_id: p.id })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Forbidden(e) if e.state == State::OfferReceived,
        ));
    }

    #[tokio::test]
    async fn deletes_cancelled_property_with_its_offers() {
        let svc = fixture::service();
        let p = fixture::property(&svc, 100_000).await;
        drop(fixture::offer(&svc, p.id, 50_000).await);
        drop(
            svc.execute(MarkPropertyCancelled { property_id: p.id })
                .await
                .unwrap(),
        );

        drop(
            svc.execute(DeleteProperty { property_id: p.id })
                .await
                .unwrap(),
        );

        let offers = svc
            .database()
            .execute(Select(By::<Vec<Offer>, _>::new(p.id)))
            .await
            .unwrap();
        assert!(offers.is_empty());
    }
}
