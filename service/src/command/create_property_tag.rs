//! [`Command`] for creating a new [`PropertyTag`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property_tag, PropertyTag},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`PropertyTag`] with a unique name.
#[derive(Clone, Debug)]
pub struct CreatePropertyTag {
    /// [`property_tag::Name`] of a new [`PropertyTag`].
    pub name: property_tag::Name,
}

impl<Db> Command<CreatePropertyTag> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'n> Database<
            Select<By<Option<PropertyTag>, &'n property_tag::Name>>,
            Ok = Option<PropertyTag>,
            Err = Traced<database::Error>,
        > + Database<Insert<PropertyTag>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = PropertyTag;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePropertyTag,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePropertyTag { name } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if tx
            .execute(Select(By::new(&name)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .is_some()
        {
            return Err(tracerr::new!(E::NameOccupied(name)));
        }

        let tag = PropertyTag {
            id: property_tag::Id::new(),
            name,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(tag.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(tag)
    }
}

/// Error of [`CreatePropertyTag`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`property_tag::Name`] is used by another [`PropertyTag`] already.
    #[display("`PropertyTag` named `{_0}` exists already")]
    NameOccupied(#[error(not(source))] property_tag::Name),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, CreatePropertyTag},
        domain::property_tag,
        Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn rejects_duplicate_name() {
        let svc = fixture::service();
        let name = property_tag::Name::new("cozy").unwrap();
        drop(
            svc.execute(CreatePropertyTag { name: name.clone() })
                .await
                .unwrap(),
        );

        let err = svc
            .execute(CreatePropertyTag { name: name.clone() })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NameOccupied(n) if *n == name,
        ));
    }
}
