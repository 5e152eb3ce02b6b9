//! [`Command`] for creating a new [`PropertyType`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property_type, PropertyType},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`PropertyType`] with a unique name.
#[derive(Clone, Debug)]
pub struct CreatePropertyType {
    /// [`property_type::Name`] of a new [`PropertyType`].
    pub name: property_type::Name,
}

impl<Db> Command<CreatePropertyType> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'n> Database<
            Select<By<Option<PropertyType>, &'n property_type::Name>>,
            Ok = Option<PropertyType>,
            Err = Traced<database::Error>,
        > + Database<Insert<PropertyType>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = PropertyType;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePropertyType,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePropertyType { name } = cmd;

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

        let ty = PropertyType {
            id: property_type::Id::new(),
            name,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(ty.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(ty)
    }
}

/// Error of [`CreatePropertyType`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`property_type::Name`] is used by another [`PropertyType`] already.
    #[display("`PropertyType` named `{_0}` exists already")]
    NameOccupied(#[error(not(source))] property_type::Name),
}
