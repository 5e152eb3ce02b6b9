//! [`Command`] for creating a new [`Partner`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{partner, Partner},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Partner`] able to make offers.
#[derive(Clone, Debug)]
pub struct CreatePartner {
    /// [`partner::Name`] of a new [`Partner`].
    pub name: partner::Name,
}

impl<Db> Command<CreatePartner> for Service<Db>
where
    Db: Database<Insert<Partner>, Err = Traced<database::Error>>,
{
    type Ok = Partner;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePartner,
    ) -> Result<Self::Ok, Self::Err> {
        let partner = Partner {
            id: partner::Id::new(),
            name: cmd.name,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(partner.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
            .map(drop)?;

        Ok(partner)
    }
}

/// Error of [`CreatePartner`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
