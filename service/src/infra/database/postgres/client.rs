//! Postgres database clients.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every statement runs on a [`connection::Pooled`] connection taken for it
/// alone.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take connections from.
    pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) const fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Takes a [`connection::Pooled`] connection out of the pool.
    pub(crate) async fn pooled(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        conn.query(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        conn.query_opt(stmt, params).await.map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        let conn = self.pooled().await.map_err(tracerr::wrap!())?;
        conn.exec(stmt, params).await.map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// Dropping the last clone of a [`Tx`] without [`Tx::commit()`] rolls the
/// transaction back.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<connection::Session>>>);

impl Tx {
    /// Begins a new transaction on a connection of the provided [`NonTx`]
    /// client.
    ///
    /// # Errors
    ///
    /// If failed to take a connection or to begin a transaction.
    pub async fn begin(
        client: &NonTx,
    ) -> Result<Self, Traced<database::Error>> {
        let conn = client.pooled().await.map_err(tracerr::wrap!())?;
        let session = connection::Session::begin(conn)
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Self(Arc::new(Mutex::new(Some(session)))))
    }

    /// Commits this [`Tx`].
    ///
    /// Committing more than once does nothing.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(session) = self.0.lock().await.take() else {
            return Ok(());
        };
        session.commit().await.map_err(tracerr::wrap!())
    }
}

/// Runs the provided statement method on the open [`connection::Session`]
/// of a [`Tx`].
macro_rules! in_session {
    ($tx:expr, $method:ident($($arg:expr),*)) => {{
        let guard = $tx.0.lock().await;
        let session = guard
            .as_ref()
            .ok_or_else(|| tracerr::new!(postgres::Error::Finished))
            .map_err(tracerr::map_from)?;
        session.$method($($arg),*).await.map_err(tracerr::wrap!())
    }};
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        in_session!(self, query(stmt, params))
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        in_session!(self, query_opt(stmt, params))
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        in_session!(self, exec(stmt, params))
    }
}
