//! Repository handle: owns the pool, the transaction discipline and the
//! schema bootstrap.
//!
//! Writes run under `BEGIN IMMEDIATE` so the reserved lock is taken up
//! front; reads run under a deferred `BEGIN` and observe a snapshot. Nested
//! scopes are sqlx savepoints on the outer transaction.

use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::Transaction;

use crate::errors::{DbError, DbResult};
use crate::integrity;
use crate::schema;

#[derive(Clone)]
pub struct LeagueRepo {
    pool: SqlitePool,
    tx_depth: Arc<AtomicUsize>,
}

impl LeagueRepo {
    /// Open (creating if missing) a league database file.
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let pool = crate::pool::create_pool(path).await?;
        Ok(Self {
            pool,
            tx_depth: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// In-memory repository for tests.
    pub async fn open_in_memory() -> DbResult<Self> {
        let pool = crate::pool::create_memory_pool().await?;
        Ok(Self {
            pool,
            tx_depth: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Idempotent schema bootstrap. Refuses to run while any transaction
    /// from this handle is open: DDL must never run inside a transaction.
    pub async fn init_db(&self) -> DbResult<()> {
        if self.tx_depth.load(Ordering::SeqCst) != 0 {
            return Err(DbError::InvalidState(
                "init_db must not run inside an active transaction".to_string(),
            ));
        }
        let mut conn = self.pool.acquire().await?;
        schema::init_db(&mut conn).await
    }

    /// Start a write transaction (`BEGIN IMMEDIATE`).
    pub async fn begin_write(&self) -> DbResult<LeagueTx> {
        let tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        self.tx_depth.fetch_add(1, Ordering::SeqCst);
        Ok(LeagueTx {
            tx: Some(tx),
            depth: Arc::clone(&self.tx_depth),
        })
    }

    /// Start a read transaction (deferred `BEGIN`).
    pub async fn begin_read(&self) -> DbResult<LeagueTx> {
        let tx = self.pool.begin().await?;
        self.tx_depth.fetch_add(1, Ordering::SeqCst);
        Ok(LeagueTx {
            tx: Some(tx),
            depth: Arc::clone(&self.tx_depth),
        })
    }

    /// Run the cross-table integrity validation in its own read transaction.
    pub async fn validate_integrity(
        &self,
        strict_ids: bool,
    ) -> domain::errors::DomainResult<()> {
        let mut tx = self.begin_read().await?;
        integrity::validate_integrity(&mut tx, strict_ids).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// An open transaction. Derefs to the underlying connection so store
/// functions (`fn(conn: &mut SqliteConnection, ...)`) take it directly.
/// Rolls back when dropped without an explicit commit.
pub struct LeagueTx {
    tx: Option<Transaction<'static, Sqlite>>,
    depth: Arc<AtomicUsize>,
}

impl LeagueTx {
    pub async fn commit(mut self) -> DbResult<()> {
        if let Some(tx) = self.tx.take() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            tx.commit().await?;
        }
        Ok(())
    }

    pub async fn rollback(mut self) -> DbResult<()> {
        if let Some(tx) = self.tx.take() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            tx.rollback().await?;
        }
        Ok(())
    }

    /// Open a nested scope as a savepoint. Dropping the returned transaction
    /// rolls back to the savepoint; committing releases it.
    pub async fn savepoint(&mut self) -> DbResult<Transaction<'_, Sqlite>> {
        use sqlx::Connection;
        let conn: &mut SqliteConnection = &mut *self;
        Ok(conn.begin().await?)
    }
}

impl Deref for LeagueTx {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &**self.tx.as_ref().expect("transaction already finished")
    }
}

impl DerefMut for LeagueTx {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.tx.as_mut().expect("transaction already finished")
    }
}

impl Drop for LeagueTx {
    fn drop(&mut self) {
        if self.tx.is_some() {
            // Inner sqlx transaction queues its own rollback.
            self.depth.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
