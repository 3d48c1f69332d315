//! Session-scoped advisory locks.

use bmb_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

/// Advisory lock class for settlement passes; the session id is the object.
pub const SETTLEMENT_LOCK_CLASS: i32 = 718_273_645;

/// Holds the settlement lock for one session until released or dropped.
///
/// Backed by a transaction-scoped advisory lock on a dedicated connection,
/// so the lock is freed whenever the transaction ends, including on panic.
pub struct SettlementLock {
    session_id: DbId,
    tx: Transaction<'static, Postgres>,
}

impl SettlementLock {
    /// Try to take the lock without waiting.
    ///
    /// Returns `None` if another pass already holds it.
    pub async fn try_acquire(pool: &PgPool, session_id: DbId) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let (acquired,): (bool,) =
            sqlx::query_as("SELECT pg_try_advisory_xact_lock($1, ($2 % 2147483647)::INTEGER)")
                .bind(SETTLEMENT_LOCK_CLASS)
                .bind(session_id)
                .fetch_one(&mut *tx)
                .await?;

        if !acquired {
            tx.rollback().await?;
            return Ok(None);
        }
        tracing::debug!(session_id, "Settlement lock acquired");
        Ok(Some(Self { session_id, tx }))
    }

    pub async fn release(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await?;
        tracing::debug!(session_id = self.session_id, "Settlement lock released");
        Ok(())
    }
}
