//! Wallet balance reconciliation.
//!
//! The stored balance is a cached projection of the ledger; this audit
//! recomputes the sum per account and reports any drift. Detection only,
//! it never mutates.

use sqlx::PgPool;
use tokio::time::{Duration, sleep};
use tracing::{error, info};

use crate::db::queries;

/// Runs the reconciliation loop beside the HTTP server.
pub async fn run_reconciler(pool: PgPool, interval_secs: u64) {
    info!("Balance reconciliation loop started (every {}s)", interval_secs);

    loop {
        if let Err(e) = run_once(&pool).await {
            error!("Reconciliation pass error: {}", e);
        }

        sleep(Duration::from_secs(interval_secs)).await;
    }
}

/// One reconciliation pass. Returns the number of drifted accounts.
pub async fn run_once(pool: &PgPool) -> anyhow::Result<usize> {
    let drifts = queries::find_balance_drift(pool).await?;

    for drift in &drifts {
        error!(
            user_id = %drift.user_id,
            email = %drift.email,
            balance = %drift.balance,
            ledger_sum = %drift.ledger_sum,
            "wallet balance does not match ledger"
        );
    }

    if drifts.is_empty() {
        info!("Reconciliation pass clean: all balances match their ledgers");
    } else {
        info!("Reconciliation pass found {} drifted account(s)", drifts.len());
    }

    Ok(drifts.len())
}
