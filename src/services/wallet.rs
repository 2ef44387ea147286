use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::LedgerEntry;
use crate::db::queries;
use crate::domain::LedgerKind;
use crate::error::AppError;

pub struct WalletService {
    pool: PgPool,
}

impl WalletService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<BigDecimal, AppError> {
        queries::get_balance(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Virtual top-up. A real deployment would sit behind a payment
    /// gateway; the balance credit and its deposit ledger entry still
    /// commit together.
    pub async fn deposit(&self, user_id: Uuid, amount: BigDecimal) -> Result<BigDecimal, AppError> {
        if amount <= BigDecimal::from(0) {
            return Err(AppError::Validation(
                "Deposit amount must be positive".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if queries::get_balance_tx(&mut tx, user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let new_balance = queries::credit_balance(&mut tx, user_id, &amount).await?;
        queries::insert_ledger_entry(
            &mut tx,
            user_id,
            &amount,
            LedgerKind::Deposit,
            &format!("Wallet deposit of {}", amount),
            &new_balance,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, amount = %amount, "wallet deposit");

        Ok(new_balance)
    }

    pub async fn transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<LedgerEntry>, i64), AppError> {
        let entries = queries::list_ledger_entries(&self.pool, user_id, limit, offset).await?;
        let total = queries::count_ledger_entries(&self.pool, user_id).await?;
        Ok((entries, total))
    }
}
