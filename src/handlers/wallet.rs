use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::AppError;
use crate::middleware::auth::Identity;
use crate::services::WalletService;
use crate::utils::pagination::{PageParams, Paginated};

#[derive(Debug, Serialize)]
pub struct WalletBalanceResponse {
    pub balance: BigDecimal,
}

pub async fn get_balance(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let service = WalletService::new(state.db.clone());
    let balance = service.balance(identity.user_id).await?;
    Ok(Json(WalletBalanceResponse { balance }))
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: BigDecimal,
}

pub async fn deposit(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<DepositRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = WalletService::new(state.db.clone());
    let balance = service.deposit(identity.user_id, payload.amount).await?;
    Ok(Json(WalletBalanceResponse { balance }))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let service = WalletService::new(state.db.clone());
    let (entries, total) = service
        .transactions(identity.user_id, params.limit(), params.offset())
        .await?;
    Ok(Json(Paginated::new(entries, total, &params)))
}
