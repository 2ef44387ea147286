use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::db::queries;
use crate::domain::{OrderStatus, Role};
use crate::error::AppError;
use crate::handlers::orders::attach_lines;
use crate::middleware::auth::Identity;
use crate::utils::pagination::{PageParams, Paginated};

#[derive(Debug, Deserialize)]
pub struct AdminOrderParams {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn list_all_orders(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<AdminOrderParams>,
) -> Result<impl IntoResponse, AppError> {
    if identity.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Admin access required".to_string(),
        ));
    }

    let status = params
        .status
        .as_deref()
        .map(|s| s.parse::<OrderStatus>())
        .transpose()
        .map_err(AppError::Validation)?;
    let status = status.map(|s| s.as_str());

    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };

    let orders = queries::list_all_orders(
        &state.db,
        status,
        params.user_id,
        params.seller_id,
        page.limit(),
        page.offset(),
    )
    .await?;
    let total =
        queries::count_all_orders(&state.db, status, params.user_id, params.seller_id).await?;

    let items = attach_lines(&state.db, orders).await?;
    Ok(Json(Paginated::new(items, total, &page)))
}
