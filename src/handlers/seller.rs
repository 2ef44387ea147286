use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::AppState;
use crate::db::queries;
use crate::domain::Role;
use crate::error::AppError;
use crate::handlers::orders::attach_lines;
use crate::middleware::auth::Identity;
use crate::utils::pagination::{PageParams, Paginated};

/// Orders containing at least one of the caller's lines, deduplicated.
pub async fn list_seller_orders(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    if identity.role != Role::Seller && identity.role != Role::Admin {
        return Err(AppError::Forbidden("Seller access required".to_string()));
    }

    let orders =
        queries::list_seller_orders(&state.db, identity.user_id, params.limit(), params.offset())
            .await?;
    let total = queries::count_seller_orders(&state.db, identity.user_id).await?;

    let items = attach_lines(&state.db, orders).await?;
    Ok(Json(Paginated::new(items, total, &params)))
}
