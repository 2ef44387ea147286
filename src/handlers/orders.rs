use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::AppState;
use crate::db::models::{Order, OrderLine, OrderWithLines};
use crate::db::queries;
use crate::domain::{DeliveryMethod, OrderStatus, PaymentMethod, Role};
use crate::error::AppError;
use crate::middleware::auth::Identity;
use crate::services::{
    CheckoutRequest, CheckoutService, FulfillmentService, Notifier, StatusUpdate,
};
use crate::utils::pagination::{PageParams, Paginated};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub delivery_method: String,
    pub payment_method: String,
    pub delivery_address: String,
    pub phone: String,
    pub notes: Option<String>,
}

pub async fn create_order(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_delivery_address(&payload.delivery_address)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validation::validate_phone(&payload.phone)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if let Some(notes) = &payload.notes {
        validation::validate_notes(notes).map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let delivery_method: DeliveryMethod = payload
        .delivery_method
        .parse()
        .map_err(AppError::Validation)?;
    let payment_method: PaymentMethod = payload
        .payment_method
        .parse()
        .map_err(AppError::Validation)?;

    let service = CheckoutService::new(state.db.clone(), state.config.checkout_policy);
    let order = service
        .place_order(
            identity.user_id,
            CheckoutRequest {
                delivery_method,
                payment_method,
                delivery_address: payload.delivery_address,
                phone: payload.phone,
                notes: payload.notes,
            },
        )
        .await?;

    // Best-effort confirmation; a notification failure never fails checkout.
    if let Ok(Some(user)) = queries::get_user(&state.db, identity.user_id).await {
        let tracking = order.order.tracking_number.clone().unwrap_or_default();
        if let Err(e) = Notifier::order_confirmation(&user.email, &tracking) {
            tracing::warn!("Order confirmation notification failed: {}", e);
        }
    }

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_my_orders(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let orders =
        queries::list_user_orders(&state.db, identity.user_id, params.limit(), params.offset())
            .await?;
    let total = queries::count_user_orders(&state.db, identity.user_id).await?;

    let items = attach_lines(&state.db, orders).await?;
    Ok(Json(Paginated::new(items, total, &params)))
}

pub async fn get_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = queries::get_order(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    let items = queries::get_order_lines(&state.db, id).await?;

    // Owners, admins, and sellers with a line in the order may see it;
    // everyone else gets the same NotFound as a missing order.
    let is_owner = order.user_id == identity.user_id;
    let is_admin = identity.role == Role::Admin;
    let is_seller_in_order = items.iter().any(|line| line.seller_id == identity.user_id);

    if !is_owner && !is_admin && !is_seller_in_order {
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    Ok(Json(OrderWithLines { order, items }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = payload
        .status
        .map(|s| s.parse::<OrderStatus>())
        .transpose()
        .map_err(AppError::Validation)?;

    let service = FulfillmentService::new(state.db.clone());
    let order = service
        .update_status(
            id,
            &identity,
            StatusUpdate {
                status,
                tracking_number: payload.tracking_number,
                estimated_delivery: payload.estimated_delivery,
            },
        )
        .await?;

    if status.is_some() {
        if let Ok(Some(user)) = queries::get_user(&state.db, order.order.user_id).await {
            let tracking = order.order.tracking_number.clone().unwrap_or_default();
            if let Err(e) =
                Notifier::order_status_change(&user.email, &tracking, &order.order.status)
            {
                tracing::warn!("Order status notification failed: {}", e);
            }
        }
    }

    Ok(Json(order))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = FulfillmentService::new(state.db.clone());
    let order = service.cancel(id, identity.user_id).await?;
    Ok(Json(order))
}

/// Attach lines to a page of orders with a single batched query.
pub(crate) async fn attach_lines(
    pool: &PgPool,
    orders: Vec<Order>,
) -> Result<Vec<OrderWithLines>, AppError> {
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in queries::get_lines_for_orders(pool, &order_ids).await? {
        by_order.entry(line.order_id).or_default().push(line);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithLines { order, items }
        })
        .collect())
}
