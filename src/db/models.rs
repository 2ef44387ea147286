use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::domain::{DeliveryMethod, OrderStatus};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub balance: BigDecimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub quantity: i32,
    pub seller_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_price: BigDecimal,
    pub delivery_method: String,
    pub delivery_cost: BigDecimal,
    pub delivery_address: String,
    pub phone: String,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        status: OrderStatus,
        total_price: BigDecimal,
        delivery_method: DeliveryMethod,
        delivery_cost: BigDecimal,
        delivery_address: String,
        phone: String,
        notes: Option<String>,
        tracking_number: String,
        estimated_delivery: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            status: status.as_str().to_string(),
            total_price,
            delivery_method: delivery_method.as_str().to_string(),
            delivery_cost,
            delivery_address,
            phone,
            notes,
            tracking_number: Some(tracking_number),
            estimated_delivery: Some(estimated_delivery),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_purchase: BigDecimal,
    pub seller_id: Uuid,
    pub delivered: bool,
    pub paid_out: bool,
}

impl OrderLine {
    pub fn new(
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price_at_purchase: BigDecimal,
        seller_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id,
            quantity,
            price_at_purchase,
            seller_id,
            delivered: false,
            paid_out: false,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: BigDecimal,
    pub kind: String,
    pub description: String,
    pub balance_after: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// An order together with its lines, the shape every order endpoint returns.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
}
