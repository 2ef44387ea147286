use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::CheckoutPolicy;
use crate::db::models::{Order, OrderLine, OrderWithLines};
use crate::db::queries;
use crate::domain::{DeliveryMethod, LedgerKind, OrderStatus, PaymentMethod, new_tracking_number};
use crate::error::AppError;

#[derive(Debug)]
pub struct CheckoutRequest {
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub delivery_address: String,
    pub phone: String,
    pub notes: Option<String>,
}

pub struct CheckoutService {
    pool: PgPool,
    policy: CheckoutPolicy,
}

impl CheckoutService {
    pub fn new(pool: PgPool, policy: CheckoutPolicy) -> Self {
        Self { pool, policy }
    }

    /// Convert the user's cart into a durable order.
    ///
    /// Runs in a single transaction: order, lines, stock decrements, the
    /// wallet debit with its ledger entry, and the cart clear all commit
    /// together or not at all. Prices are frozen into the lines at this
    /// moment; later product price edits never touch an existing order.
    pub async fn place_order(
        &self,
        user_id: Uuid,
        request: CheckoutRequest,
    ) -> Result<OrderWithLines, AppError> {
        let mut tx = self.pool.begin().await?;

        let cart_lines = queries::get_cart_lines(&mut tx, user_id).await?;
        if cart_lines.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let product_ids: Vec<Uuid> = cart_lines.iter().map(|line| line.product_id).collect();
        let products = queries::get_products_by_ids(&mut tx, &product_ids).await?;
        let products: HashMap<Uuid, _> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let mut total_price = BigDecimal::from(0);
        let mut line_specs = Vec::with_capacity(cart_lines.len());

        for cart_line in &cart_lines {
            let product = products.get(&cart_line.product_id).ok_or_else(|| {
                AppError::ProductUnavailable(format!("Product {} not found", cart_line.product_id))
            })?;

            if !product.is_active {
                return Err(AppError::ProductUnavailable(format!(
                    "Product '{}' is not available",
                    product.name
                )));
            }

            if product.quantity < cart_line.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient stock for '{}'. Available: {}",
                    product.name, product.quantity
                )));
            }

            let subtotal = &product.price * BigDecimal::from(cart_line.quantity);
            total_price += subtotal;

            line_specs.push((
                product.id,
                product.name.clone(),
                cart_line.quantity,
                product.price.clone(),
                product.seller_id,
            ));
        }

        let delivery_cost = request.delivery_method.fee();
        total_price += delivery_cost.clone();

        let wallet_paid =
            self.policy == CheckoutPolicy::WalletSync && request.payment_method == PaymentMethod::Wallet;
        if self.policy == CheckoutPolicy::Deferred && request.payment_method == PaymentMethod::Wallet {
            return Err(AppError::Validation(
                "Wallet payment is not accepted at checkout; the order is paid separately"
                    .to_string(),
            ));
        }

        let status = if wallet_paid {
            OrderStatus::Processing
        } else {
            OrderStatus::Pending
        };

        let tracking_number = new_tracking_number();
        let estimated_delivery = request.delivery_method.estimated_delivery(Utc::now());

        let order = Order::new(
            user_id,
            status,
            total_price.clone(),
            request.delivery_method,
            delivery_cost,
            request.delivery_address,
            request.phone,
            request.notes,
            tracking_number.clone(),
            estimated_delivery,
        );
        let order = queries::insert_order(&mut tx, &order).await?;

        if wallet_paid {
            let new_balance = match queries::debit_balance(&mut tx, user_id, &total_price).await? {
                Some(balance) => balance,
                None => {
                    let available = queries::get_balance_tx(&mut tx, user_id)
                        .await?
                        .unwrap_or_else(|| BigDecimal::from(0));
                    return Err(AppError::InsufficientBalance(format!(
                        "Required: {}, Available: {}",
                        total_price, available
                    )));
                }
            };

            let debited = -&total_price;
            queries::insert_ledger_entry(
                &mut tx,
                user_id,
                &debited,
                LedgerKind::Debit,
                &format!("Payment for order {}", tracking_number),
                &new_balance,
            )
            .await?;
        }

        let mut lines = Vec::with_capacity(line_specs.len());
        for (product_id, product_name, quantity, price, seller_id) in line_specs {
            let line = OrderLine::new(order.id, product_id, quantity, price, seller_id);
            let line = queries::insert_order_line(&mut tx, &line).await?;

            // Authoritative stock check. A false return here means a
            // concurrent checkout drained the stock after our read above.
            if !queries::decrement_stock(&mut tx, product_id, quantity).await? {
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient stock for '{}'",
                    product_name
                )));
            }

            lines.push(line);
        }

        queries::clear_cart(&mut tx, user_id).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            tracking = %tracking_number,
            total = %order.total_price,
            wallet_paid,
            "order created"
        );

        Ok(OrderWithLines { order, items: lines })
    }
}
