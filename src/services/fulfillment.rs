use std::collections::HashMap;

use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{OrderLine, OrderWithLines};
use crate::db::queries;
use crate::domain::{LedgerKind, OrderStatus, Role};
use crate::error::AppError;
use crate::middleware::auth::Identity;

#[derive(Debug, Default)]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
}

pub struct FulfillmentService {
    pool: PgPool,
}

impl FulfillmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Move an order toward delivery.
    ///
    /// Sellers may only mark their own lines delivered; doing so settles
    /// their unpaid portion exactly once. Admins may set any status, and a
    /// transition that newly reaches `delivered` settles every remaining
    /// unpaid line across all sellers.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        actor: &Identity,
        update: StatusUpdate,
    ) -> Result<OrderWithLines, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = queries::get_order_for_update(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let current: OrderStatus = order
            .status
            .parse()
            .map_err(AppError::Internal)?;
        let tracking = order.tracking_number.clone().unwrap_or_default();

        let order = if actor.role == Role::Admin {
            self.admin_transition(&mut tx, order_id, current, &tracking, update)
                .await?
        } else {
            self.seller_transition(&mut tx, order_id, actor.user_id, current, &tracking, update)
                .await?
        };

        let items = queries::get_order_lines_tx(&mut tx, order_id).await?;
        tx.commit().await?;

        Ok(OrderWithLines { order, items })
    }

    async fn seller_transition(
        &self,
        tx: &mut SqlxTransaction<'_, Postgres>,
        order_id: Uuid,
        seller_id: Uuid,
        current: OrderStatus,
        tracking: &str,
        update: StatusUpdate,
    ) -> Result<crate::db::models::Order, AppError> {
        if !queries::seller_has_lines(tx, order_id, seller_id).await? {
            return Err(AppError::Forbidden(
                "You don't have permission to update this order".to_string(),
            ));
        }

        if update.status != Some(OrderStatus::Delivered) {
            return Err(AppError::Forbidden(
                "Sellers can only mark items as delivered".to_string(),
            ));
        }

        if current.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Order is already {}",
                current
            )));
        }

        let claimed = queries::claim_unpaid_lines_for_seller(tx, order_id, seller_id).await?;
        let payout = line_total(&claimed);

        if payout > BigDecimal::from(0) {
            let new_balance = queries::credit_balance(tx, seller_id, &payout).await?;
            queries::insert_ledger_entry(
                tx,
                seller_id,
                &payout,
                LedgerKind::Credit,
                &format!("Payout for items in order {}", tracking),
                &new_balance,
            )
            .await?;

            tracing::info!(
                order_id = %order_id,
                seller_id = %seller_id,
                amount = %payout,
                "seller payout settled"
            );
        }

        let new_status = if queries::all_lines_delivered(tx, order_id).await? {
            OrderStatus::Delivered
        } else if current == OrderStatus::Pending {
            OrderStatus::Processing
        } else {
            current
        };

        Ok(queries::update_order_status(tx, order_id, new_status.as_str()).await?)
    }

    async fn admin_transition(
        &self,
        tx: &mut SqlxTransaction<'_, Postgres>,
        order_id: Uuid,
        current: OrderStatus,
        tracking: &str,
        update: StatusUpdate,
    ) -> Result<crate::db::models::Order, AppError> {
        let mut order = queries::update_order_shipping(
            tx,
            order_id,
            update.tracking_number.as_deref(),
            update.estimated_delivery.as_deref(),
        )
        .await?;

        let Some(new_status) = update.status else {
            return Ok(order);
        };

        if new_status != current && current.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Order is already {}",
                current
            )));
        }

        if new_status != current {
            order = queries::update_order_status(tx, order_id, new_status.as_str()).await?;
        }

        if new_status == OrderStatus::Delivered && current != OrderStatus::Delivered {
            let claimed = queries::claim_all_unpaid_lines(tx, order_id).await?;

            let mut earnings: HashMap<Uuid, BigDecimal> = HashMap::new();
            for line in &claimed {
                let amount = &line.price_at_purchase * BigDecimal::from(line.quantity);
                *earnings.entry(line.seller_id).or_insert_with(|| BigDecimal::from(0)) += amount;
            }

            for (seller_id, amount) in earnings {
                let new_balance = queries::credit_balance(tx, seller_id, &amount).await?;
                queries::insert_ledger_entry(
                    tx,
                    seller_id,
                    &amount,
                    LedgerKind::Credit,
                    &format!("Payout for order {}", tracking),
                    &new_balance,
                )
                .await?;

                tracing::info!(
                    order_id = %order_id,
                    seller_id = %seller_id,
                    amount = %amount,
                    "seller payout settled"
                );
            }

            queries::mark_all_lines_delivered(tx, order_id).await?;
        }

        Ok(order)
    }

    /// Cancel a pending order, restoring every line's quantity to stock.
    pub async fn cancel(&self, order_id: Uuid, user_id: Uuid) -> Result<OrderWithLines, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = queries::get_order_for_update(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.user_id != user_id {
            return Err(AppError::Forbidden(
                "You don't have permission to cancel this order".to_string(),
            ));
        }

        let current: OrderStatus = order.status.parse().map_err(AppError::Internal)?;
        if current != OrderStatus::Pending {
            return Err(AppError::InvalidState(
                "Only pending orders can be cancelled".to_string(),
            ));
        }

        let items = queries::get_order_lines_tx(&mut tx, order_id).await?;
        for line in &items {
            queries::increment_stock(&mut tx, line.product_id, line.quantity).await?;
        }

        let order =
            queries::update_order_status(&mut tx, order_id, OrderStatus::Cancelled.as_str())
                .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, "order cancelled");

        Ok(OrderWithLines { order, items })
    }
}

fn line_total(lines: &[OrderLine]) -> BigDecimal {
    lines.iter().fold(BigDecimal::from(0), |acc, line| {
        acc + &line.price_at_purchase * BigDecimal::from(line.quantity)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: i32) -> OrderLine {
        OrderLine::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            quantity,
            BigDecimal::from(price),
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_line_total_sums_price_times_quantity() {
        let lines = vec![line(100, 2), line(50, 1)];
        assert_eq!(line_total(&lines), BigDecimal::from(250));
    }

    #[test]
    fn test_line_total_empty() {
        assert_eq!(line_total(&[]), BigDecimal::from(0));
    }
}
