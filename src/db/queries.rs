use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::db::models::{CartLine, LedgerEntry, Order, OrderLine, Product, UserAccount};
use crate::domain::LedgerKind;

// --- User queries ---

pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<Option<UserAccount>> {
    sqlx::query_as::<_, UserAccount>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

// --- Cart queries ---

pub async fn get_cart_lines(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Vec<CartLine>> {
    sqlx::query_as::<_, CartLine>(
        "SELECT * FROM cart_items WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(&mut **executor)
    .await
}

pub async fn clear_cart(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **executor)
        .await?;
    Ok(())
}

// --- Product queries ---

/// Batch-fetch every product referenced by a checkout in one round trip.
pub async fn get_products_by_ids(
    executor: &mut SqlxTransaction<'_, Postgres>,
    ids: &[Uuid],
) -> Result<Vec<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(&mut **executor)
        .await
}

/// Conditional stock decrement. Returns false when the product is missing,
/// inactive, or has fewer than `qty` units left, so a concurrent checkout
/// that raced us cannot oversell.
pub async fn decrement_stock(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: Uuid,
    qty: i32,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity - $2, updated_at = NOW()
        WHERE id = $1 AND is_active AND quantity >= $2
        "#,
    )
    .bind(product_id)
    .bind(qty)
    .execute(&mut **executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn increment_stock(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: Uuid,
    qty: i32,
) -> Result<()> {
    sqlx::query("UPDATE products SET quantity = quantity + $2, updated_at = NOW() WHERE id = $1")
        .bind(product_id)
        .bind(qty)
        .execute(&mut **executor)
        .await?;
    Ok(())
}

// --- Wallet / ledger queries ---

pub async fn get_balance(pool: &PgPool, user_id: Uuid) -> Result<Option<BigDecimal>> {
    let row: Option<(BigDecimal,)> =
        sqlx::query_as("SELECT balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

pub async fn get_balance_tx(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<BigDecimal>> {
    let row: Option<(BigDecimal,)> =
        sqlx::query_as("SELECT balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut **executor)
            .await?;
    Ok(row.map(|r| r.0))
}

/// Conditional debit: succeeds only while `balance >= amount`, returning the
/// new balance. `None` means insufficient funds, decided at the database so
/// concurrent debits cannot both pass a stale application-side check.
pub async fn debit_balance(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
    amount: &BigDecimal,
) -> Result<Option<BigDecimal>> {
    let row: Option<(BigDecimal,)> = sqlx::query_as(
        r#"
        UPDATE users
        SET balance = balance - $2, updated_at = NOW()
        WHERE id = $1 AND balance >= $2
        RETURNING balance
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(&mut **executor)
    .await?;

    Ok(row.map(|r| r.0))
}

pub async fn credit_balance(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
    amount: &BigDecimal,
) -> Result<BigDecimal> {
    let row: (BigDecimal,) = sqlx::query_as(
        r#"
        UPDATE users
        SET balance = balance + $2, updated_at = NOW()
        WHERE id = $1
        RETURNING balance
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_one(&mut **executor)
    .await?;

    Ok(row.0)
}

/// Append a ledger entry. `balance_after` must be the balance returned by
/// the debit/credit that ran in the same transaction.
pub async fn insert_ledger_entry(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
    amount: &BigDecimal,
    kind: LedgerKind,
    description: &str,
    balance_after: &BigDecimal,
) -> Result<LedgerEntry> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"
        INSERT INTO ledger_entries (id, user_id, amount, kind, description, balance_after, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(amount)
    .bind(kind.as_str())
    .bind(description)
    .bind(balance_after)
    .fetch_one(&mut **executor)
    .await
}

pub async fn list_ledger_entries(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<LedgerEntry>> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT * FROM ledger_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_ledger_entries(pool: &PgPool, user_id: Uuid) -> Result<i64> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM ledger_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

// --- Order queries ---

pub async fn insert_order(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order: &Order,
) -> Result<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (
            id, user_id, status, total_price, delivery_method, delivery_cost,
            delivery_address, phone, notes, tracking_number, estimated_delivery,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.status)
    .bind(&order.total_price)
    .bind(&order.delivery_method)
    .bind(&order.delivery_cost)
    .bind(&order.delivery_address)
    .bind(&order.phone)
    .bind(&order.notes)
    .bind(&order.tracking_number)
    .bind(&order.estimated_delivery)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(&mut **executor)
    .await
}

pub async fn insert_order_line(
    executor: &mut SqlxTransaction<'_, Postgres>,
    line: &OrderLine,
) -> Result<OrderLine> {
    sqlx::query_as::<_, OrderLine>(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, quantity, price_at_purchase, seller_id, delivered, paid_out
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(line.id)
    .bind(line.order_id)
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(&line.price_at_purchase)
    .bind(line.seller_id)
    .bind(line.delivered)
    .bind(line.paid_out)
    .fetch_one(&mut **executor)
    .await
}

pub async fn get_order(pool: &PgPool, id: Uuid) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fetch an order with a row lock so status transitions and payouts on the
/// same order serialize.
pub async fn get_order_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **executor)
        .await
}

pub async fn get_order_lines(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderLine>> {
    sqlx::query_as::<_, OrderLine>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

/// Batch-fetch the lines of a whole listing page in one round trip.
pub async fn get_lines_for_orders(pool: &PgPool, order_ids: &[Uuid]) -> Result<Vec<OrderLine>> {
    sqlx::query_as::<_, OrderLine>("SELECT * FROM order_items WHERE order_id = ANY($1)")
        .bind(order_ids)
        .fetch_all(pool)
        .await
}

pub async fn get_order_lines_tx(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<Vec<OrderLine>> {
    sqlx::query_as::<_, OrderLine>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(&mut **executor)
        .await
}

pub async fn seller_has_lines(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
    seller_id: Uuid,
) -> Result<bool> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM order_items WHERE order_id = $1 AND seller_id = $2)",
    )
    .bind(order_id)
    .bind(seller_id)
    .fetch_one(&mut **executor)
    .await?;
    Ok(row.0)
}

/// Claim one seller's unpaid lines for payout. The `paid_out = FALSE` guard
/// makes the payout exactly-once: a second transition, or a concurrent one,
/// claims zero rows and credits nothing.
pub async fn claim_unpaid_lines_for_seller(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
    seller_id: Uuid,
) -> Result<Vec<OrderLine>> {
    sqlx::query_as::<_, OrderLine>(
        r#"
        UPDATE order_items
        SET paid_out = TRUE, delivered = TRUE
        WHERE order_id = $1 AND seller_id = $2 AND paid_out = FALSE
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(seller_id)
    .fetch_all(&mut **executor)
    .await
}

/// Claim every unpaid line of an order, across all sellers.
pub async fn claim_all_unpaid_lines(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<Vec<OrderLine>> {
    sqlx::query_as::<_, OrderLine>(
        r#"
        UPDATE order_items
        SET paid_out = TRUE, delivered = TRUE
        WHERE order_id = $1 AND paid_out = FALSE
        RETURNING *
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut **executor)
    .await
}

pub async fn mark_all_lines_delivered(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<()> {
    sqlx::query("UPDATE order_items SET delivered = TRUE WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut **executor)
        .await?;
    Ok(())
}

pub async fn all_lines_delivered(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<bool> {
    let row: (bool,) = sqlx::query_as(
        "SELECT NOT EXISTS (SELECT 1 FROM order_items WHERE order_id = $1 AND delivered = FALSE)",
    )
    .bind(order_id)
    .fetch_one(&mut **executor)
    .await?;
    Ok(row.0)
}

pub async fn update_order_status(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Order> {
    sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_one(&mut **executor)
    .await
}

/// Admin-editable shipping fields; untouched fields pass NULL and keep
/// their current value.
pub async fn update_order_shipping(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    tracking_number: Option<&str>,
    estimated_delivery: Option<&str>,
) -> Result<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET tracking_number = COALESCE($2, tracking_number),
            estimated_delivery = COALESCE($3, estimated_delivery),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(tracking_number)
    .bind(estimated_delivery)
    .fetch_one(&mut **executor)
    .await
}

// --- Order listings ---

pub async fn list_user_orders(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT * FROM orders
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_user_orders(pool: &PgPool, user_id: Uuid) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn list_all_orders(
    pool: &PgPool,
    status: Option<&str>,
    user_id: Option<Uuid>,
    seller_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT * FROM orders o
        WHERE ($1::text IS NULL OR o.status = $1)
          AND ($2::uuid IS NULL OR o.user_id = $2)
          AND ($3::uuid IS NULL OR EXISTS (
              SELECT 1 FROM order_items oi WHERE oi.order_id = o.id AND oi.seller_id = $3
          ))
        ORDER BY o.created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(status)
    .bind(user_id)
    .bind(seller_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_all_orders(
    pool: &PgPool,
    status: Option<&str>,
    user_id: Option<Uuid>,
    seller_id: Option<Uuid>,
) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM orders o
        WHERE ($1::text IS NULL OR o.status = $1)
          AND ($2::uuid IS NULL OR o.user_id = $2)
          AND ($3::uuid IS NULL OR EXISTS (
              SELECT 1 FROM order_items oi WHERE oi.order_id = o.id AND oi.seller_id = $3
          ))
        "#,
    )
    .bind(status)
    .bind(user_id)
    .bind(seller_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Orders containing at least one of the seller's lines, deduplicated.
pub async fn list_seller_orders(
    pool: &PgPool,
    seller_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT * FROM orders o
        WHERE EXISTS (
            SELECT 1 FROM order_items oi WHERE oi.order_id = o.id AND oi.seller_id = $1
        )
        ORDER BY o.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(seller_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_seller_orders(pool: &PgPool, seller_id: Uuid) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM orders o
        WHERE EXISTS (
            SELECT 1 FROM order_items oi WHERE oi.order_id = o.id AND oi.seller_id = $1
        )
        "#,
    )
    .bind(seller_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

// --- Reconciliation ---

#[derive(Debug, sqlx::FromRow)]
pub struct BalanceDrift {
    pub user_id: Uuid,
    pub email: String,
    pub balance: BigDecimal,
    pub ledger_sum: BigDecimal,
}

/// Accounts whose cached balance disagrees with the sum of their ledger.
pub async fn find_balance_drift(pool: &PgPool) -> Result<Vec<BalanceDrift>> {
    sqlx::query_as::<_, BalanceDrift>(
        r#"
        SELECT u.id AS user_id, u.email, u.balance,
               COALESCE(SUM(l.amount), 0) AS ledger_sum
        FROM users u
        LEFT JOIN ledger_entries l ON l.user_id = u.id
        GROUP BY u.id, u.email, u.balance
        HAVING u.balance <> COALESCE(SUM(l.amount), 0)
        "#,
    )
    .fetch_all(pool)
    .await
}
