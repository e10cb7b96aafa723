//! Order Ingest (C5). Validates a purchase, normalises it to sales
//! units, and drives the Partner Registry, Network Walker, Ledger,
//! Commission Queue and Rank Engine atomically (§4.5).

use crate::config::AppConfig;
use crate::domain;
use crate::error::{AppError, AppResult};
use crate::models::{LedgerKind, Order, OrderCreate, Package};
use crate::services::{commission_queue, ledger, network_walker, partner_registry, rank_engine};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Normalises a package price into sales units: `max(1, floor(price / unit_price))`.
fn sales_units_for(price: Decimal, unit_price: Decimal) -> i64 {
    if unit_price <= Decimal::ZERO {
        return 1;
    }
    let units = (price / unit_price).trunc();
    let units: i64 = units.try_into().unwrap_or(i64::MAX);
    units.max(1)
}

/// Creates a package purchase order and applies every compensation
/// side-effect in one transaction (§4.5). Either the order is visible
/// with all its side-effects, or none of them are.
pub async fn create_order(
    pool: &PgPool,
    buyer_partner_id: i64,
    payload: OrderCreate,
    config: &AppConfig,
) -> AppResult<Order> {
    let package = sqlx::query_as::<_, Package>(
        "SELECT * FROM packages WHERE id = $1 AND active = true",
    )
    .bind(payload.package_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("package {}", payload.package_id)))?;

    let sales_units = sales_units_for(package.price, config.unit_price);

    let mut tx = pool.begin().await?;

    // 1. Write the order row.
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (buyer_partner_id, package_id, amount, sales_units, status, payment_method, payment_reference)
        VALUES ($1, $2, $3, $4, 'pending', $5, $6)
        RETURNING *
        "#,
    )
    .bind(buyer_partner_id)
    .bind(package.id)
    .bind(package.price)
    .bind(sales_units)
    .bind(&payload.payment_method)
    .bind(&payload.payment_reference)
    .fetch_one(&mut *tx)
    .await?;

    // Walk the upline before taking any locks, so we know the full set
    // of partner rows this transaction will touch.
    let upline_ids = network_walker::upline(&mut tx, buyer_partner_id, network_walker::DEFAULT_MAX_DEPTH).await?;

    // Lock buyer + every upline row top-down by id (§4.5, §5) to avoid
    // deadlocking against a concurrent order on an overlapping upline.
    let mut lock_ids = upline_ids.clone();
    lock_ids.push(buyer_partner_id);
    let locked = partner_registry::lock_partners_for_update(&mut tx, lock_ids).await?;
    let locked_by_id: std::collections::HashMap<i64, _> =
        locked.into_iter().map(|p| (p.id, p)).collect();

    // 2. Registry: bump the buyer's direct sales units.
    partner_registry::increment_direct(&mut tx, buyer_partner_id, sales_units).await?;

    // 3. Walk upline; for each member, compute the tiered rate from
    // their *pre-increment* team_sales_units, enqueue a commission row,
    // then apply the increment.
    let window_start = Utc::now();
    let window_end = window_start + Duration::days(7);

    for (idx, upline_id) in upline_ids.iter().enumerate() {
        let level = (idx + 1) as i32;
        let upline_partner = locked_by_id
            .get(upline_id)
            .expect("upline partner was locked above");

        let rate = domain::tiered_rate(upline_partner.team_sales_units, &config.tier_thresholds);
        let amount = Decimal::from(sales_units) * config.unit_price * rate;

        commission_queue::enqueue(
            &mut tx,
            *upline_id,
            order.id,
            level,
            sales_units,
            amount,
            window_start,
            window_end,
        )
        .await?;

        partner_registry::increment_team(&mut tx, *upline_id, sales_units).await?;
    }

    // 4. Instant referral bonus to the immediate referrer.
    if let Some(referrer_id) = upline_ids.first().copied() {
        let bonus = package.price * config.direct_referral_rate;
        ledger::record_credit(
            &mut tx,
            referrer_id,
            LedgerKind::DirectReferral,
            bonus,
            &format!("Direct referral bonus for new partner #{buyer_partner_id}"),
            Some(buyer_partner_id),
        )
        .await?;
    }

    // 5. Rank Engine, evaluated against the buyer's post-purchase totals.
    let buyer_after = locked_by_id
        .get(&buyer_partner_id)
        .cloned()
        .map(|mut p| {
            p.direct_sales_units += sales_units;
            p
        })
        .expect("buyer was locked above");

    rank_engine::apply(&mut tx, &buyer_after, &config.rank_thresholds).await?;

    tx.commit().await?;

    Ok(order)
}

pub async fn get_order(pool: &PgPool, order_id: i64) -> AppResult<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
}

pub async fn list_orders_for_partner(pool: &PgPool, partner_id: i64) -> AppResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE buyer_partner_id = $1 ORDER BY created_at DESC",
    )
    .bind(partner_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Transitions an order's status (§6). Orders are immutable once
/// terminal (§3); only `pending -> {paid, failed, refunded}` is legal.
pub async fn update_status(pool: &PgPool, order_id: i64, new_status: &str) -> AppResult<Order> {
    use crate::models::OrderStatus;

    let next = OrderStatus::parse(new_status)
        .ok_or_else(|| AppError::Validation(format!("unknown status {new_status}")))?;

    let order = get_order(pool, order_id).await?;
    let current = OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::Validation("order has an unrecognised status".to_string()))?;

    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "cannot transition order from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let updated = if next == OrderStatus::Paid {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, paid_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(order_id)
        .bind(next.as_str())
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as::<_, Order>("UPDATE orders SET status = $2 WHERE id = $1 RETURNING *")
            .bind(order_id)
            .bind(next.as_str())
            .fetch_one(pool)
            .await?
    };

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sales_units_round_down_with_a_floor_of_one() {
        assert_eq!(sales_units_for(dec!(50_000), dec!(5000)), 10);
        assert_eq!(sales_units_for(dec!(4999), dec!(5000)), 1);
        assert_eq!(sales_units_for(dec!(0), dec!(5000)), 1);
        assert_eq!(sales_units_for(dec!(12_000), dec!(5000)), 2);
    }
}
