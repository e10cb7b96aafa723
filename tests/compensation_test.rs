mod common;

use compensation_engine::config::AppConfig;
use compensation_engine::models::{LedgerEntry, LedgerKind, OrderCreate, Partner};
use compensation_engine::services::{ledger, order_ingest, partner_registry::PartnerRegistry, weekly_settler};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serial_test::serial;
use sqlx::PgPool;

fn test_config() -> AppConfig {
    // `AppConfig::default()` reads `DATABASE_URL` from the environment
    // (already required to reach this point) and otherwise falls back
    // to the same constants as the spec (§4.2, §4.6, §4.8).
    AppConfig::default()
}

async fn register(pool: &PgPool, full_name: &str, email: &str, referrer_code: Option<&str>) -> Partner {
    PartnerRegistry::new(pool.clone())
        .create(full_name, email, referrer_code)
        .await
        .expect("registration should succeed")
}

#[tokio::test]
#[serial]
async fn s1_instant_bonus_credits_referrer_and_queues_team_commission() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let a = register(&pool, "A", "a@example.com", None).await;
    let b = register(&pool, "B", "b@example.com", Some(&a.referral_code)).await;

    let package_id = common::seed_package(&pool, dec!(50_000)).await;

    let order = order_ingest::create_order(
        &pool,
        b.id,
        OrderCreate {
            package_id,
            payment_method: "card".to_string(),
            payment_reference: None,
        },
        &config,
    )
    .await
    .expect("order should be ingested");

    assert_eq!(order.sales_units, 10);

    let registry = PartnerRegistry::new(pool.clone());
    let a_after = registry.get_by_id(a.id).await.unwrap();
    assert_eq!(a_after.wallet_balance, dec!(10_000));
    assert_eq!(a_after.team_sales_units, 10);

    let direct_referral = ledger::sum_by_kind(&pool, a.id, LedgerKind::DirectReferral)
        .await
        .unwrap();
    assert_eq!(direct_referral, dec!(10_000));

    let pending = compensation_engine::services::commission_queue::pending_amount_for_partner(&pool, a.id)
        .await
        .unwrap();
    assert_eq!(pending, dec!(1_000));
}

#[tokio::test]
#[serial]
async fn s2_tier_boundary_is_inclusive_on_the_lower_tier() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let c = register(&pool, "C", "c@example.com", None).await;
    let d = register(&pool, "D", "d@example.com", Some(&c.referral_code)).await;

    sqlx::query("UPDATE partners SET team_sales_units = 1000 WHERE id = $1")
        .bind(c.id)
        .execute(&pool)
        .await
        .unwrap();

    let package_id = common::seed_package(&pool, dec!(50_000)).await;

    order_ingest::create_order(
        &pool,
        d.id,
        OrderCreate {
            package_id,
            payment_method: "card".to_string(),
            payment_reference: None,
        },
        &config,
    )
    .await
    .unwrap();

    let pending = compensation_engine::services::commission_queue::pending_amount_for_partner(&pool, c.id)
        .await
        .unwrap();
    assert_eq!(pending, dec!(1_000));

    let c_after = PartnerRegistry::new(pool.clone()).get_by_id(c.id).await.unwrap();
    assert_eq!(c_after.team_sales_units, 1010);
}

#[tokio::test]
#[serial]
async fn s3_deep_upline_fans_out_tiered_rows_and_one_direct_bonus() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let root = register(&pool, "root", "root@example.com", None).await;
    let mut upline_code = root.referral_code.clone();
    let mut chain = vec![root.clone()];
    for i in 1..=5 {
        let partner = register(
            &pool,
            &format!("r{i}"),
            &format!("r{i}@example.com"),
            Some(&upline_code),
        )
        .await;
        upline_code = partner.referral_code.clone();
        chain.push(partner);
    }
    let buyer = register(&pool, "buyer", "buyer@example.com", Some(&upline_code)).await;

    let package_id = common::seed_package(&pool, dec!(100_000)).await; // units = 20

    order_ingest::create_order(
        &pool,
        buyer.id,
        OrderCreate {
            package_id,
            payment_method: "card".to_string(),
            payment_reference: None,
        },
        &config,
    )
    .await
    .unwrap();

    // Every upline member (root..r5) started at team_sales_units = 0,
    // so each gets the tier-1 rate on 20 units.
    for partner in &chain {
        let pending = compensation_engine::services::commission_queue::pending_amount_for_partner(&pool, partner.id)
            .await
            .unwrap();
        assert_eq!(pending, dec!(2_000), "partner {} pending amount", partner.full_name);
    }

    let r5 = chain.last().unwrap();
    let direct_referral = ledger::sum_by_kind(&pool, r5.id, LedgerKind::DirectReferral)
        .await
        .unwrap();
    assert_eq!(direct_referral, dec!(20_000));
}

#[tokio::test]
#[serial]
async fn s4_rank_advance_awards_one_step_with_no_insurance_for_achiever() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let buyer = register(&pool, "buyer", "buyer4@example.com", None).await;
    sqlx::query("UPDATE partners SET direct_sales_units = 95 WHERE id = $1")
        .bind(buyer.id)
        .execute(&pool)
        .await
        .unwrap();

    let package_id = common::seed_package(&pool, dec!(50_000)).await; // units = 10

    order_ingest::create_order(
        &pool,
        buyer.id,
        OrderCreate {
            package_id,
            payment_method: "card".to_string(),
            payment_reference: None,
        },
        &config,
    )
    .await
    .unwrap();

    let after = PartnerRegistry::new(pool.clone()).get_by_id(buyer.id).await.unwrap();
    assert_eq!(after.rank, "achiever");
    assert_eq!(after.insurance_amount, Decimal::ZERO);

    let rank_bonus = ledger::sum_by_kind(&pool, buyer.id, LedgerKind::RankBonus).await.unwrap();
    assert_eq!(rank_bonus, dec!(10_000));

    let insurance_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM insurance_assignments WHERE partner_id = $1")
        .bind(buyer.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(insurance_count, 0);
}

#[tokio::test]
#[serial]
async fn s5_weekly_settle_aggregates_and_is_idempotent() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let root = register(&pool, "root", "root5@example.com", None).await;
    let buyer = register(&pool, "p", "p5@example.com", Some(&root.referral_code)).await;

    let package_id = common::seed_package(&pool, dec!(50_000)).await;
    let order = order_ingest::create_order(
        &pool,
        buyer.id,
        OrderCreate {
            package_id,
            payment_method: "card".to_string(),
            payment_reference: None,
        },
        &config,
    )
    .await
    .unwrap();

    // That single order already enqueued a tier-1 commission row for
    // `root`; add two more manually to exercise the aggregation path
    // with several rows collapsing into one settlement credit.
    let mut tx = pool.begin().await.unwrap();
    let now = chrono::Utc::now();
    for amount in [dec!(2_500), dec!(500)] {
        compensation_engine::services::commission_queue::enqueue(
            &mut tx,
            root.id,
            order.id,
            1,
            1,
            amount,
            now,
            now + chrono::Duration::days(7),
        )
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();

    let stats = weekly_settler::run_once(&pool).await.unwrap();
    assert_eq!(stats.partners_processed, 1);
    assert_eq!(stats.total_credited, dec!(4_000));

    let team_commission = ledger::sum_by_kind(&pool, root.id, LedgerKind::TeamCommission)
        .await
        .unwrap();
    assert_eq!(team_commission, dec!(4_000));

    let entries_before: Vec<LedgerEntry> = ledger::feed(&pool, root.id, 100).await.unwrap();

    let second_run = weekly_settler::run_once(&pool).await.unwrap();
    assert_eq!(second_run.partners_processed, 0);

    let entries_after: Vec<LedgerEntry> = ledger::feed(&pool, root.id, 100).await.unwrap();
    assert_eq!(entries_before.len(), entries_after.len());
}

#[tokio::test]
#[serial]
async fn s6_payout_reject_refunds_the_wallet() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let p = register(&pool, "p", "p6@example.com", None).await;
    sqlx::query("UPDATE partners SET wallet_balance = 10000, total_earnings = 10000 WHERE id = $1")
        .bind(p.id)
        .execute(&pool)
        .await
        .unwrap();

    let entry = compensation_engine::services::payout::request(&pool, p.id, dec!(3_000), &config)
        .await
        .unwrap();

    let after_request = PartnerRegistry::new(pool.clone()).get_by_id(p.id).await.unwrap();
    assert_eq!(after_request.wallet_balance, dec!(7_000));
    assert_eq!(entry.amount, dec!(-3_000));

    let rejected = compensation_engine::services::payout::reject(&pool, entry.id).await.unwrap();
    assert_eq!(rejected.status, "cancelled");

    let after_reject = PartnerRegistry::new(pool.clone()).get_by_id(p.id).await.unwrap();
    assert_eq!(after_reject.wallet_balance, dec!(10_000));
}

#[tokio::test]
#[serial]
async fn payout_below_minimum_is_rejected() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let p = register(&pool, "p", "p7@example.com", None).await;
    sqlx::query("UPDATE partners SET wallet_balance = 10000 WHERE id = $1")
        .bind(p.id)
        .execute(&pool)
        .await
        .unwrap();

    let result = compensation_engine::services::payout::request(&pool, p.id, dec!(500), &config).await;
    assert!(matches!(result, Err(compensation_engine::error::AppError::MinWithdrawal)));
}

#[tokio::test]
#[serial]
async fn payout_over_balance_is_rejected() {
    let pool = common::setup_test_db().await;
    let config = test_config();

    let p = register(&pool, "p", "p8@example.com", None).await;

    let result = compensation_engine::services::payout::request(&pool, p.id, dec!(5_000), &config).await;
    assert!(matches!(
        result,
        Err(compensation_engine::error::AppError::InsufficientFunds)
    ));
}

#[tokio::test]
#[serial]
async fn wallet_consistency_holds_after_a_mixed_sequence() {
    // Invariant 1, §8: wallet_balance == sum(approved credits) - sum(|non-cancelled payouts|).
    let pool = common::setup_test_db().await;
    let config = test_config();

    let a = register(&pool, "a", "wc-a@example.com", None).await;
    let b = register(&pool, "b", "wc-b@example.com", Some(&a.referral_code)).await;
    let package_id = common::seed_package(&pool, dec!(50_000)).await;

    order_ingest::create_order(
        &pool,
        b.id,
        OrderCreate {
            package_id,
            payment_method: "card".to_string(),
            payment_reference: None,
        },
        &config,
    )
    .await
    .unwrap();

    let payout = compensation_engine::services::payout::request(&pool, a.id, dec!(2_000), &config)
        .await
        .unwrap();
    compensation_engine::services::payout::approve(&pool, payout.id).await.unwrap();

    let a_after = PartnerRegistry::new(pool.clone()).get_by_id(a.id).await.unwrap();

    let approved_credits: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM ledger_entries WHERE partner_id = $1 AND status = 'approved' AND kind != 'payout'",
    )
    .bind(a.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let non_cancelled_payouts: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(-amount), 0) FROM ledger_entries WHERE partner_id = $1 AND kind = 'payout' AND status != 'cancelled'",
    )
    .bind(a.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(a_after.wallet_balance, approved_credits - non_cancelled_payouts);
}

#[tokio::test]
#[serial]
async fn cycle_free_referrer_chain_is_rejected_at_registration_time() {
    // Invariant 3, §8: the registry never lets a referral code point
    // back to a partner's own descendant, because referrer_id is only
    // ever set at creation time from an *existing* partner's code.
    let pool = common::setup_test_db().await;
    let a = register(&pool, "a", "cycle-a@example.com", None).await;
    let b = register(&pool, "b", "cycle-b@example.com", Some(&a.referral_code)).await;

    // There is no operation that lets b become a's referrer after the
    // fact, so the only way to probe this invariant is structurally:
    // a has no referrer, and b's referrer is a, not itself or a descendant.
    assert_eq!(a.referrer_id, None);
    assert_eq!(b.referrer_id, Some(a.id));
}
