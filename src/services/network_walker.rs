//! Network Walker (C2). Traverses upline chains with cycle protection.
//! `tiered_rate` itself lives in `crate::domain` since it's a pure
//! function shared with tests; this module is the stateful traversal.

use crate::error::AppResult;
use sqlx::{PgPool, Postgres, Transaction};

pub const DEFAULT_MAX_DEPTH: u32 = 10_000;

/// Returns the referrer chain starting at `partner_id`'s immediate
/// referrer, terminating at a root or a previously-seen id (§4.2).
/// Reads happen inside the caller's transaction so the upline's
/// `team_sales_units` is observed consistently with the rest of Order
/// Ingest.
pub async fn upline(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    max_depth: u32,
) -> AppResult<Vec<i64>> {
    let mut chain = Vec::new();
    let mut seen = std::collections::HashSet::new();
    seen.insert(partner_id);

    let mut current = partner_id;
    for _ in 0..max_depth {
        let referrer_id: Option<i64> =
            sqlx::query_scalar("SELECT referrer_id FROM partners WHERE id = $1")
                .bind(current)
                .fetch_optional(&mut **tx)
                .await?
                .flatten();

        let Some(referrer_id) = referrer_id else {
            break;
        };
        if !seen.insert(referrer_id) {
            break;
        }
        chain.push(referrer_id);
        current = referrer_id;
    }

    Ok(chain)
}

/// Same traversal outside a transaction, for read-only queries (e.g.
/// admin tooling) that don't need to participate in Order Ingest.
pub async fn upline_readonly(pool: &PgPool, partner_id: i64, max_depth: u32) -> AppResult<Vec<i64>> {
    let mut chain = Vec::new();
    let mut seen = std::collections::HashSet::new();
    seen.insert(partner_id);

    let mut current = partner_id;
    for _ in 0..max_depth {
        let referrer_id: Option<i64> =
            sqlx::query_scalar("SELECT referrer_id FROM partners WHERE id = $1")
                .bind(current)
                .fetch_optional(pool)
                .await?
                .flatten();

        let Some(referrer_id) = referrer_id else {
            break;
        };
        if !seen.insert(referrer_id) {
            break;
        }
        chain.push(referrer_id);
        current = referrer_id;
    }

    Ok(chain)
}
