//! Partner Registry (C1). Owns partner identity and the aggregate
//! counters that every other component reads or mutates.

use crate::error::{AppError, AppResult};
use crate::models::Partner;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

/// Read-only lookups run outside any particular transaction, backed
/// directly by the pool, matching the teacher's `ChatDatabaseService`
/// shape (a thin struct wrapping `PgPool`).
#[derive(Clone)]
pub struct PartnerRegistry {
    pool: PgPool,
}

impl PartnerRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Partner> {
        sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("partner {id}")))
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Partner> {
        sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("partner with email {email}")))
    }

    pub async fn get_by_referral_code(&self, code: &str) -> AppResult<Option<Partner>> {
        let partner = sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE referral_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(partner)
    }

    /// Generates a collision-free 8-char referral code (§4.1). Codes are
    /// uppercase alphanumeric, short enough to hand out in a UI but wide
    /// enough (36^8) that retries are a theoretical, not practical, concern.
    async fn generate_referral_code(&self) -> AppResult<String> {
        const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        loop {
            let code: String = {
                let mut rng = rand::thread_rng();
                (0..8)
                    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                    .collect()
            };
            if self.get_by_referral_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
    }

    /// Registers a new partner (§4.1, §6). Rejects an unknown referrer
    /// code with `Validation`, matching the original's `create_user`.
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        referrer_code: Option<&str>,
    ) -> AppResult<Partner> {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM partners WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Validation("email already registered".to_string()));
        }

        let referrer_id = match referrer_code {
            Some(code) => {
                let referrer = self
                    .get_by_referral_code(code)
                    .await?
                    .ok_or_else(|| AppError::Validation("unknown referral code".to_string()))?;
                Some(referrer.id)
            }
            None => None,
        };

        let referral_code = self.generate_referral_code().await?;

        let partner = sqlx::query_as::<_, Partner>(
            r#"
            INSERT INTO partners (referrer_id, full_name, email, referral_code, role, rank)
            VALUES ($1, $2, $3, $4, 'partner', 'starter')
            RETURNING *
            "#,
        )
        .bind(referrer_id)
        .bind(full_name)
        .bind(email)
        .bind(&referral_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(partner)
    }
}

/// Mutating operations that must happen inside the caller's transaction
/// (§4.1: "All mutating operations require a transaction handle from C3").
/// `FOR UPDATE` row locks are taken up front by Order Ingest in
/// ascending-id order (§4.5, §5); these helpers assume the row is
/// already locked and simply apply the delta.
pub async fn lock_partners_for_update(
    tx: &mut Transaction<'_, Postgres>,
    mut ids: Vec<i64>,
) -> AppResult<Vec<Partner>> {
    ids.sort_unstable();
    ids.dedup();
    let mut partners = Vec::with_capacity(ids.len());
    for id in ids {
        let partner = sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("partner {id}")))?;
        partners.push(partner);
    }
    Ok(partners)
}

pub async fn increment_direct(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    units: i64,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE partners
        SET direct_sales_units = direct_sales_units + $2, last_sale_date = NOW()
        WHERE id = $1
        "#,
    )
    .bind(partner_id)
    .bind(units)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn increment_team(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    units: i64,
) -> AppResult<()> {
    sqlx::query("UPDATE partners SET team_sales_units = team_sales_units + $2 WHERE id = $1")
        .bind(partner_id)
        .bind(units)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Adds `amount` to wallet and total earnings (credits, §3). Never
/// called outside the Ledger.
pub async fn credit(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    amount: Decimal,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE partners
        SET wallet_balance = wallet_balance + $2, total_earnings = total_earnings + $2
        WHERE id = $1
        "#,
    )
    .bind(partner_id)
    .bind(amount)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Subtracts `amount` from the wallet only (reservation/refund path).
/// Fails with `InsufficientFunds` rather than letting the balance go
/// negative (invariant in §3/§4.1).
pub async fn debit(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    amount: Decimal,
) -> AppResult<()> {
    let rows = sqlx::query(
        r#"
        UPDATE partners
        SET wallet_balance = wallet_balance - $2
        WHERE id = $1 AND wallet_balance >= $2
        "#,
    )
    .bind(partner_id)
    .bind(amount)
    .execute(&mut **tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(AppError::InsufficientFunds);
    }
    Ok(())
}

pub async fn set_rank(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    rank: &str,
) -> AppResult<()> {
    sqlx::query("UPDATE partners SET rank = $2 WHERE id = $1")
        .bind(partner_id)
        .bind(rank)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn set_insurance(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    amount: Decimal,
) -> AppResult<()> {
    sqlx::query("UPDATE partners SET insurance_amount = $2 WHERE id = $1")
        .bind(partner_id)
        .bind(amount)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
