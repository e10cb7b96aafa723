//! Scheduler (C9). Fires the Weekly Settler at a fixed weekly slot,
//! coalescing catch-up to at most one run and preventing concurrent
//! firings with a named Postgres advisory lock (§4.9, §9).

use crate::config::AppConfig;
use crate::services::weekly_settler;
use chrono::{Datelike, NaiveDate, Timelike, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, Duration};

/// Advisory lock key. Any stable, application-specific `i64` works;
/// this one has no meaning beyond being unlikely to collide with
/// another subsystem's lock usage on the same database.
const SETTLER_LOCK_KEY: i64 = 0x434f4d50454e53; // "COMPENS" in ASCII, truncated to 7 bytes

const POLL_INTERVAL: Duration = Duration::from_secs(60);

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// Signals the scheduler task to stop starting new runs. An
    /// in-flight Settler pass is allowed to finish (§4.9).
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawns the scheduler as a background tokio task. Single-node
/// deployments get an additional in-process mutex short-circuit on top
/// of the DB advisory lock, avoiding a wasted round trip when this is
/// the only instance (§9).
pub fn spawn(pool: PgPool, config: AppConfig) -> SchedulerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let local_guard = Arc::new(Mutex::new(()));

    tokio::spawn(async move {
        let mut ticker = interval(POLL_INTERVAL);
        let mut last_fired_slot: Option<NaiveDate> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }

                    let now = Utc::now();
                    let slot = now.date_naive();
                    let is_target_slot = now.weekday().num_days_from_sunday() == config.scheduler_day_of_week
                        && now.hour() == config.scheduler_hour;

                    if !is_target_slot || last_fired_slot == Some(slot) {
                        continue;
                    }

                    let _local = local_guard.lock().await;
                    match try_fire(&pool).await {
                        Ok(Some(stats)) => {
                            last_fired_slot = Some(slot);
                            tracing::info!(
                                partners_processed = stats.partners_processed,
                                total_credited = %stats.total_credited,
                                "weekly settlement completed"
                            );
                        }
                        Ok(None) => {
                            tracing::debug!("weekly settlement skipped: another instance holds the lock");
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "weekly settlement run failed");
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("scheduler stopped");
    });

    SchedulerHandle { shutdown_tx }
}

/// Attempts to acquire the advisory lock and run the Settler. Returns
/// `Ok(None)` if another instance already holds the lock this tick.
async fn try_fire(pool: &PgPool) -> crate::error::AppResult<Option<weekly_settler::SettlementStats>> {
    let mut conn = pool.acquire().await?;

    let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
        .bind(SETTLER_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await?;

    if !acquired {
        return Ok(None);
    }

    let result = weekly_settler::run_once(pool).await;

    let _: bool = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
        .bind(SETTLER_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await?;

    result.map(Some)
}
