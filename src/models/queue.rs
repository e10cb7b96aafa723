use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueuedCommissionStatus {
    Pending,
    Processed,
    Cancelled,
}

impl QueuedCommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueuedCommissionStatus::Pending => "pending",
            QueuedCommissionStatus::Processed => "processed",
            QueuedCommissionStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueuedCommission {
    pub id: i64,
    pub partner_id: i64,
    pub source_order_id: i64,
    pub level: i32,
    pub sales_units: i64,
    pub amount: Decimal,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// One partner's aggregated pending rows, as returned by
/// `drain_pending_grouped` (§4.4).
#[derive(Debug, Clone)]
pub struct PendingCommissionGroup {
    pub partner_id: i64,
    pub total_amount: Decimal,
    pub total_units: i64,
    pub row_count: i64,
    pub row_ids: Vec<i64>,
}
