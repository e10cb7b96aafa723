use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceStatus {
    Active,
    Expired,
    Cancelled,
}

impl InsuranceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceStatus::Active => "active",
            InsuranceStatus::Expired => "expired",
            InsuranceStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InsuranceAssignment {
    pub id: i64,
    pub partner_id: i64,
    pub rank: String,
    pub amount: Decimal,
    pub assigned_at: DateTime<Utc>,
    pub status: String,
}
