use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Partner {
    pub id: i64,
    pub referrer_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub referral_code: String,
    pub role: String,
    pub rank: String,
    pub direct_sales_units: i64,
    pub team_sales_units: i64,
    pub total_earnings: Decimal,
    pub wallet_balance: Decimal,
    pub insurance_amount: Decimal,
    pub last_sale_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn total_sales_units(&self) -> i64 {
        self.direct_sales_units + self.team_sales_units
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerRegistration {
    pub full_name: String,
    pub email: String,
    pub referrer_code: Option<String>,
}
