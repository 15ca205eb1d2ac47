use rust_decimal::Decimal;
use serde::Serialize;

/// Signed credit (+) or debit (−) against a collaborator's banked hours.
#[derive(Debug, Clone, Serialize)]
pub struct BankedHoursMovement {
    pub id: i64,
    pub user_id: i64,
    pub hours: Decimal,
    pub note: Option<String>,
    pub created_at: String,
}
