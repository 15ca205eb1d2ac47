use super::lifecycle::Lifecycle;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CostProfile {
    pub id: i64,
    pub name: String,
    pub hourly_cost: Decimal,
    pub lifecycle: Lifecycle,
}
