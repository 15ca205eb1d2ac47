use super::lifecycle::Lifecycle;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub budget_hours: Decimal,
    pub lifecycle: Lifecycle,
}

/// Standing assignment of a collaborator to a project (capacity planning only).
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub task_id: Option<i64>,
    pub start_date: NaiveDate,
    pub lifecycle: Lifecycle,
}
