use super::lifecycle::Lifecycle;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Admin,
    Manager,
    Collaborator,
}

impl Role {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "GESTOR",
            Role::Collaborator => "COLABORADOR",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "GESTOR" => Some(Role::Manager),
            "COLABORADOR" => Some(Role::Collaborator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub cost_profile_id: Option<i64>,
    pub hourly_cost: Option<Decimal>,
    pub weekly_hours: Decimal,
    pub lifecycle: Lifecycle,
}

impl User {
    /// Direct override wins over the profile rate; `profile_rate` is the
    /// profile's current rate, looked up by the caller at time of use.
    pub fn effective_hourly_cost(&self, profile_rate: Option<Decimal>) -> Option<Decimal> {
        self.hourly_cost.or(profile_rate)
    }
}
