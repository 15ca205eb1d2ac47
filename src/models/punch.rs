use chrono::NaiveDate;
use serde::Serialize;

/// The four clock events of a standard working day, in their natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PunchType {
    Entrada,
    SaidaAlmoco,
    VoltaAlmoco,
    Saida,
}

impl PunchType {
    pub const EXPECTED: [PunchType; 4] = [
        PunchType::Entrada,
        PunchType::SaidaAlmoco,
        PunchType::VoltaAlmoco,
        PunchType::Saida,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PunchType::Entrada => "ENTRADA",
            PunchType::SaidaAlmoco => "SAIDA_ALMOCO",
            PunchType::VoltaAlmoco => "VOLTA_ALMOCO",
            PunchType::Saida => "SAIDA",
        }
    }

    /// Convert DB string → enum (also accepts lowercase input from the CLI)
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "ENTRADA" => Some(PunchType::Entrada),
            "SAIDA_ALMOCO" => Some(PunchType::SaidaAlmoco),
            "VOLTA_ALMOCO" => Some(PunchType::VoltaAlmoco),
            "SAIDA" => Some(PunchType::Saida),
            _ => None,
        }
    }

}

#[derive(Debug, Clone, Serialize)]
pub struct ClockPunch {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub kind: PunchType,
    pub project_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: String,
}
