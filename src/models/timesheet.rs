use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryMode {
    /// Manually typed line; counts toward the daily manual cap.
    Timesheet,
    /// Line derived from the time clock.
    Punch,
}

impl EntryMode {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EntryMode::Timesheet => "TIMESHEET",
            EntryMode::Punch => "PONTO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TIMESHEET" => Some(EntryMode::Timesheet),
            "PONTO" => Some(EntryMode::Punch),
            _ => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, EntryMode::Timesheet)
    }
}

/// Collaborator-axis classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollaboratorClass {
    Normal,
    Extra,
    Banked,
}

impl CollaboratorClass {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CollaboratorClass::Normal => "NORMAL",
            CollaboratorClass::Extra => "EXTRA",
            CollaboratorClass::Banked => "BANCO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NORMAL" => Some(CollaboratorClass::Normal),
            "EXTRA" => Some(CollaboratorClass::Extra),
            "BANCO" => Some(CollaboratorClass::Banked),
            _ => None,
        }
    }
}

/// Project-axis classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectClass {
    Normal,
    Extra,
}

impl ProjectClass {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProjectClass::Normal => "NORMAL",
            ProjectClass::Extra => "EXTRA",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NORMAL" => Some(ProjectClass::Normal),
            "EXTRA" => Some(ProjectClass::Extra),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimesheetEntry {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub task_id: Option<i64>,
    pub date: NaiveDate,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub hours: Decimal,
    pub mode: EntryMode,
    pub collaborator_class: CollaboratorClass,
    pub project_class: ProjectClass,
    pub cost_profile_snapshot_id: Option<i64>,
    pub cost_per_hour_snapshot: Option<Decimal>,
    pub price_per_hour_snapshot: Option<Decimal>,
    pub off_hours: bool,
    pub edit_reason: Option<String>,
    pub created_by: i64,
    pub updated_by: i64,
    pub created_at: String,
}

impl TimesheetEntry {
    /// hours × cost snapshot; entries without a snapshot cost nothing.
    pub fn cost(&self) -> Decimal {
        self.hours * self.cost_per_hour_snapshot.unwrap_or(Decimal::ZERO)
    }

    /// A manual line carrying an edit reason.
    pub fn is_correction(&self) -> bool {
        self.mode.is_manual()
            && self
                .edit_reason
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty())
    }
}
