//! Soft-delete state machine shared by the long-lived catalog entities.
//!
//! `Active → Inactive → Active`; every transition carries the timestamp it
//! happened at, and the caller writes it to the audit log.

use crate::errors::{AppError, AppResult};
use chrono::Local;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityState {
    Active,
    Inactive,
}

impl ActivityState {
    pub fn from_flag(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lifecycle {
    pub state: ActivityState,
    /// RFC 3339 timestamp of the last transition (or creation).
    pub changed_at: String,
}

impl Lifecycle {
    pub fn created() -> Self {
        Self {
            state: ActivityState::Active,
            changed_at: Local::now().to_rfc3339(),
        }
    }

    pub fn restore(active: bool, changed_at: String) -> Self {
        Self {
            state: ActivityState::from_flag(active),
            changed_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Apply a transition towards `target`, rejecting no-op transitions.
    pub fn transition(&self, target: ActivityState) -> AppResult<Lifecycle> {
        if self.state == target {
            return Err(AppError::rule(format!("already {}", target.as_str())));
        }
        Ok(Lifecycle {
            state: target,
            changed_at: Local::now().to_rfc3339(),
        })
    }
}
