//! Write-time classification of timesheet entries.

use crate::core::billing::BillingStrategy;
use crate::models::project::ProjectBook;
use crate::models::timesheet::{CollaboratorClass, ProjectClass};
use crate::models::user::User;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// What the caller asked for; anything left `None` is derived.
#[derive(Debug, Clone, Default)]
pub struct ClassificationRequest {
    pub collaborator_class: Option<CollaboratorClass>,
    pub project_class: Option<ProjectClass>,
    pub off_hours: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub collaborator_class: CollaboratorClass,
    pub project_class: ProjectClass,
    pub off_hours: bool,
    pub cost_profile_snapshot_id: Option<i64>,
    pub cost_per_hour_snapshot: Option<Decimal>,
}

/// Classify a new entry of `hours` on `date`.
///
/// `realized_before` are the project's hours already recorded inside the
/// strategy's threshold scope; `effective_cost` is the user's hourly cost
/// resolved right now.
#[allow(clippy::too_many_arguments)]
pub fn classify(
    request: &ClassificationRequest,
    book: &ProjectBook,
    strategy: &dyn BillingStrategy,
    date: NaiveDate,
    hours: Decimal,
    realized_before: Decimal,
    user: &User,
    effective_cost: Option<Decimal>,
) -> Classification {
    let project_class = request.project_class.unwrap_or_else(|| {
        let threshold = strategy.extra_threshold(book, date);
        if threshold > Decimal::ZERO && realized_before + hours > threshold {
            ProjectClass::Extra
        } else {
            ProjectClass::Normal
        }
    });

    Classification {
        collaborator_class: request
            .collaborator_class
            .unwrap_or(CollaboratorClass::Normal),
        project_class,
        off_hours: request.off_hours,
        cost_profile_snapshot_id: user.cost_profile_id,
        cost_per_hour_snapshot: effective_cost,
    }
}
