use crate::config::Config;
use crate::context::RequestContext;
use crate::core::billing::BillingStrategies;
use crate::core::classifier::{ClassificationRequest, classify};
use crate::db::catalog::{effective_hourly_cost, load_project_book, load_task, load_user};
use crate::db::ledger::{NewEntry, insert_entry, load_entry, manual_hours_for_day, project_hours_between};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::timesheet::{CollaboratorClass, EntryMode, ProjectClass, TimesheetEntry};
use crate::utils::time::hours_between;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

/// Caller input for one timesheet line.
#[derive(Debug, Clone)]
pub struct TimesheetDraft {
    /// Falls back to the acting user of the request context.
    pub user_id: Option<i64>,
    pub project_id: i64,
    pub task_id: Option<i64>,
    pub date: NaiveDate,
    pub hours: Option<Decimal>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub mode: EntryMode,
    pub collaborator_class: Option<CollaboratorClass>,
    pub project_class: Option<ProjectClass>,
    pub off_hours: bool,
    pub edit_reason: Option<String>,
}

impl TimesheetDraft {
    pub fn new(project_id: i64, date: NaiveDate) -> Self {
        Self {
            user_id: None,
            project_id,
            task_id: None,
            date,
            hours: None,
            start: None,
            end: None,
            mode: EntryMode::Timesheet,
            collaborator_class: None,
            project_class: None,
            off_hours: false,
            edit_reason: None,
        }
    }

    /// Explicit hours win; otherwise the start/end span, rounded to 2 places.
    pub fn resolve_hours(&self, cfg: &Config) -> AppResult<Decimal> {
        let hours = match (self.hours, self.start, self.end) {
            (Some(h), _, _) => h,
            (None, Some(start), Some(end)) => {
                if end <= start {
                    return Err(AppError::validation(format!(
                        "end {} must be after start {}",
                        end.format("%H:%M"),
                        start.format("%H:%M")
                    )));
                }
                hours_between(start, end)
            }
            _ => {
                return Err(AppError::validation(
                    "either hours or both start and end are required",
                ));
            }
        };

        if hours <= Decimal::ZERO {
            return Err(AppError::validation(format!("hours must be positive, got {hours}")));
        }
        if hours > cfg.max_entry_hours {
            return Err(AppError::validation(format!(
                "{hours} h exceeds the {} h limit for one entry",
                cfg.max_entry_hours
            )));
        }
        Ok(hours)
    }
}

/// High-level business logic for the `timesheet` command.
pub struct TimesheetLogic;

impl TimesheetLogic {
    /// Validate, classify and append one timesheet line.
    ///
    /// The manual-hours check and the insert run under one write-locking
    /// transaction, so concurrent submissions for the same user and day
    /// cannot both slip under the daily cap.
    pub fn record(
        pool: &mut DbPool,
        cfg: &Config,
        ctx: &RequestContext,
        strategies: &BillingStrategies,
        draft: &TimesheetDraft,
    ) -> AppResult<TimesheetEntry> {
        let user_id = draft
            .user_id
            .or(ctx.actor_id)
            .ok_or_else(|| AppError::validation("no user given and no acting user"))?;

        let hours = draft.resolve_hours(cfg)?;

        let tx = pool.write_tx()?;

        let user = load_user(&tx, user_id)?
            .ok_or_else(|| AppError::rule(format!("unknown user {user_id}")))?;
        if !user.lifecycle.is_active() {
            return Err(AppError::rule(format!("user {user_id} is inactive")));
        }

        let book = load_project_book(&tx, draft.project_id)?
            .ok_or_else(|| AppError::not_found(format!("project {}", draft.project_id)))?;

        if let Some(tid) = draft.task_id {
            match load_task(&tx, tid)? {
                Some(task) if task.project_id == draft.project_id => {}
                _ => {
                    return Err(AppError::not_found(format!(
                        "task {tid} in project {}",
                        draft.project_id
                    )));
                }
            }
        }

        // every new line counts against the manual hours already on the day
        let existing = manual_hours_for_day(&tx, user_id, draft.date)?;
        if existing + hours > cfg.daily_manual_cap_hours {
            return Err(AppError::rule(format!(
                "daily manual-entry cap exceeded: {existing} h already recorded on {}, \
                 {hours} h more would pass {} h",
                draft.date, cfg.daily_manual_cap_hours
            )));
        }

        let strategy = strategies.for_model(book.project.billing_model);
        let scope = strategy.threshold_scope(draft.date);
        let realized_before = project_hours_between(&tx, draft.project_id, scope.from, scope.to)?;
        let effective_cost = effective_hourly_cost(&tx, &user)?;

        let request = ClassificationRequest {
            collaborator_class: draft.collaborator_class,
            project_class: draft.project_class,
            off_hours: draft.off_hours,
        };
        let class = classify(
            &request,
            &book,
            strategy,
            draft.date,
            hours,
            realized_before,
            &user,
            effective_cost,
        );

        let actor = ctx.actor_id.unwrap_or(user_id);
        let new_entry = NewEntry {
            user_id,
            project_id: draft.project_id,
            task_id: draft.task_id,
            date: draft.date,
            start: draft.start,
            end: draft.end,
            hours,
            mode: draft.mode,
            collaborator_class: class.collaborator_class,
            project_class: class.project_class,
            cost_profile_snapshot_id: class.cost_profile_snapshot_id,
            cost_per_hour_snapshot: class.cost_per_hour_snapshot,
            off_hours: class.off_hours,
            edit_reason: draft
                .edit_reason
                .clone()
                .filter(|r| !r.trim().is_empty()),
            created_by: actor,
            updated_by: actor,
        };

        let id = insert_entry(&tx, &new_entry)?;
        audit(
            &tx,
            ctx,
            "timesheet",
            &format!("user:{user_id}"),
            &format!(
                "#{id} {} h on {} project {} ({} / {})",
                hours,
                draft.date,
                draft.project_id,
                class.collaborator_class.to_db_str(),
                class.project_class.to_db_str()
            ),
        )?;

        let entry = load_entry(&tx, id)?
            .ok_or_else(|| AppError::not_found(format!("timesheet entry {id}")))?;

        tx.commit()?;
        Ok(entry)
    }
}
