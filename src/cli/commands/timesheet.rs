use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::billing::BillingStrategies;
use crate::core::timesheet::{TimesheetDraft, TimesheetLogic};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::date::parse_date;
use crate::utils::decimal::parse_opt_decimal;
use crate::utils::fmt2;
use crate::utils::time::parse_optional_time;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    if let Commands::Timesheet {
        date,
        project,
        user,
        task,
        hours,
        start,
        end,
        mode,
        collab_class,
        project_class,
        off_hours,
        edit_reason,
    } = cmd
    {
        let mut draft = TimesheetDraft::new(*project, parse_date(date)?);
        draft.user_id = *user;
        draft.task_id = *task;
        draft.hours = parse_opt_decimal("hours", hours.as_deref())?;
        draft.start = parse_optional_time(start.as_deref())?;
        draft.end = parse_optional_time(end.as_deref())?;
        draft.mode = (*mode).into();
        draft.collaborator_class = collab_class.map(Into::into);
        draft.project_class = project_class.map(Into::into);
        draft.off_hours = *off_hours;
        draft.edit_reason = edit_reason.clone();

        let mut pool = open_pool(cfg)?;
        let strategies = BillingStrategies::default();
        let entry = TimesheetLogic::record(&mut pool, cfg, ctx, &strategies, &draft)?;

        success(format!(
            "Entry #{} recorded: {} h on {} for user #{} in project #{}",
            entry.id,
            fmt2(entry.hours),
            entry.date,
            entry.user_id,
            entry.project_id
        ));
        info(format!(
            "Classified as {} / {}{}",
            entry.collaborator_class.to_db_str(),
            entry.project_class.to_db_str(),
            if entry.off_hours { " (off-hours)" } else { "" }
        ));
    }

    Ok(())
}
