use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::punch::PunchLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    if let Commands::Punch {
        user,
        date,
        kind,
        project,
        note,
    } = cmd
    {
        let mut pool = open_pool(cfg)?;

        let punch = PunchLogic::record(
            &mut pool,
            cfg,
            ctx,
            *user,
            date,
            (*kind).into(),
            *project,
            note.as_deref(),
        )?;
        success(format!(
            "Punch #{} {} recorded for user #{} on {}",
            punch.id,
            punch.kind.to_db_str(),
            punch.user_id,
            punch.date
        ));

        let day: Vec<&str> = PunchLogic::day(&mut pool, *user, date)?
            .iter()
            .map(|p| p.kind.to_db_str())
            .collect();
        info(format!("Punches of the day: {}", day.join(" → ")));
    }

    Ok(())
}
