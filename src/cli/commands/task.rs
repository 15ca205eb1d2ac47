use crate::cli::commands::open_pool;
use crate::cli::parser::{Commands, TaskCmd};
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::catalog::CatalogLogic;
use crate::db::catalog::{CatalogTable, list_tasks};
use crate::errors::AppResult;
use crate::models::lifecycle::ActivityState;
use crate::ui::messages::{success, warning};
use crate::utils::decimal::parse_decimal;
use crate::utils::fmt2;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    let Commands::Task { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        TaskCmd::Add {
            project,
            name,
            budget,
        } => {
            let id = CatalogLogic::add_task(
                &mut pool,
                ctx,
                *project,
                name,
                parse_decimal("budget hours", budget)?,
            )?;
            success(format!("Task #{id} '{name}' added to project #{project}"));
        }
        TaskCmd::List { project } => {
            let tasks = list_tasks(&pool.conn, *project)?;
            if tasks.is_empty() {
                warning("No tasks.");
                return Ok(());
            }
            let mut table = Table::new(vec!["id", "project", "name", "budget", "state"]);
            for t in tasks {
                table.add_row(vec![
                    t.id.to_string(),
                    t.project_id.to_string(),
                    t.name,
                    fmt2(t.budget_hours),
                    t.lifecycle.state.as_str().to_string(),
                ]);
            }
            print!("{}", table.render());
        }
        TaskCmd::Deactivate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Tasks, *id, ActivityState::Inactive)?;
            success(format!("Task #{id} deactivated"));
        }
        TaskCmd::Activate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Tasks, *id, ActivityState::Active)?;
            success(format!("Task #{id} reactivated"));
        }
    }

    Ok(())
}
