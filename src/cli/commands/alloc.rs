use crate::cli::commands::open_pool;
use crate::cli::parser::{AllocCmd, Commands};
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::catalog::CatalogLogic;
use crate::db::catalog::{CatalogTable, list_allocations};
use crate::errors::AppResult;
use crate::models::lifecycle::ActivityState;
use crate::ui::messages::{success, warning};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    let Commands::Alloc { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        AllocCmd::Add {
            user,
            project,
            start,
            task,
        } => {
            let id = CatalogLogic::add_allocation(&mut pool, ctx, *user, *project, *task, start)?;
            success(format!(
                "Allocation #{id}: user #{user} on project #{project} from {start}"
            ));
        }
        AllocCmd::List { user } => {
            let allocations = list_allocations(&pool.conn, *user)?;
            if allocations.is_empty() {
                warning("No allocations.");
                return Ok(());
            }
            let mut table = Table::new(vec!["id", "user", "project", "task", "start", "state"]);
            for a in allocations {
                table.add_row(vec![
                    a.id.to_string(),
                    a.user_id.to_string(),
                    a.project_id.to_string(),
                    a.task_id
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "--".into()),
                    a.start_date.format("%Y-%m-%d").to_string(),
                    a.lifecycle.state.as_str().to_string(),
                ]);
            }
            print!("{}", table.render());
        }
        AllocCmd::Deactivate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Allocations, *id, ActivityState::Inactive)?;
            success(format!("Allocation #{id} deactivated"));
        }
        AllocCmd::Activate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Allocations, *id, ActivityState::Active)?;
            success(format!("Allocation #{id} reactivated"));
        }
    }

    Ok(())
}
