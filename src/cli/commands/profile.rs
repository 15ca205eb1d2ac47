use crate::cli::commands::open_pool;
use crate::cli::parser::{Commands, ProfileCmd};
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::catalog::CatalogLogic;
use crate::db::catalog::{CatalogTable, list_cost_profiles};
use crate::errors::AppResult;
use crate::models::lifecycle::ActivityState;
use crate::ui::messages::{success, warning};
use crate::utils::decimal::parse_decimal;
use crate::utils::fmt2;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    let Commands::Profile { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        ProfileCmd::Add { name, cost } => {
            let cost = parse_decimal("hourly cost", cost)?;
            let id = CatalogLogic::add_cost_profile(&mut pool, ctx, name, cost)?;
            success(format!("Cost profile #{id} '{name}' created ({}/h)", fmt2(cost)));
        }
        ProfileCmd::List => {
            let profiles = list_cost_profiles(&pool.conn)?;
            if profiles.is_empty() {
                warning("No cost profiles.");
                return Ok(());
            }
            let mut table = Table::new(vec!["id", "name", "hourly_cost", "state"]);
            for p in profiles {
                table.add_row(vec![
                    p.id.to_string(),
                    p.name,
                    fmt2(p.hourly_cost),
                    p.lifecycle.state.as_str().to_string(),
                ]);
            }
            print!("{}", table.render());
        }
        ProfileCmd::Deactivate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::CostProfiles, *id, ActivityState::Inactive)?;
            success(format!("Cost profile #{id} deactivated"));
        }
        ProfileCmd::Activate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::CostProfiles, *id, ActivityState::Active)?;
            success(format!("Cost profile #{id} reactivated"));
        }
    }

    Ok(())
}
