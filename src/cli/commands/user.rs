use crate::cli::commands::open_pool;
use crate::cli::parser::{Commands, UserCmd};
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::catalog::CatalogLogic;
use crate::db::catalog::{CatalogTable, NewUser, list_users};
use crate::errors::AppResult;
use crate::models::lifecycle::ActivityState;
use crate::ui::messages::{success, warning};
use crate::utils::decimal::{parse_decimal, parse_opt_decimal};
use crate::utils::fmt2;
use crate::utils::formatting::fmt2_opt;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    let Commands::User { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        UserCmd::Add {
            name,
            email,
            role,
            profile,
            cost,
            weekly,
        } => {
            let new_user = NewUser {
                name,
                email,
                password_hash: None,
                role: (*role).into(),
                cost_profile_id: *profile,
                hourly_cost: parse_opt_decimal("hourly cost", cost.as_deref())?,
                weekly_hours: parse_decimal("weekly hours", weekly)?,
            };
            let id = CatalogLogic::add_user(&mut pool, ctx, &new_user)?;
            success(format!("User #{id} '{name}' <{email}> created"));
        }
        UserCmd::List => {
            let users = list_users(&pool.conn)?;
            if users.is_empty() {
                warning("No users.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                "id", "name", "email", "role", "profile", "hourly_cost", "weekly", "state",
            ]);
            for u in users {
                table.add_row(vec![
                    u.id.to_string(),
                    u.name,
                    u.email,
                    u.role.to_db_str().to_string(),
                    u.cost_profile_id
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "--".into()),
                    fmt2_opt(u.hourly_cost),
                    fmt2(u.weekly_hours),
                    u.lifecycle.state.as_str().to_string(),
                ]);
            }
            print!("{}", table.render());
        }
        UserCmd::Deactivate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Users, *id, ActivityState::Inactive)?;
            success(format!("User #{id} deactivated"));
        }
        UserCmd::Activate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Users, *id, ActivityState::Active)?;
            success(format!("User #{id} reactivated"));
        }
    }

    Ok(())
}
