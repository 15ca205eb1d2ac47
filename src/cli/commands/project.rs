use crate::cli::commands::open_pool;
use crate::cli::parser::{Commands, ProjectCmd};
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::catalog::{CatalogLogic, ContractPrices};
use crate::db::catalog::{CatalogTable, NewProject, list_projects};
use crate::errors::AppResult;
use crate::models::lifecycle::ActivityState;
use crate::models::project::ProjectStatus;
use crate::ui::messages::{success, warning};
use crate::utils::decimal::{parse_decimal, parse_opt_decimal};
use crate::utils::formatting::{fmt2_opt, opt_text};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    let Commands::Project { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        ProjectCmd::Add {
            name,
            model,
            manager,
            client,
            cost_center,
            fee_type,
            fee,
        } => {
            let project = NewProject {
                name,
                client: client.as_deref(),
                cost_center: cost_center.as_deref(),
                billing_model: (*model).into(),
                fee_type: fee_type.map(Into::into),
                fee_amount: parse_opt_decimal("fee", fee.as_deref())?,
                manager_id: *manager,
            };
            let id = CatalogLogic::add_project(&mut pool, ctx, &project)?;
            success(format!(
                "Project #{id} '{name}' created ({})",
                project.billing_model.to_db_str()
            ));
        }
        ProjectCmd::List => {
            let projects = list_projects(&pool.conn)?;
            if projects.is_empty() {
                warning("No projects.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                "id", "name", "client", "model", "status", "fee_type", "fee", "manager", "state",
            ]);
            for p in projects {
                table.add_row(vec![
                    p.id.to_string(),
                    p.name,
                    opt_text(p.client.as_deref()),
                    p.billing_model.to_db_str().to_string(),
                    p.status.to_db_str().to_string(),
                    opt_text(p.fee_type.map(|f| f.to_db_str())),
                    fmt2_opt(p.fee_amount),
                    p.manager_id.to_string(),
                    p.lifecycle.state.as_str().to_string(),
                ]);
            }
            print!("{}", table.render());
        }
        ProjectCmd::Status { id, status } => {
            let status: ProjectStatus = (*status).into();
            CatalogLogic::set_project_status(&mut pool, ctx, *id, status)?;
            success(format!("Project #{id} status set to {}", status.to_db_str()));
        }
        ProjectCmd::Deactivate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Projects, *id, ActivityState::Inactive)?;
            success(format!("Project #{id} deactivated"));
        }
        ProjectCmd::Activate { id } => {
            CatalogLogic::set_state(&mut pool, ctx, CatalogTable::Projects, *id, ActivityState::Active)?;
            success(format!("Project #{id} reactivated"));
        }
        ProjectCmd::Estimate {
            id,
            profile,
            hours,
            price,
        } => {
            let est = CatalogLogic::add_estimate(
                &mut pool,
                ctx,
                *id,
                *profile,
                parse_decimal("hours", hours)?,
                parse_decimal("price", price)?,
            )?;
            success(format!("Estimate #{est} added to project #{id}"));
        }
        ProjectCmd::Contract {
            id,
            month,
            profile,
            hours,
            price,
            price_additional,
            price_off_hours,
            price_overtime,
        } => {
            let prices = ContractPrices {
                contracted: parse_decimal("price", price)?,
                additional: parse_decimal("additional price", price_additional)?,
                off_hours: parse_decimal("off-hours price", price_off_hours)?,
                overtime: parse_decimal("overtime price", price_overtime)?,
            };
            let row = CatalogLogic::add_contract(
                &mut pool,
                ctx,
                *id,
                month,
                *profile,
                parse_decimal("hours", hours)?,
                prices,
            )?;
            success(format!("Contract #{row} ({month}) added to project #{id}"));
        }
        ProjectCmd::Installment {
            id,
            due,
            amount,
            kind,
            description,
        } => {
            let inst = CatalogLogic::add_installment(
                &mut pool,
                ctx,
                *id,
                (*kind).into(),
                description.as_deref(),
                due,
                parse_decimal("amount", amount)?,
            )?;
            success(format!("Installment #{inst} due {due} added to project #{id}"));
        }
    }

    Ok(())
}
