//! Validated writes on the long-lived catalog.

use crate::context::RequestContext;
use crate::db::catalog::{
    self, CatalogTable, NewContract, NewProject, NewUser, contract_exists, email_exists,
    load_cost_profile, load_lifecycle, load_project, load_task, load_user, store_lifecycle,
};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::competence::Competence;
use crate::models::lifecycle::{ActivityState, Lifecycle};
use crate::models::project::{BillingModel, InstallmentType, Project, ProjectStatus};
use crate::utils::date::parse_date;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Price tiers of a monthly allocation contract row.
#[derive(Debug, Clone, Copy)]
pub struct ContractPrices {
    pub contracted: Decimal,
    pub additional: Decimal,
    pub off_hours: Decimal,
    pub overtime: Decimal,
}

pub struct CatalogLogic;

fn non_negative(label: &str, value: Decimal) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!("{label} must be >= 0, got {value}")));
    }
    Ok(())
}

fn non_blank<'a>(label: &str, value: &'a str) -> AppResult<&'a str> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::validation(format!("{label} must not be empty")));
    }
    Ok(v)
}

fn require_project(conn: &Connection, id: i64) -> AppResult<Project> {
    load_project(conn, id)?.ok_or_else(|| AppError::not_found(format!("project {id}")))
}

fn require_model(project: &Project, model: BillingModel, what: &str) -> AppResult<()> {
    if project.billing_model != model {
        return Err(AppError::rule(format!(
            "{what} only apply to {} projects; project {} is {}",
            model.to_db_str(),
            project.id,
            project.billing_model.to_db_str()
        )));
    }
    Ok(())
}

impl CatalogLogic {
    pub fn add_cost_profile(
        pool: &mut DbPool,
        ctx: &RequestContext,
        name: &str,
        hourly_cost: Decimal,
    ) -> AppResult<i64> {
        let name = non_blank("profile name", name)?;
        non_negative("hourly cost", hourly_cost)?;

        let id = catalog::insert_cost_profile(&pool.conn, name, hourly_cost)?;
        audit(&pool.conn, ctx, "add", &format!("profile:{id}"), &format!("{name} at {hourly_cost}/h"))?;
        Ok(id)
    }

    pub fn add_user(pool: &mut DbPool, ctx: &RequestContext, user: &NewUser) -> AppResult<i64> {
        non_blank("user name", user.name)?;
        let email = non_blank("email", user.email)?;
        if !email.contains('@') {
            return Err(AppError::validation(format!("invalid email '{email}'")));
        }
        if user.weekly_hours < Decimal::ONE || user.weekly_hours > Decimal::from(60) {
            return Err(AppError::validation(format!(
                "weekly workload must be between 1 and 60 hours, got {}",
                user.weekly_hours
            )));
        }
        if let Some(cost) = user.hourly_cost {
            non_negative("hourly cost", cost)?;
        }

        let tx = pool.write_tx()?;
        if email_exists(&tx, email)? {
            return Err(AppError::rule(format!("email '{email}' is already registered")));
        }
        if let Some(pid) = user.cost_profile_id
            && load_cost_profile(&tx, pid)?.is_none()
        {
            return Err(AppError::not_found(format!("cost profile {pid}")));
        }

        let id = catalog::insert_user(&tx, user)?;
        audit(
            &tx,
            ctx,
            "add",
            &format!("user:{id}"),
            &format!("{} <{email}> as {}", user.name, user.role.to_db_str()),
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn add_project(
        pool: &mut DbPool,
        ctx: &RequestContext,
        project: &NewProject,
    ) -> AppResult<i64> {
        non_blank("project name", project.name)?;
        if let Some(fee) = project.fee_amount {
            non_negative("fee amount", fee)?;
        }
        if project.billing_model == BillingModel::Allocation
            && (project.fee_type.is_some() || project.fee_amount.is_some())
        {
            return Err(AppError::validation(
                "fee type and amount only apply to fixed-scope projects",
            ));
        }

        let tx = pool.write_tx()?;
        if load_user(&tx, project.manager_id)?.is_none() {
            return Err(AppError::rule(format!("unknown manager {}", project.manager_id)));
        }

        let id = catalog::insert_project(&tx, project)?;
        audit(
            &tx,
            ctx,
            "add",
            &format!("project:{id}"),
            &format!("{} ({})", project.name, project.billing_model.to_db_str()),
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn set_project_status(
        pool: &mut DbPool,
        ctx: &RequestContext,
        project_id: i64,
        status: ProjectStatus,
    ) -> AppResult<()> {
        catalog::update_project_status(&pool.conn, project_id, status)?;
        audit(
            &pool.conn,
            ctx,
            "edit",
            &format!("project:{project_id}"),
            &format!("status → {}", status.to_db_str()),
        )
    }

    /// Add an estimate line; the cost snapshot is the profile's rate now.
    pub fn add_estimate(
        pool: &mut DbPool,
        ctx: &RequestContext,
        project_id: i64,
        cost_profile_id: i64,
        estimated_hours: Decimal,
        price_per_hour: Decimal,
    ) -> AppResult<i64> {
        non_negative("estimated hours", estimated_hours)?;
        non_negative("price per hour", price_per_hour)?;

        let tx = pool.write_tx()?;
        let project = require_project(&tx, project_id)?;
        require_model(&project, BillingModel::FixedScope, "estimates")?;
        let profile = load_cost_profile(&tx, cost_profile_id)?
            .ok_or_else(|| AppError::not_found(format!("cost profile {cost_profile_id}")))?;

        let id = catalog::insert_estimate(
            &tx,
            project_id,
            cost_profile_id,
            estimated_hours,
            profile.hourly_cost,
            price_per_hour,
        )?;
        audit(
            &tx,
            ctx,
            "add",
            &format!("project:{project_id}"),
            &format!("estimate #{id}: {estimated_hours} h of {}", profile.name),
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// Add a monthly contract row; one per (project, month, profile).
    pub fn add_contract(
        pool: &mut DbPool,
        ctx: &RequestContext,
        project_id: i64,
        competence: &str,
        cost_profile_id: i64,
        contracted_hours: Decimal,
        prices: ContractPrices,
    ) -> AppResult<i64> {
        let competence = Competence::parse(competence)?;
        non_negative("contracted hours", contracted_hours)?;
        non_negative("contracted price", prices.contracted)?;
        non_negative("additional price", prices.additional)?;
        non_negative("off-hours price", prices.off_hours)?;
        non_negative("overtime price", prices.overtime)?;

        let tx = pool.write_tx()?;
        let project = require_project(&tx, project_id)?;
        require_model(&project, BillingModel::Allocation, "monthly contracts")?;
        let profile = load_cost_profile(&tx, cost_profile_id)?
            .ok_or_else(|| AppError::not_found(format!("cost profile {cost_profile_id}")))?;
        if contract_exists(&tx, project_id, competence, cost_profile_id)? {
            return Err(AppError::rule(format!(
                "project {project_id} already has a {competence} contract for profile {cost_profile_id}"
            )));
        }

        let id = catalog::insert_contract(
            &tx,
            &NewContract {
                project_id,
                competence,
                cost_profile_id,
                contracted_hours,
                price_contracted: prices.contracted,
                price_additional: prices.additional,
                price_off_hours: prices.off_hours,
                price_overtime: prices.overtime,
                cost_per_hour: profile.hourly_cost,
            },
        )?;
        audit(
            &tx,
            ctx,
            "add",
            &format!("project:{project_id}"),
            &format!("contract #{id}: {competence} {contracted_hours} h of {}", profile.name),
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn add_installment(
        pool: &mut DbPool,
        ctx: &RequestContext,
        project_id: i64,
        kind: InstallmentType,
        description: Option<&str>,
        due_date: &str,
        amount: Decimal,
    ) -> AppResult<i64> {
        let due_date = parse_date(due_date)?;
        non_negative("installment amount", amount)?;

        let tx = pool.write_tx()?;
        let project = require_project(&tx, project_id)?;
        require_model(&project, BillingModel::FixedScope, "fee installments")?;

        let id = catalog::insert_installment(&tx, project_id, kind, description, due_date, amount)?;
        audit(
            &tx,
            ctx,
            "add",
            &format!("project:{project_id}"),
            &format!("installment #{id}: {amount} due {due_date}"),
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn add_task(
        pool: &mut DbPool,
        ctx: &RequestContext,
        project_id: i64,
        name: &str,
        budget_hours: Decimal,
    ) -> AppResult<i64> {
        let name = non_blank("task name", name)?;
        non_negative("budget hours", budget_hours)?;

        let tx = pool.write_tx()?;
        require_project(&tx, project_id)?;
        let id = catalog::insert_task(&tx, project_id, name, budget_hours)?;
        audit(&tx, ctx, "add", &format!("task:{id}"), &format!("{name} in project {project_id}"))?;
        tx.commit()?;
        Ok(id)
    }

    pub fn add_allocation(
        pool: &mut DbPool,
        ctx: &RequestContext,
        user_id: i64,
        project_id: i64,
        task_id: Option<i64>,
        start_date: &str,
    ) -> AppResult<i64> {
        let start_date = parse_date(start_date)?;

        let tx = pool.write_tx()?;
        if load_user(&tx, user_id)?.is_none() {
            return Err(AppError::rule(format!("unknown user {user_id}")));
        }
        require_project(&tx, project_id)?;
        if let Some(tid) = task_id {
            match load_task(&tx, tid)? {
                Some(t) if t.project_id == project_id => {}
                _ => return Err(AppError::not_found(format!("task {tid} in project {project_id}"))),
            }
        }

        let id = catalog::insert_allocation(&tx, user_id, project_id, task_id, start_date)?;
        audit(
            &tx,
            ctx,
            "add",
            &format!("allocation:{id}"),
            &format!("user {user_id} on project {project_id} from {start_date}"),
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// Move a catalog record to `target`; a transition to the current state
    /// is rejected.
    pub fn set_state(
        pool: &mut DbPool,
        ctx: &RequestContext,
        table: CatalogTable,
        id: i64,
        target: ActivityState,
    ) -> AppResult<Lifecycle> {
        let tx = pool.write_tx()?;
        let current = load_lifecycle(&tx, table, id)?
            .ok_or_else(|| AppError::not_found(format!("{} {id}", table.label())))?;

        let next = current.transition(target)?;
        store_lifecycle(&tx, table, id, &next)?;
        audit(
            &tx,
            ctx,
            if target.is_active() { "activate" } else { "deactivate" },
            &format!("{}:{id}", table.table()),
            &format!("{} → {} at {}", current.state.as_str(), next.state.as_str(), next.changed_at),
        )?;
        tx.commit()?;
        Ok(next)
    }
}
