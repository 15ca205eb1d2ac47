//! Persistence for the long-lived catalog: cost profiles, users, projects,
//! tasks, allocations and the billing children of projects.

use crate::db::db_utils::{
    date_to_db, dec_to_db, get_bool, get_date, get_decimal, get_enum, get_opt_decimal,
    opt_dec_to_db,
};
use crate::errors::{AppError, AppResult};
use crate::models::competence::Competence;
use crate::models::cost_profile::CostProfile;
use crate::models::lifecycle::Lifecycle;
use crate::models::project::{
    BillingModel, EstimateProfile, FeeInstallment, FeeType, InstallmentType, MonthlyContract,
    Project, ProjectBook, ProjectStatus,
};
use crate::models::task::{Allocation, Task};
use crate::models::user::{Role, User};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

/// Catalog tables carrying a soft-delete lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    CostProfiles,
    Users,
    Projects,
    Tasks,
    Allocations,
}

impl CatalogTable {
    pub fn table(&self) -> &'static str {
        match self {
            CatalogTable::CostProfiles => "cost_profiles",
            CatalogTable::Users => "users",
            CatalogTable::Projects => "projects",
            CatalogTable::Tasks => "tasks",
            CatalogTable::Allocations => "allocations",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatalogTable::CostProfiles => "cost profile",
            CatalogTable::Users => "user",
            CatalogTable::Projects => "project",
            CatalogTable::Tasks => "task",
            CatalogTable::Allocations => "allocation",
        }
    }
}

fn lifecycle_from_row(row: &Row) -> rusqlite::Result<Lifecycle> {
    Ok(Lifecycle::restore(
        get_bool(row, "active")?,
        row.get("status_changed_at")?,
    ))
}

pub fn load_lifecycle(conn: &Connection, table: CatalogTable, id: i64) -> AppResult<Option<Lifecycle>> {
    let sql = format!(
        "SELECT active, status_changed_at FROM {} WHERE id = ?1",
        table.table()
    );
    Ok(conn
        .query_row(&sql, [id], lifecycle_from_row)
        .optional()?)
}

pub fn store_lifecycle(
    conn: &Connection,
    table: CatalogTable,
    id: i64,
    lifecycle: &Lifecycle,
) -> AppResult<()> {
    let sql = format!(
        "UPDATE {} SET active = ?1, status_changed_at = ?2 WHERE id = ?3",
        table.table()
    );
    conn.execute(
        &sql,
        params![lifecycle.is_active() as i64, lifecycle.changed_at, id],
    )?;
    Ok(())
}

// ---------------------------
// Cost profiles
// ---------------------------

fn map_cost_profile(row: &Row) -> rusqlite::Result<CostProfile> {
    Ok(CostProfile {
        id: row.get("id")?,
        name: row.get("name")?,
        hourly_cost: get_decimal(row, "hourly_cost")?,
        lifecycle: lifecycle_from_row(row)?,
    })
}

pub fn insert_cost_profile(conn: &Connection, name: &str, hourly_cost: Decimal) -> AppResult<i64> {
    let lc = Lifecycle::created();
    conn.execute(
        "INSERT INTO cost_profiles (name, hourly_cost, active, status_changed_at)
         VALUES (?1, ?2, 1, ?3)",
        params![name, dec_to_db(hourly_cost), lc.changed_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_cost_profile(conn: &Connection, id: i64) -> AppResult<Option<CostProfile>> {
    Ok(conn
        .query_row(
            "SELECT * FROM cost_profiles WHERE id = ?1",
            [id],
            map_cost_profile,
        )
        .optional()?)
}

pub fn list_cost_profiles(conn: &Connection) -> AppResult<Vec<CostProfile>> {
    let mut stmt = conn.prepare("SELECT * FROM cost_profiles ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_cost_profile)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Users
// ---------------------------

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: Role,
    pub cost_profile_id: Option<i64>,
    pub hourly_cost: Option<Decimal>,
    pub weekly_hours: Decimal,
}

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role: get_enum(row, "role", Role::from_db_str)?,
        cost_profile_id: row.get("cost_profile_id")?,
        hourly_cost: get_opt_decimal(row, "hourly_cost")?,
        weekly_hours: get_decimal(row, "weekly_hours")?,
        lifecycle: lifecycle_from_row(row)?,
    })
}

pub fn insert_user(conn: &Connection, u: &NewUser) -> AppResult<i64> {
    let lc = Lifecycle::created();
    conn.execute(
        "INSERT INTO users (name, email, password_hash, role, cost_profile_id, hourly_cost,
                            weekly_hours, active, status_changed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
        params![
            u.name,
            u.email,
            u.password_hash,
            u.role.to_db_str(),
            u.cost_profile_id,
            opt_dec_to_db(u.hourly_cost),
            dec_to_db(u.weekly_hours),
            lc.changed_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_user(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    Ok(conn
        .query_row("SELECT * FROM users WHERE id = ?1", [id], map_user)
        .optional()?)
}

pub fn email_exists(conn: &Connection, email: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM users WHERE lower(email) = lower(?1) LIMIT 1")?;
    Ok(stmt.exists([email])?)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY name ASC, id ASC")?;
    let rows = stmt.query_map([], map_user)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// The user's current hourly cost: direct override, else the profile's rate.
pub fn effective_hourly_cost(conn: &Connection, user: &User) -> AppResult<Option<Decimal>> {
    let profile_rate = match user.cost_profile_id {
        Some(pid) => load_cost_profile(conn, pid)?.map(|p| p.hourly_cost),
        None => None,
    };
    Ok(user.effective_hourly_cost(profile_rate))
}

// ---------------------------
// Projects
// ---------------------------

pub struct NewProject<'a> {
    pub name: &'a str,
    pub client: Option<&'a str>,
    pub cost_center: Option<&'a str>,
    pub billing_model: BillingModel,
    pub fee_type: Option<FeeType>,
    pub fee_amount: Option<Decimal>,
    pub manager_id: i64,
}

fn map_project(row: &Row) -> rusqlite::Result<Project> {
    let fee_type: Option<String> = row.get("fee_type")?;
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        client: row.get("client")?,
        cost_center: row.get("cost_center")?,
        status: get_enum(row, "status", ProjectStatus::from_db_str)?,
        billing_model: get_enum(row, "billing_model", BillingModel::from_db_str)?,
        fee_type: fee_type.as_deref().and_then(FeeType::from_db_str),
        fee_amount: get_opt_decimal(row, "fee_amount")?,
        manager_id: row.get("manager_id")?,
        lifecycle: lifecycle_from_row(row)?,
    })
}

pub fn insert_project(conn: &Connection, p: &NewProject) -> AppResult<i64> {
    let lc = Lifecycle::created();
    conn.execute(
        "INSERT INTO projects (name, client, cost_center, status, billing_model, fee_type,
                               fee_amount, manager_id, active, status_changed_at)
         VALUES (?1, ?2, ?3, 'ATIVO', ?4, ?5, ?6, ?7, 1, ?8)",
        params![
            p.name,
            p.client,
            p.cost_center,
            p.billing_model.to_db_str(),
            p.fee_type.map(|f| f.to_db_str()),
            opt_dec_to_db(p.fee_amount),
            p.manager_id,
            lc.changed_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_project(conn: &Connection, id: i64) -> AppResult<Option<Project>> {
    Ok(conn
        .query_row("SELECT * FROM projects WHERE id = ?1", [id], map_project)
        .optional()?)
}

pub fn list_projects(conn: &Connection) -> AppResult<Vec<Project>> {
    let mut stmt = conn.prepare("SELECT * FROM projects ORDER BY name ASC, id ASC")?;
    let rows = stmt.query_map([], map_project)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn update_project_status(conn: &Connection, id: i64, status: ProjectStatus) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE projects SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    if n == 0 {
        return Err(AppError::not_found(format!("project {id}")));
    }
    Ok(())
}

fn map_estimate(row: &Row) -> rusqlite::Result<EstimateProfile> {
    Ok(EstimateProfile {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        cost_profile_id: row.get("cost_profile_id")?,
        estimated_hours: get_decimal(row, "estimated_hours")?,
        cost_per_hour: get_decimal(row, "cost_per_hour")?,
        price_per_hour: get_decimal(row, "price_per_hour")?,
    })
}

pub fn insert_estimate(
    conn: &Connection,
    project_id: i64,
    cost_profile_id: i64,
    estimated_hours: Decimal,
    cost_per_hour: Decimal,
    price_per_hour: Decimal,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO project_estimates (project_id, cost_profile_id, estimated_hours,
                                        cost_per_hour, price_per_hour)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            project_id,
            cost_profile_id,
            dec_to_db(estimated_hours),
            dec_to_db(cost_per_hour),
            dec_to_db(price_per_hour),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn map_contract(row: &Row) -> rusqlite::Result<MonthlyContract> {
    let raw: String = row.get("competence")?;
    let competence =
        Competence::parse(&raw).map_err(crate::db::db_utils::conversion_error)?;
    Ok(MonthlyContract {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        competence,
        cost_profile_id: row.get("cost_profile_id")?,
        contracted_hours: get_decimal(row, "contracted_hours")?,
        price_contracted: get_decimal(row, "price_contracted")?,
        price_additional: get_decimal(row, "price_additional")?,
        price_off_hours: get_decimal(row, "price_off_hours")?,
        price_overtime: get_decimal(row, "price_overtime")?,
        cost_per_hour: get_decimal(row, "cost_per_hour")?,
    })
}

pub struct NewContract {
    pub project_id: i64,
    pub competence: Competence,
    pub cost_profile_id: i64,
    pub contracted_hours: Decimal,
    pub price_contracted: Decimal,
    pub price_additional: Decimal,
    pub price_off_hours: Decimal,
    pub price_overtime: Decimal,
    pub cost_per_hour: Decimal,
}

pub fn insert_contract(conn: &Connection, c: &NewContract) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO project_contracts (project_id, competence, cost_profile_id, contracted_hours,
                                        price_contracted, price_additional, price_off_hours,
                                        price_overtime, cost_per_hour)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            c.project_id,
            c.competence.to_string(),
            c.cost_profile_id,
            dec_to_db(c.contracted_hours),
            dec_to_db(c.price_contracted),
            dec_to_db(c.price_additional),
            dec_to_db(c.price_off_hours),
            dec_to_db(c.price_overtime),
            dec_to_db(c.cost_per_hour),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn contract_exists(
    conn: &Connection,
    project_id: i64,
    competence: Competence,
    cost_profile_id: i64,
) -> AppResult<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM project_contracts
         WHERE project_id = ?1 AND competence = ?2 AND cost_profile_id = ?3
         LIMIT 1",
    )?;
    Ok(stmt.exists(params![project_id, competence.to_string(), cost_profile_id])?)
}

fn map_installment(row: &Row) -> rusqlite::Result<FeeInstallment> {
    Ok(FeeInstallment {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        kind: get_enum(row, "kind", InstallmentType::from_db_str)?,
        description: row.get("description")?,
        due_date: get_date(row, "due_date")?,
        amount: get_decimal(row, "amount")?,
    })
}

pub fn insert_installment(
    conn: &Connection,
    project_id: i64,
    kind: InstallmentType,
    description: Option<&str>,
    due_date: NaiveDate,
    amount: Decimal,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO fee_installments (project_id, kind, description, due_date, amount)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            project_id,
            kind.to_db_str(),
            description,
            date_to_db(due_date),
            dec_to_db(amount),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Load a project together with its estimates, contracts and installments.
pub fn load_project_book(conn: &Connection, id: i64) -> AppResult<Option<ProjectBook>> {
    let Some(project) = load_project(conn, id)? else {
        return Ok(None);
    };

    let mut stmt =
        conn.prepare_cached("SELECT * FROM project_estimates WHERE project_id = ?1 ORDER BY id")?;
    let estimates = stmt
        .query_map([id], map_estimate)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT * FROM project_contracts WHERE project_id = ?1 ORDER BY competence, id",
    )?;
    let contracts = stmt
        .query_map([id], map_contract)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT * FROM fee_installments WHERE project_id = ?1 ORDER BY due_date, id",
    )?;
    let installments = stmt
        .query_map([id], map_installment)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(ProjectBook {
        project,
        estimates,
        contracts,
        installments,
    }))
}

// ---------------------------
// Tasks & allocations
// ---------------------------

fn map_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        budget_hours: get_decimal(row, "budget_hours")?,
        lifecycle: lifecycle_from_row(row)?,
    })
}

pub fn insert_task(
    conn: &Connection,
    project_id: i64,
    name: &str,
    budget_hours: Decimal,
) -> AppResult<i64> {
    let lc = Lifecycle::created();
    conn.execute(
        "INSERT INTO tasks (project_id, name, budget_hours, active, status_changed_at)
         VALUES (?1, ?2, ?3, 1, ?4)",
        params![project_id, name, dec_to_db(budget_hours), lc.changed_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_task(conn: &Connection, id: i64) -> AppResult<Option<Task>> {
    Ok(conn
        .query_row("SELECT * FROM tasks WHERE id = ?1", [id], map_task)
        .optional()?)
}

pub fn list_tasks(conn: &Connection, project_id: Option<i64>) -> AppResult<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM tasks
         WHERE (?1 IS NULL OR project_id = ?1)
         ORDER BY project_id ASC, id ASC",
    )?;
    let rows = stmt.query_map([project_id], map_task)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn map_allocation(row: &Row) -> rusqlite::Result<Allocation> {
    Ok(Allocation {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        project_id: row.get("project_id")?,
        task_id: row.get("task_id")?,
        start_date: get_date(row, "start_date")?,
        lifecycle: lifecycle_from_row(row)?,
    })
}

pub fn insert_allocation(
    conn: &Connection,
    user_id: i64,
    project_id: i64,
    task_id: Option<i64>,
    start_date: NaiveDate,
) -> AppResult<i64> {
    let lc = Lifecycle::created();
    conn.execute(
        "INSERT INTO allocations (user_id, project_id, task_id, start_date, active, status_changed_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        params![
            user_id,
            project_id,
            task_id,
            date_to_db(start_date),
            lc.changed_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_allocations(conn: &Connection, user_id: Option<i64>) -> AppResult<Vec<Allocation>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM allocations
         WHERE (?1 IS NULL OR user_id = ?1)
         ORDER BY user_id ASC, id ASC",
    )?;
    let rows = stmt.query_map([user_id], map_allocation)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
