#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rtimebill::config::Config;
use rtimebill::context::RequestContext;
use rtimebill::core::billing::BillingStrategies;
use rtimebill::core::catalog::{CatalogLogic, ContractPrices};
use rtimebill::core::timesheet::{TimesheetDraft, TimesheetLogic};
use rtimebill::db::catalog::{NewProject, NewUser};
use rtimebill::db::initialize::init_db;
use rtimebill::db::pool::DbPool;
use rtimebill::errors::AppResult;
use rtimebill::models::project::{BillingModel, FeeType};
use rtimebill::models::timesheet::TimesheetEntry;
use rtimebill::models::user::Role;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::env;
use std::fs;
use std::path::PathBuf;

/// CLI command isolated from the user's real configuration directory.
pub fn rtb() -> Command {
    let mut home: PathBuf = env::temp_dir();
    home.push("rtimebill_test_home");
    let mut cmd = cargo_bin_cmd!("rtimebill");
    cmd.env("RTIMEBILL_HOME", home);
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimebill.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh migrated database plus a default config pointing at it.
pub fn open_test_db(name: &str) -> (DbPool, Config) {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).unwrap();
    init_db(&pool.conn).unwrap();
    (pool, Config::with_database(db_path))
}

pub fn ctx() -> RequestContext {
    RequestContext::system()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn seed_profile(pool: &mut DbPool, name: &str, cost: Decimal) -> i64 {
    CatalogLogic::add_cost_profile(pool, &ctx(), name, cost).unwrap()
}

pub fn seed_user(pool: &mut DbPool, name: &str, profile: Option<i64>) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase());
    CatalogLogic::add_user(
        pool,
        &ctx(),
        &NewUser {
            name,
            email: &email,
            password_hash: None,
            role: Role::Collaborator,
            cost_profile_id: profile,
            hourly_cost: None,
            weekly_hours: Decimal::from(40),
        },
    )
    .unwrap()
}

pub fn seed_allocation_project(pool: &mut DbPool, name: &str, manager: i64) -> i64 {
    CatalogLogic::add_project(
        pool,
        &ctx(),
        &NewProject {
            name,
            client: Some("ACME"),
            cost_center: None,
            billing_model: BillingModel::Allocation,
            fee_type: None,
            fee_amount: None,
            manager_id: manager,
        },
    )
    .unwrap()
}

pub fn seed_fixed_project(
    pool: &mut DbPool,
    name: &str,
    manager: i64,
    fee_type: FeeType,
    fee: Option<Decimal>,
) -> i64 {
    CatalogLogic::add_project(
        pool,
        &ctx(),
        &NewProject {
            name,
            client: Some("ACME"),
            cost_center: Some("CC-01"),
            billing_model: BillingModel::FixedScope,
            fee_type: Some(fee_type),
            fee_amount: fee,
            manager_id: manager,
        },
    )
    .unwrap()
}

pub fn prices(contracted: i64, additional: i64, off_hours: i64, overtime: i64) -> ContractPrices {
    ContractPrices {
        contracted: Decimal::from(contracted),
        additional: Decimal::from(additional),
        off_hours: Decimal::from(off_hours),
        overtime: Decimal::from(overtime),
    }
}

pub fn draft(user: i64, project: i64, day: &str, hours: Decimal) -> TimesheetDraft {
    let mut d = TimesheetDraft::new(project, date(day));
    d.user_id = Some(user);
    d.hours = Some(hours);
    d
}

pub fn record(pool: &mut DbPool, cfg: &Config, d: &TimesheetDraft) -> AppResult<TimesheetEntry> {
    TimesheetLogic::record(pool, cfg, &ctx(), &BillingStrategies::default(), d)
}
