//! Report engine: a bounded snapshot of the ledger is loaded once, then each
//! report is a pure fold over it.

pub mod capacity;
pub mod collaborator;
pub mod compliance;
pub mod profitability;
pub mod project_month;

use crate::config::Config;
use crate::context::RequestContext;
use crate::core::billing::{BillingStrategies, Period, ProjectHistory};
use crate::core::calendar::ConfiguredCalendar;
use crate::db::catalog::{
    list_allocations, list_projects, list_tasks, list_users, load_project_book,
};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::reports::{load_banked_balances, load_entries, load_project_history, load_punches};
use crate::errors::AppResult;
use crate::export::{ExportFormat, ExportLogic};
use crate::models::project::{BillingModel, FeeType, Project, ProjectBook};
use crate::models::punch::ClockPunch;
use crate::models::report_filter::ReportFilter;
use crate::models::task::{Allocation, Task};
use crate::models::timesheet::TimesheetEntry;
use crate::models::user::User;
use clap::ValueEnum;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Hours, cost and revenue per project and competence month
    ProjectMonth,
    /// Hours per collaborator with project/task breakdown and banked balance
    Collaborator,
    /// Expected punch pattern and registered hours per user and day
    Compliance,
    /// Cost, revenue and margin per project over the whole range
    Profitability,
    /// Capacity, allocated and realized hours per active user
    Capacity,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::ProjectMonth => "project-month",
            ReportKind::Collaborator => "collaborator",
            ReportKind::Compliance => "compliance",
            ReportKind::Profitability => "profitability",
            ReportKind::Capacity => "capacity",
        }
    }
}

/// Everything a report needs, read under the scan limit.
#[derive(Debug, Default)]
pub struct LedgerSnapshot {
    pub filter: ReportFilter,
    pub entries: Vec<TimesheetEntry>,
    pub punches: Vec<ClockPunch>,
    pub users: BTreeMap<i64, User>,
    pub books: BTreeMap<i64, ProjectBook>,
    pub tasks: BTreeMap<i64, Task>,
    pub allocations: Vec<Allocation>,
    /// All-time history of each project present in `entries`.
    pub histories: HashMap<i64, ProjectHistory>,
    /// All-time banked balance per user.
    pub banked: HashMap<i64, Decimal>,
    /// `(project, due date)` of fixed-fee installments due in range, for
    /// projects passing the project and manager filters.
    pub due_installments: Vec<(i64, NaiveDate)>,
}

impl LedgerSnapshot {
    /// Load the filtered entries plus the catalog around them.
    pub fn load(conn: &Connection, cfg: &Config, filter: &ReportFilter) -> AppResult<Self> {
        let entries = load_entries(conn, filter, cfg.report_max_rows)?;

        let users = list_users(conn)?.into_iter().map(|u| (u.id, u)).collect();
        let tasks = list_tasks(conn, None)?.into_iter().map(|t| (t.id, t)).collect();
        let allocations = list_allocations(conn, None)?;

        let mut project_ids: BTreeSet<i64> = entries.iter().map(|e| e.project_id).collect();
        project_ids.extend(allocations.iter().map(|a| a.project_id));

        let mut books = BTreeMap::new();
        for id in project_ids {
            if let Some(book) = load_project_book(conn, id)? {
                books.insert(id, book);
            }
        }

        let period = Period::new(filter.date_from, filter.date_to);
        let mut due_installments = Vec::new();
        for project in list_projects(conn)? {
            if !earns_installments(&project) || !filter_keeps_project(filter, &project) {
                continue;
            }
            let due = match books.get(&project.id) {
                Some(book) => due_dates(book, period),
                None => match load_project_book(conn, project.id)? {
                    Some(book) => {
                        let due = due_dates(&book, period);
                        if !due.is_empty() {
                            books.insert(project.id, book);
                        }
                        due
                    }
                    None => continue,
                },
            };
            due_installments.extend(due.into_iter().map(|d| (project.id, d)));
        }

        let mut histories = HashMap::new();
        let mut billed: BTreeSet<i64> = entries.iter().map(|e| e.project_id).collect();
        billed.extend(due_installments.iter().map(|(id, _)| *id));
        for id in billed {
            if books
                .get(&id)
                .is_some_and(|b: &ProjectBook| b.project.billing_model == BillingModel::FixedScope)
            {
                let lines = load_project_history(conn, id, cfg.report_max_rows)?
                    .into_iter()
                    .map(|l| (l.date, l.hours))
                    .collect();
                histories.insert(id, ProjectHistory { lines });
            }
        }

        Ok(Self {
            filter: filter.clone(),
            entries,
            punches: Vec::new(),
            users,
            books,
            tasks,
            allocations,
            histories,
            banked: load_banked_balances(conn)?,
            due_installments,
        })
    }

    /// Add the punches in range (collaborator and date filters only).
    pub fn with_punches(mut self, conn: &Connection, cfg: &Config) -> AppResult<Self> {
        self.punches = load_punches(conn, &self.filter, cfg.report_max_rows)?;
        Ok(self)
    }

    pub fn user_name(&self, id: i64) -> String {
        self.users
            .get(&id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn project_name(&self, id: i64) -> String {
        self.books
            .get(&id)
            .map(|b| b.project.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn history(&self, project_id: i64) -> ProjectHistory {
        self.histories.get(&project_id).cloned().unwrap_or_default()
    }
}

fn earns_installments(project: &Project) -> bool {
    project.billing_model == BillingModel::FixedScope && project.fee_type != Some(FeeType::Hourly)
}

fn due_dates(book: &ProjectBook, period: Period) -> Vec<NaiveDate> {
    book.installments
        .iter()
        .filter(|i| period.contains(i.due_date))
        .map(|i| i.due_date)
        .collect()
}

fn filter_keeps_project(filter: &ReportFilter, project: &Project) -> bool {
    filter.project_id.is_none_or(|id| id == project.id)
        && filter.manager_id.is_none_or(|id| id == project.manager_id)
}

/// Sum of hours of a set of entries.
pub(crate) fn hours_of<'a>(entries: impl IntoIterator<Item = &'a TimesheetEntry>) -> Decimal {
    entries.into_iter().map(|e| e.hours).sum()
}

/// Sum of hours × cost snapshot; entries without a snapshot cost nothing.
pub(crate) fn cost_of<'a>(entries: impl IntoIterator<Item = &'a TimesheetEntry>) -> Decimal {
    entries.into_iter().map(TimesheetEntry::cost).sum()
}

/// High-level business logic for the `report` command.
pub struct ReportLogic;

impl ReportLogic {
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        pool: &mut DbPool,
        cfg: &Config,
        ctx: &RequestContext,
        kind: ReportKind,
        filter: &ReportFilter,
        format: ExportFormat,
        file: Option<&str>,
        force: bool,
    ) -> AppResult<()> {
        let strategies = BillingStrategies::default();
        let snapshot = LedgerSnapshot::load(&pool.conn, cfg, filter)?;

        match kind {
            ReportKind::ProjectMonth => {
                let report = project_month::build(&snapshot, &strategies);
                ExportLogic::export(&report, format, file, force)?;
            }
            ReportKind::Collaborator => {
                let report = collaborator::build(&snapshot);
                ExportLogic::export(&report, format, file, force)?;
            }
            ReportKind::Compliance => {
                let snapshot = snapshot.with_punches(&pool.conn, cfg)?;
                let report = compliance::build(&snapshot, cfg.expected_daily_hours);
                ExportLogic::export(&report, format, file, force)?;
            }
            ReportKind::Profitability => {
                let report = profitability::build(&snapshot, &strategies);
                ExportLogic::export(&report, format, file, force)?;
            }
            ReportKind::Capacity => {
                let calendar = ConfiguredCalendar::from_config(cfg);
                let today = crate::utils::date::today();
                let report = capacity::build(&snapshot, &calendar, cfg.weeks_per_month, today);
                ExportLogic::export(&report, format, file, force)?;
            }
        }

        if format != ExportFormat::Table {
            audit(
                &pool.conn,
                ctx,
                "report",
                kind.as_str(),
                &format!("{} written to {}", format.as_str(), file.unwrap_or("-")),
            )?;
        }

        Ok(())
    }
}
