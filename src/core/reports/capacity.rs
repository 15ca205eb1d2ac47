use super::LedgerSnapshot;
use crate::core::calendar::BusinessCalendar;
use crate::export::Tabular;
use crate::models::competence::Competence;
use crate::models::user::User;
use crate::utils::formatting::{fmt2, fmt2_signed, round2};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectShare {
    pub project_id: i64,
    pub project: String,
    pub hours: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityRow {
    pub user_id: i64,
    pub name: String,
    pub weekly_hours: Decimal,
    pub capacity: Decimal,
    pub allocated: Decimal,
    pub realized: Decimal,
    /// capacity − allocated
    pub difference: Decimal,
    pub utilization_pct: Decimal,
    pub distribution: Vec<ProjectShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityReport {
    pub reference_month: String,
    pub rows: Vec<CapacityRow>,
}

/// Month the allocated hours are planned for: month of `date_from`, else of
/// `date_to`, else the current month.
pub fn reference_month(snapshot: &LedgerSnapshot, today: NaiveDate) -> Competence {
    let f = &snapshot.filter;
    Competence::of(f.date_from.or(f.date_to).unwrap_or(today))
}

fn keeps_user(snapshot: &LedgerSnapshot, user: &User) -> bool {
    let f = &snapshot.filter;
    if !user.lifecycle.is_active() {
        return false;
    }
    if f.collaborator_id.is_some_and(|id| id != user.id) {
        return false;
    }
    if f.cost_profile_id.is_some() && f.cost_profile_id != user.cost_profile_id {
        return false;
    }

    let mut allocated = snapshot
        .allocations
        .iter()
        .filter(|a| a.user_id == user.id && a.lifecycle.is_active());
    if let Some(pid) = f.project_id
        && !allocated.clone().any(|a| a.project_id == pid)
    {
        return false;
    }
    if let Some(manager) = f.manager_id
        && !allocated.any(|a| {
            snapshot
                .books
                .get(&a.project_id)
                .is_some_and(|b| b.project.manager_id == manager)
        })
    {
        return false;
    }
    true
}

pub fn build(
    snapshot: &LedgerSnapshot,
    calendar: &dyn BusinessCalendar,
    weeks_per_month: Decimal,
    today: NaiveDate,
) -> CapacityReport {
    let month = reference_month(snapshot, today);
    let (month_start, month_end) = (month.first_day(), month.last_day());
    let five = Decimal::from(5);

    let rows = snapshot
        .users
        .values()
        .filter(|u| keeps_user(snapshot, u))
        .map(|user| {
            let capacity = user.weekly_hours * weeks_per_month;
            let daily = user.weekly_hours / five;

            let active: Vec<_> = snapshot
                .allocations
                .iter()
                .filter(|a| a.user_id == user.id && a.lifecycle.is_active())
                .collect();

            let allocated: Decimal = active
                .iter()
                .filter(|a| a.start_date <= month_end)
                .map(|a| {
                    let from = a.start_date.max(month_start);
                    daily * Decimal::from(calendar.business_days(from, month_end))
                })
                .sum();

            let mut per_project: BTreeMap<i64, Decimal> = BTreeMap::new();
            let mut realized = Decimal::ZERO;
            for e in snapshot.entries.iter().filter(|e| e.user_id == user.id) {
                realized += e.hours;
                *per_project.entry(e.project_id).or_default() += e.hours;
            }

            let allocated_projects: BTreeSet<i64> = active.iter().map(|a| a.project_id).collect();
            let distribution = allocated_projects
                .into_iter()
                .map(|pid| ProjectShare {
                    project_id: pid,
                    project: snapshot.project_name(pid),
                    hours: per_project.get(&pid).copied().unwrap_or(Decimal::ZERO),
                })
                .collect();

            let utilization_pct = if capacity.is_zero() {
                Decimal::ZERO
            } else {
                round2(realized / capacity * Decimal::ONE_HUNDRED)
            };

            CapacityRow {
                user_id: user.id,
                name: user.name.clone(),
                weekly_hours: user.weekly_hours,
                capacity,
                allocated,
                realized,
                difference: capacity - allocated,
                utilization_pct,
                distribution,
            }
        })
        .collect();

    CapacityReport {
        reference_month: month.to_string(),
        rows,
    }
}

impl Tabular for CapacityReport {
    fn title(&self) -> String {
        format!("Capacity ({})", self.reference_month)
    }

    fn headers(&self) -> Vec<&'static str> {
        vec![
            "user_id",
            "collaborator",
            "weekly",
            "capacity",
            "allocated",
            "realized",
            "difference",
            "utilization_pct",
            "distribution",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let distribution = r
                    .distribution
                    .iter()
                    .map(|d| format!("{}: {}", d.project, fmt2(d.hours)))
                    .collect::<Vec<_>>()
                    .join("; ");
                vec![
                    r.user_id.to_string(),
                    r.name.clone(),
                    fmt2(r.weekly_hours),
                    fmt2(r.capacity),
                    fmt2(r.allocated),
                    fmt2(r.realized),
                    fmt2_signed(r.difference),
                    fmt2(r.utilization_pct),
                    distribution,
                ]
            })
            .collect()
    }
}
