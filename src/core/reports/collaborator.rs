use super::{LedgerSnapshot, hours_of};
use crate::export::Tabular;
use crate::models::timesheet::{CollaboratorClass, TimesheetEntry};
use crate::utils::formatting::fmt2;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectTaskHours {
    pub project_id: i64,
    pub project: String,
    pub task_id: Option<i64>,
    pub task: Option<String>,
    pub hours: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorRow {
    pub user_id: i64,
    pub name: String,
    pub total_hours: Decimal,
    pub extra_hours: Decimal,
    pub banked_class_hours: Decimal,
    /// All-time balance; never narrowed by the report dates.
    pub banked_balance: Decimal,
    pub breakdown: Vec<ProjectTaskHours>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorReport {
    pub rows: Vec<CollaboratorRow>,
}

pub fn build(snapshot: &LedgerSnapshot) -> CollaboratorReport {
    let mut by_user: BTreeMap<i64, Vec<&TimesheetEntry>> = BTreeMap::new();
    for e in &snapshot.entries {
        by_user.entry(e.user_id).or_default().push(e);
    }

    let rows = by_user
        .into_iter()
        .map(|(user_id, entries)| {
            let mut pairs: BTreeMap<(i64, Option<i64>), Decimal> = BTreeMap::new();
            for e in &entries {
                *pairs.entry((e.project_id, e.task_id)).or_default() += e.hours;
            }

            let breakdown = pairs
                .into_iter()
                .map(|((project_id, task_id), hours)| ProjectTaskHours {
                    project_id,
                    project: snapshot.project_name(project_id),
                    task_id,
                    task: task_id
                        .and_then(|id| snapshot.tasks.get(&id))
                        .map(|t| t.name.clone()),
                    hours,
                })
                .collect();

            let of_class = |class: CollaboratorClass| {
                hours_of(
                    entries
                        .iter()
                        .copied()
                        .filter(move |e| e.collaborator_class == class),
                )
            };

            CollaboratorRow {
                user_id,
                name: snapshot.user_name(user_id),
                total_hours: hours_of(entries.iter().copied()),
                extra_hours: of_class(CollaboratorClass::Extra),
                banked_class_hours: of_class(CollaboratorClass::Banked),
                banked_balance: snapshot
                    .banked
                    .get(&user_id)
                    .copied()
                    .unwrap_or(Decimal::ZERO),
                breakdown,
            }
        })
        .collect();

    CollaboratorReport { rows }
}

impl Tabular for CollaboratorReport {
    fn title(&self) -> String {
        "Hours by collaborator".to_string()
    }

    fn headers(&self) -> Vec<&'static str> {
        vec![
            "user_id",
            "collaborator",
            "hours",
            "extra",
            "banco",
            "banked_balance",
            "breakdown",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let breakdown = r
                    .breakdown
                    .iter()
                    .map(|b| match &b.task {
                        Some(task) => format!("{}/{}: {}", b.project, task, fmt2(b.hours)),
                        None => format!("{}: {}", b.project, fmt2(b.hours)),
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                vec![
                    r.user_id.to_string(),
                    r.name.clone(),
                    fmt2(r.total_hours),
                    fmt2(r.extra_hours),
                    fmt2(r.banked_class_hours),
                    fmt2(r.banked_balance),
                    breakdown,
                ]
            })
            .collect()
    }
}
