use super::{LedgerSnapshot, cost_of, hours_of};
use crate::core::billing::{BillingStrategies, ModelDetail, Period};
use crate::export::Tabular;
use crate::models::competence::Competence;
use crate::models::project::BillingModel;
use crate::models::timesheet::{ProjectClass, TimesheetEntry};
use crate::utils::formatting::fmt2;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectMonthRow {
    pub project_id: i64,
    pub project: String,
    pub competence: String,
    pub billing_model: BillingModel,
    pub total_hours: Decimal,
    pub normal_hours: Decimal,
    pub extra_hours: Decimal,
    /// Project-`EXTRA` hours that were also flagged off-hours.
    pub extra_off_hours: Decimal,
    pub cost: Decimal,
    pub revenue: Decimal,
    pub margin: Decimal,
    pub detail: ModelDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectMonthReport {
    pub rows: Vec<ProjectMonthRow>,
}

/// Group entries by (project, competence month) and bill each group. Months
/// with a fixed-fee installment due get a row even without hours.
pub fn build(snapshot: &LedgerSnapshot, strategies: &BillingStrategies) -> ProjectMonthReport {
    let mut groups: BTreeMap<(i64, Competence), Vec<&TimesheetEntry>> = BTreeMap::new();
    for e in &snapshot.entries {
        groups
            .entry((e.project_id, Competence::of(e.date)))
            .or_default()
            .push(e);
    }
    for (project_id, due) in &snapshot.due_installments {
        groups.entry((*project_id, Competence::of(*due))).or_default();
    }

    let mut rows = Vec::new();
    for ((project_id, month), entries) in groups {
        let Some(book) = snapshot.books.get(&project_id) else {
            continue;
        };

        let strategy = strategies.for_model(book.project.billing_model);
        let figures = strategy.bill(
            book,
            Period::month(month),
            &entries,
            &snapshot.history(project_id),
        );

        let extra = entries
            .iter()
            .filter(|e| e.project_class == ProjectClass::Extra);
        let cost = cost_of(entries.iter().copied());

        rows.push(ProjectMonthRow {
            project_id,
            project: book.project.name.clone(),
            competence: month.to_string(),
            billing_model: book.project.billing_model,
            total_hours: hours_of(entries.iter().copied()),
            normal_hours: hours_of(
                entries
                    .iter()
                    .copied()
                    .filter(|e| e.project_class == ProjectClass::Normal),
            ),
            extra_hours: hours_of(extra.clone().copied()),
            extra_off_hours: hours_of(extra.copied().filter(|e| e.off_hours)),
            cost,
            revenue: figures.revenue,
            margin: figures.revenue - cost,
            detail: figures.detail,
        });
    }

    ProjectMonthReport { rows }
}

/// Model-specific columns shared with the profitability table.
pub(crate) fn detail_headers() -> Vec<&'static str> {
    vec![
        "contracted",
        "tier_contracted",
        "tier_additional",
        "tier_off_hours",
        "tier_overtime",
        "unpriced",
        "estimated",
        "cumulative",
        "balance",
    ]
}

pub(crate) fn detail_cells(detail: &ModelDetail) -> Vec<String> {
    let dash = || "--".to_string();
    match detail {
        ModelDetail::Allocation {
            contracted_hours,
            tiers,
        } => vec![
            fmt2(*contracted_hours),
            fmt2(tiers.contracted),
            fmt2(tiers.additional),
            fmt2(tiers.off_hours),
            fmt2(tiers.overtime),
            fmt2(tiers.unpriced),
            dash(),
            dash(),
            dash(),
        ],
        ModelDetail::FixedScope {
            estimated_hours,
            cumulative_hours,
            balance_hours,
        } => vec![
            dash(),
            dash(),
            dash(),
            dash(),
            dash(),
            dash(),
            fmt2(*estimated_hours),
            fmt2(*cumulative_hours),
            fmt2(*balance_hours),
        ],
    }
}

impl Tabular for ProjectMonthReport {
    fn title(&self) -> String {
        "Hours by project and month".to_string()
    }

    fn headers(&self) -> Vec<&'static str> {
        let mut h = vec![
            "project_id",
            "project",
            "month",
            "model",
            "hours",
            "normal",
            "extra",
            "extra_off_hours",
        ];
        h.extend(detail_headers());
        h.extend(["cost", "revenue", "margin"]);
        h
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut cells = vec![
                    r.project_id.to_string(),
                    r.project.clone(),
                    r.competence.clone(),
                    r.billing_model.to_db_str().to_string(),
                    fmt2(r.total_hours),
                    fmt2(r.normal_hours),
                    fmt2(r.extra_hours),
                    fmt2(r.extra_off_hours),
                ];
                cells.extend(detail_cells(&r.detail));
                cells.extend([fmt2(r.cost), fmt2(r.revenue), fmt2(r.margin)]);
                cells
            })
            .collect()
    }
}
