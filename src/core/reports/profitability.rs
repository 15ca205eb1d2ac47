use super::project_month::{detail_cells, detail_headers};
use super::{LedgerSnapshot, cost_of, hours_of};
use crate::core::billing::{BillingStrategies, ModelDetail, Period};
use crate::export::Tabular;
use crate::models::project::BillingModel;
use crate::models::timesheet::TimesheetEntry;
use crate::utils::formatting::{fmt2, round2};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ProfitabilityRow {
    pub project_id: i64,
    pub project: String,
    pub billing_model: BillingModel,
    pub hours: Decimal,
    pub cost: Decimal,
    pub revenue: Decimal,
    pub margin: Decimal,
    /// margin ÷ revenue × 100; absent without revenue.
    pub margin_pct: Option<Decimal>,
    pub detail: ModelDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfitabilityReport {
    pub rows: Vec<ProfitabilityRow>,
}

/// One row per project with entries or fixed-fee installments in range,
/// billed over the whole range.
pub fn build(snapshot: &LedgerSnapshot, strategies: &BillingStrategies) -> ProfitabilityReport {
    let period = Period::new(snapshot.filter.date_from, snapshot.filter.date_to);

    let mut by_project: BTreeMap<i64, Vec<&TimesheetEntry>> = BTreeMap::new();
    for e in &snapshot.entries {
        by_project.entry(e.project_id).or_default().push(e);
    }
    for (project_id, _) in &snapshot.due_installments {
        by_project.entry(*project_id).or_default();
    }

    let mut rows = Vec::new();
    for (project_id, entries) in by_project {
        let Some(book) = snapshot.books.get(&project_id) else {
            continue;
        };

        let figures = strategies.for_model(book.project.billing_model).bill(
            book,
            period,
            &entries,
            &snapshot.history(project_id),
        );

        let cost = cost_of(entries.iter().copied());
        let margin = figures.revenue - cost;
        let margin_pct = (!figures.revenue.is_zero())
            .then(|| round2(margin / figures.revenue * Decimal::ONE_HUNDRED));

        rows.push(ProfitabilityRow {
            project_id,
            project: book.project.name.clone(),
            billing_model: book.project.billing_model,
            hours: hours_of(entries.iter().copied()),
            cost,
            revenue: figures.revenue,
            margin,
            margin_pct,
            detail: figures.detail,
        });
    }

    ProfitabilityReport { rows }
}

impl Tabular for ProfitabilityReport {
    fn title(&self) -> String {
        "Profitability by project".to_string()
    }

    fn headers(&self) -> Vec<&'static str> {
        let mut h = vec!["project_id", "project", "model", "hours"];
        h.extend(detail_headers());
        h.extend(["cost", "revenue", "margin", "margin_pct"]);
        h
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut cells = vec![
                    r.project_id.to_string(),
                    r.project.clone(),
                    r.billing_model.to_db_str().to_string(),
                    fmt2(r.hours),
                ];
                cells.extend(detail_cells(&r.detail));
                cells.extend([
                    fmt2(r.cost),
                    fmt2(r.revenue),
                    fmt2(r.margin),
                    r.margin_pct.map(fmt2).unwrap_or_else(|| "--".to_string()),
                ]);
                cells
            })
            .collect()
    }
}
