//! Billing rules per billing model.
//!
//! The report engine groups and folds entries; everything that depends on
//! how a project is sold (threshold for `EXTRA`, revenue, tier breakdown)
//! comes from a `BillingStrategy` looked up by the project's `BillingModel`.

mod allocation;
mod fixed_scope;

pub use allocation::AllocationBilling;
pub use fixed_scope::FixedScopeBilling;

use crate::models::competence::Competence;
use crate::models::project::{BillingModel, ProjectBook};
use crate::models::timesheet::TimesheetEntry;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Closed date window; `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Period {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Period {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn month(m: Competence) -> Self {
        Self {
            from: Some(m.first_day()),
            to: Some(m.last_day()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }

    /// Months the period touches. Open periods fall back to the months that
    /// actually carry entries.
    pub fn months(&self, entries: &[&TimesheetEntry]) -> Vec<Competence> {
        match (self.from, self.to) {
            (Some(f), Some(t)) => {
                let last = Competence::of(t);
                let mut m = Competence::of(f);
                let mut out = Vec::new();
                while m <= last {
                    out.push(m);
                    m = m.next();
                }
                out
            }
            _ => entries
                .iter()
                .map(|e| Competence::of(e.date))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }
}

/// All-time dated hours of one project, sorted by date.
#[derive(Debug, Clone, Default)]
pub struct ProjectHistory {
    pub lines: Vec<(NaiveDate, Decimal)>,
}

impl ProjectHistory {
    pub fn cumulative_through(&self, date: Option<NaiveDate>) -> Decimal {
        self.lines
            .iter()
            .filter(|(d, _)| date.is_none_or(|limit| *d <= limit))
            .map(|(_, h)| *h)
            .sum()
    }

    pub fn first_activity(&self) -> Option<NaiveDate> {
        self.lines.iter().map(|(d, _)| *d).min()
    }
}

/// Hours split into the four allocation price tiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierBreakdown {
    pub contracted: Decimal,
    pub additional: Decimal,
    pub off_hours: Decimal,
    pub overtime: Decimal,
    /// Part of `additional` whose profile had no contract row (priced at 0).
    pub unpriced: Decimal,
}

impl TierBreakdown {
    pub fn total(&self) -> Decimal {
        self.contracted + self.additional + self.off_hours + self.overtime
    }

    pub fn add(&mut self, other: &TierBreakdown) {
        self.contracted += other.contracted;
        self.additional += other.additional;
        self.off_hours += other.off_hours;
        self.overtime += other.overtime;
        self.unpriced += other.unpriced;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelDetail {
    Allocation {
        contracted_hours: Decimal,
        tiers: TierBreakdown,
    },
    FixedScope {
        estimated_hours: Decimal,
        cumulative_hours: Decimal,
        balance_hours: Decimal,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingFigures {
    pub revenue: Decimal,
    pub detail: ModelDetail,
}

pub trait BillingStrategy: Send + Sync {
    fn model(&self) -> BillingModel;

    /// Hours budget above which a new entry is classified project-`EXTRA`.
    /// Zero means "no budget": nothing is ever `EXTRA`.
    fn extra_threshold(&self, book: &ProjectBook, date: NaiveDate) -> Decimal;

    /// Window of already-realized hours counted against `extra_threshold`.
    fn threshold_scope(&self, date: NaiveDate) -> Period;

    /// Revenue and model-specific figures for `entries` (all of one project,
    /// all inside `period`). `history` is the project's all-time ledger.
    fn bill(
        &self,
        book: &ProjectBook,
        period: Period,
        entries: &[&TimesheetEntry],
        history: &ProjectHistory,
    ) -> BillingFigures;
}

/// Registry of strategies keyed by billing model.
pub struct BillingStrategies {
    by_model: HashMap<BillingModel, Box<dyn BillingStrategy>>,
}

impl Default for BillingStrategies {
    fn default() -> Self {
        let mut s = Self {
            by_model: HashMap::new(),
        };
        s.register(Box::new(FixedScopeBilling));
        s.register(Box::new(AllocationBilling));
        s
    }
}

impl BillingStrategies {
    /// Replace the strategy for the model it declares.
    pub fn register(&mut self, strategy: Box<dyn BillingStrategy>) {
        self.by_model.insert(strategy.model(), strategy);
    }

    pub fn for_model(&self, model: BillingModel) -> &dyn BillingStrategy {
        match self.by_model.get(&model) {
            Some(s) => s.as_ref(),
            None => match model {
                BillingModel::FixedScope => &FixedScopeBilling,
                BillingModel::Allocation => &AllocationBilling,
            },
        }
    }
}
