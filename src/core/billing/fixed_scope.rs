use super::{BillingFigures, BillingStrategy, ModelDetail, Period, ProjectHistory};
use crate::models::project::{BillingModel, FeeType, ProjectBook};
use crate::models::timesheet::TimesheetEntry;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Fixed-fee scope (`ESCOPO_FECHADO`).
///
/// `FIXO` projects earn their installments when they fall due, independent of
/// hours; a project without installments earns the whole fee on its first day
/// of recorded activity. `POR_HORA` projects earn each hour at the price
/// snapshot of the estimate row for the entry's cost profile.
pub struct FixedScopeBilling;

impl FixedScopeBilling {
    fn fee_revenue(book: &ProjectBook, period: Period, history: &ProjectHistory) -> Decimal {
        if !book.installments.is_empty() {
            return book
                .installments
                .iter()
                .filter(|i| period.contains(i.due_date))
                .map(|i| i.amount)
                .sum();
        }

        match (history.first_activity(), book.project.fee_amount) {
            (Some(first), Some(fee)) if period.contains(first) => fee,
            _ => Decimal::ZERO,
        }
    }

    fn hourly_revenue(book: &ProjectBook, entries: &[&TimesheetEntry]) -> Decimal {
        entries
            .iter()
            .map(|e| {
                let price = book
                    .estimate_for_profile(e.cost_profile_snapshot_id)
                    .map(|est| est.price_per_hour)
                    .unwrap_or(Decimal::ZERO);
                e.hours * price
            })
            .sum()
    }
}

impl BillingStrategy for FixedScopeBilling {
    fn model(&self) -> BillingModel {
        BillingModel::FixedScope
    }

    fn extra_threshold(&self, book: &ProjectBook, _date: NaiveDate) -> Decimal {
        book.estimated_hours()
    }

    fn threshold_scope(&self, _date: NaiveDate) -> Period {
        Period::default()
    }

    fn bill(
        &self,
        book: &ProjectBook,
        period: Period,
        entries: &[&TimesheetEntry],
        history: &ProjectHistory,
    ) -> BillingFigures {
        let revenue = match book.project.fee_type {
            Some(FeeType::Hourly) => Self::hourly_revenue(book, entries),
            Some(FeeType::Fixed) | None => Self::fee_revenue(book, period, history),
        };

        let estimated_hours = book.estimated_hours();
        let cumulative_hours = history.cumulative_through(period.to);

        BillingFigures {
            revenue,
            detail: ModelDetail::FixedScope {
                estimated_hours,
                cumulative_hours,
                balance_hours: estimated_hours - cumulative_hours,
            },
        }
    }
}
