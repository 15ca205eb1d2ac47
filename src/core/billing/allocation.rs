use super::{BillingFigures, BillingStrategy, ModelDetail, Period, ProjectHistory, TierBreakdown};
use crate::models::competence::Competence;
use crate::models::project::{BillingModel, MonthlyContract, ProjectBook};
use crate::models::timesheet::{CollaboratorClass, TimesheetEntry};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Monthly staff allocation (`ALOCACAO`): hours are sold per competence
/// month and cost profile, in four price tiers.
///
/// Per contract row and month:
/// - off-hours-flagged hours go to the off-hours tier;
/// - of the remaining hours `H`, up to the contracted hours are contracted;
/// - the rest is overtime as far as it is covered by collaborator-`EXTRA`
///   hours, and additional otherwise.
///
/// Hours of a profile without a contract row that month are additional and
/// priced at zero.
pub struct AllocationBilling;

#[derive(Default)]
struct ProfileBucket {
    regular: Decimal,
    collaborator_extra: Decimal,
    off_hours: Decimal,
}

impl AllocationBilling {
    /// Tier split and revenue of one month.
    pub fn month_tiers(
        book: &ProjectBook,
        month: Competence,
        entries: &[&TimesheetEntry],
    ) -> (TierBreakdown, Decimal) {
        let mut buckets: BTreeMap<Option<i64>, ProfileBucket> = BTreeMap::new();
        for e in entries.iter().filter(|e| month.contains(e.date)) {
            let b = buckets.entry(e.cost_profile_snapshot_id).or_default();
            if e.off_hours {
                b.off_hours += e.hours;
            } else {
                b.regular += e.hours;
                if e.collaborator_class == CollaboratorClass::Extra {
                    b.collaborator_extra += e.hours;
                }
            }
        }

        let mut tiers = TierBreakdown::default();
        let mut revenue = Decimal::ZERO;

        for (profile, b) in buckets {
            let row: Option<&MonthlyContract> = profile.and_then(|pid| {
                book.contracts_for(month)
                    .find(|c| c.cost_profile_id == pid)
            });

            let Some(row) = row else {
                let hours = b.regular + b.off_hours;
                tiers.additional += hours;
                tiers.unpriced += hours;
                continue;
            };

            let contracted = b.regular.min(row.contracted_hours);
            let beyond = b.regular - contracted;
            let overtime = beyond.min(b.collaborator_extra);
            let additional = beyond - overtime;

            tiers.contracted += contracted;
            tiers.overtime += overtime;
            tiers.additional += additional;
            tiers.off_hours += b.off_hours;

            revenue += contracted * row.price_contracted
                + overtime * row.price_overtime
                + additional * row.price_additional
                + b.off_hours * row.price_off_hours;
        }

        (tiers, revenue)
    }
}

impl BillingStrategy for AllocationBilling {
    fn model(&self) -> BillingModel {
        BillingModel::Allocation
    }

    fn extra_threshold(&self, book: &ProjectBook, date: NaiveDate) -> Decimal {
        book.contracted_hours(Competence::of(date))
    }

    fn threshold_scope(&self, date: NaiveDate) -> Period {
        Period::month(Competence::of(date))
    }

    fn bill(
        &self,
        book: &ProjectBook,
        period: Period,
        entries: &[&TimesheetEntry],
        _history: &ProjectHistory,
    ) -> BillingFigures {
        let mut tiers = TierBreakdown::default();
        let mut revenue = Decimal::ZERO;
        let mut contracted_hours = Decimal::ZERO;

        for month in period.months(entries) {
            contracted_hours += book.contracted_hours(month);
            let (t, r) = Self::month_tiers(book, month, entries);
            tiers.add(&t);
            revenue += r;
        }

        BillingFigures {
            revenue,
            detail: ModelDetail::Allocation {
                contracted_hours,
                tiers,
            },
        }
    }
}
