use super::LedgerSnapshot;
use crate::export::Tabular;
use crate::models::punch::PunchType;
use crate::utils::formatting::{fmt2, fmt2_signed};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRow {
    pub user_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub expected_hours: Decimal,
    pub registered_hours: Decimal,
    /// registered − expected
    pub difference: Decimal,
    pub punches: Vec<PunchType>,
    /// Expected punch types absent that day, 0..=4.
    pub missing_punches: usize,
    pub corrections: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub rows: Vec<ComplianceRow>,
}

#[derive(Default)]
struct Day {
    punches: BTreeSet<PunchType>,
    registered: Decimal,
    corrections: usize,
}

/// One row per (user, date) with a punch or an entry in range.
pub fn build(snapshot: &LedgerSnapshot, expected_daily_hours: Decimal) -> ComplianceReport {
    let mut days: BTreeMap<(i64, NaiveDate), Day> = BTreeMap::new();

    for p in &snapshot.punches {
        days.entry((p.user_id, p.date)).or_default().punches.insert(p.kind);
    }
    for e in &snapshot.entries {
        let day = days.entry((e.user_id, e.date)).or_default();
        day.registered += e.hours;
        if e.is_correction() {
            day.corrections += 1;
        }
    }

    let rows = days
        .into_iter()
        .map(|((user_id, date), day)| {
            let present = PunchType::EXPECTED
                .iter()
                .filter(|k| day.punches.contains(*k))
                .count();
            ComplianceRow {
                user_id,
                name: snapshot.user_name(user_id),
                date,
                expected_hours: expected_daily_hours,
                registered_hours: day.registered,
                difference: day.registered - expected_daily_hours,
                punches: day.punches.into_iter().collect(),
                missing_punches: PunchType::EXPECTED.len() - present,
                corrections: day.corrections,
            }
        })
        .collect();

    ComplianceReport { rows }
}

impl Tabular for ComplianceReport {
    fn title(&self) -> String {
        "Compliance".to_string()
    }

    fn headers(&self) -> Vec<&'static str> {
        vec![
            "user_id",
            "collaborator",
            "date",
            "expected",
            "registered",
            "difference",
            "punches",
            "missing",
            "corrections",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let punches = r
                    .punches
                    .iter()
                    .map(|p| p.to_db_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                vec![
                    r.user_id.to_string(),
                    r.name.clone(),
                    r.date.format("%Y-%m-%d").to_string(),
                    fmt2(r.expected_hours),
                    fmt2(r.registered_hours),
                    fmt2_signed(r.difference),
                    punches,
                    r.missing_punches.to_string(),
                    r.corrections.to_string(),
                ]
            })
            .collect()
    }
}
