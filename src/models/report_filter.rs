use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::Serialize;

/// Optional filter set shared by every report query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub project_id: Option<i64>,
    pub collaborator_id: Option<i64>,
    pub cost_profile_id: Option<i64>,
    pub manager_id: Option<i64>,
}

impl ReportFilter {
    /// Build a filter from raw CLI strings; malformed dates are validation errors.
    pub fn parse(
        date_from: Option<&str>,
        date_to: Option<&str>,
        project_id: Option<i64>,
        collaborator_id: Option<i64>,
        cost_profile_id: Option<i64>,
        manager_id: Option<i64>,
    ) -> AppResult<Self> {
        let date_from = date_from.map(parse_filter_date).transpose()?;
        let date_to = date_to.map(parse_filter_date).transpose()?;

        if let (Some(f), Some(t)) = (date_from, date_to)
            && f > t
        {
            return Err(AppError::validation(format!(
                "date_from {f} is after date_to {t}"
            )));
        }

        Ok(Self {
            date_from,
            date_to,
            project_id,
            collaborator_id,
            cost_profile_id,
            manager_id,
        })
    }
}

fn parse_filter_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date '{s}' (YYYY-MM-DD)")))
}
