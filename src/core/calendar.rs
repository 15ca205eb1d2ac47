//! Working-day calendars used by capacity planning.

use crate::config::Config;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

pub trait BusinessCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool;

    /// Business days in `[from, to]`, both inclusive. Empty when `from > to`.
    fn business_days(&self, from: NaiveDate, to: NaiveDate) -> u32 {
        from.iter_days()
            .take_while(|d| *d <= to)
            .filter(|d| self.is_business_day(*d))
            .count() as u32
    }
}

/// Monday to Friday, minus the holidays listed in the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredCalendar {
    holidays: HashSet<NaiveDate>,
}

impl ConfiguredCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.holidays.iter().copied())
    }
}

impl BusinessCalendar for ConfiguredCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }
}
