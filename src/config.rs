// Report policy constants and the per-run configuration value.
use crate::error::{ReportError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use clap::ValueEnum;
use tracing::warn;

/// Closed opportunities a manager (or category) needs before its win rate is ranked.
pub const MANAGER_MIN_CLOSED: usize = 5;

/// Closed opportunities required in core-lines views and the core vs all comparison.
pub const CORE_MIN_CLOSED: usize = 3;

/// Managers shown in volume charts.
pub const MANAGER_CHART_TOP_N: usize = 10;

/// Business types shown in the fine-grained volume chart.
pub const BUSINESS_TYPE_CHART_TOP_N: usize = 15;

/// Rows/columns kept in the combined manager cross-tabs.
pub const CROSSTAB_TOP_N: usize = 5;

/// Renewal types the gateway keeps; everything else is new business.
pub const RENEWAL_TYPES: &[&str] = &["Personal Lines - Renewal", "Commercial Lines - Renewal"];

pub const NOT_SPECIFIED: &str = "Not Specified";
pub const NOT_ASSIGNED: &str = "Not Assigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    #[value(name = "last-7-days")]
    Last7Days,
    #[value(name = "last-30-days")]
    Last30Days,
    #[value(name = "last-quarter")]
    LastQuarter,
    #[value(name = "year-to-date")]
    YearToDate,
}

impl Period {
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            Period::Last7Days => today - Duration::days(7),
            Period::Last30Days => today - Duration::days(30),
            Period::LastQuarter => today - Duration::days(90),
            Period::YearToDate => today.with_ordinal(1).unwrap_or(today),
        };
        (start, today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewBy {
    Both,
    LineOfBusiness,
    BusinessCategories,
    AccountManager,
}

impl ViewBy {
    pub fn shows_categories(&self) -> bool {
        matches!(self, ViewBy::Both | ViewBy::BusinessCategories)
    }

    pub fn shows_business_types(&self) -> bool {
        matches!(self, ViewBy::Both | ViewBy::LineOfBusiness)
    }

    pub fn shows_managers(&self) -> bool {
        matches!(self, ViewBy::Both | ViewBy::AccountManager)
    }

    pub fn shows_combined(&self) -> bool {
        matches!(self, ViewBy::Both)
    }
}

/// Everything a report run depends on besides the records themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub view: ViewBy,
    pub show_tables: bool,
    pub show_percentages: bool,
    pub exclude_marine: bool,
}

impl ReportConfig {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            view: ViewBy::Both,
            show_tables: true,
            show_percentages: true,
            exclude_marine: false,
        }
    }
}

/// Pick the reporting window.
///
/// An explicit `start`/`end` pair wins over the preset and is swapped if
/// given in reverse order. With neither, the preset applies (default: last
/// 30 days).
pub fn resolve_date_range(
    period: Option<Period>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => {
            warn!(start = %s, end = %e, "start date is after end date, swapping");
            Ok((e, s))
        }
        (Some(s), Some(e)) => Ok((s, e)),
        (None, None) => Ok(period.unwrap_or(Period::Last30Days).range(today)),
        (start, end) => Err(ReportError::IncompleteRange { start, end }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn presets_are_relative_to_today() {
        let today = d(2024, 5, 15);
        assert_eq!(Period::Last7Days.range(today), (d(2024, 5, 8), today));
        assert_eq!(Period::Last30Days.range(today), (d(2024, 4, 15), today));
        assert_eq!(Period::LastQuarter.range(today), (d(2024, 2, 15), today));
        assert_eq!(Period::YearToDate.range(today), (d(2024, 1, 1), today));
    }

    #[test]
    fn custom_range_is_swapped_when_reversed() {
        let today = d(2024, 5, 15);
        let range = resolve_date_range(None, Some(d(2024, 3, 1)), Some(d(2024, 1, 1)), today).unwrap();
        assert_eq!(range, (d(2024, 1, 1), d(2024, 3, 1)));
    }

    #[test]
    fn custom_range_overrides_preset() {
        let today = d(2024, 5, 15);
        let range = resolve_date_range(
            Some(Period::YearToDate),
            Some(d(2023, 1, 1)),
            Some(d(2023, 6, 30)),
            today,
        )
        .unwrap();
        assert_eq!(range, (d(2023, 1, 1), d(2023, 6, 30)));
    }

    #[test]
    fn half_open_range_is_rejected() {
        let today = d(2024, 5, 15);
        let err = resolve_date_range(None, Some(d(2024, 1, 1)), None, today).unwrap_err();
        assert!(matches!(err, ReportError::IncompleteRange { .. }));
    }

    #[test]
    fn default_is_last_30_days() {
        let today = d(2024, 5, 15);
        assert_eq!(
            resolve_date_range(None, None, None, today).unwrap(),
            Period::Last30Days.range(today)
        );
    }
}
