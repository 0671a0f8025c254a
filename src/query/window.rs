//! Date window resolution
//!
//! Performance reports are bounded by `[start_date, end_date]`, recomputed
//! from the current date on every invocation. Nothing is persisted.

use crate::config::{TapConfig, DATE_FORMAT};
use crate::error::{Error, Result};
use chrono::{Days, NaiveDate};

/// Where a report's window starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStart {
    /// `today - performance_report_interval_days`
    Lookback,
    /// The configured `start_date`, falling back to the lookback start
    Configured,
}

/// Inclusive date range used in a GAQL `segments.date` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateWindow {
    /// Lookback window ending today
    ///
    /// Fails when the start would fall before the earliest representable date.
    pub fn lookback(today: NaiveDate, days: u32) -> Result<Self> {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| {
                Error::invalid_value(
                    "performance_report_interval_days",
                    format!("{days} days before {today} is out of range"),
                )
            })?;
        Ok(Self { start, end: today })
    }

    /// Resolve the window for a report from config and the current date
    pub fn resolve(start: WindowStart, config: &TapConfig, today: NaiveDate) -> Result<Self> {
        let lookback = Self::lookback(today, config.performance_report_interval_days)?;
        let start = match start {
            WindowStart::Lookback => lookback.start,
            WindowStart::Configured => config.start_date.unwrap_or(lookback.start),
        };
        let end = config.end_date.unwrap_or(lookback.end);
        Ok(Self { start, end })
    }

    /// Start as a quoted GAQL date literal: `'2024-02-09'`
    pub fn start_literal(&self) -> String {
        date_literal(self.start)
    }

    /// End as a quoted GAQL date literal
    pub fn end_literal(&self) -> String {
        date_literal(self.end)
    }
}

/// Format a date as a quoted GAQL literal
pub fn date_literal(date: NaiveDate) -> String {
    format!("'{}'", date.format(DATE_FORMAT))
}
