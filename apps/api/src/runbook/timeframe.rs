//! Timeframe selection: resolves the user's choice among the four scheduling modes
//! into a concrete `TimeframeSelection`.
//!
//! The selector only produces data. Prompt wording for each mode lives in the builder.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default length of a picked date range when the user does not supply an end date.
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// The four mutually exclusive modes offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeframeMode {
    DateRange,
    WeekdaysOnly,
    WeekendOnly,
    Default,
}

/// A resolved timeframe. `DateRange` does not require `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeframeSelection {
    DateRange { start: NaiveDate, end: NaiveDate },
    WeekdaysOnly,
    WeekendOnly,
    Default,
}

impl TimeframeSelection {
    /// A date range starting today and ending `DEFAULT_RANGE_DAYS` later.
    pub fn default_range(today: NaiveDate) -> Self {
        TimeframeSelection::DateRange {
            start: today,
            end: today + Duration::days(DEFAULT_RANGE_DAYS),
        }
    }

    pub fn mode(&self) -> TimeframeMode {
        match self {
            TimeframeSelection::DateRange { .. } => TimeframeMode::DateRange,
            TimeframeSelection::WeekdaysOnly => TimeframeMode::WeekdaysOnly,
            TimeframeSelection::WeekendOnly => TimeframeMode::WeekendOnly,
            TimeframeSelection::Default => TimeframeMode::Default,
        }
    }

    /// Human-readable label for the mode.
    pub fn label(&self) -> &'static str {
        self.mode().label()
    }

    /// The confirmation message shown after a choice is made.
    pub fn describe(&self) -> String {
        match self {
            TimeframeSelection::DateRange { start, end } => format!(
                "You selected specific dates from {} to {}.",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            TimeframeSelection::WeekdaysOnly => "You selected weekdays only.".to_string(),
            TimeframeSelection::WeekendOnly => "You selected weekend only.".to_string(),
            TimeframeSelection::Default => "You selected a general schedule.".to_string(),
        }
    }
}

impl TimeframeMode {
    /// Wording used in prompt task lines.
    pub fn label(self) -> &'static str {
        match self {
            TimeframeMode::DateRange => "date range",
            TimeframeMode::WeekdaysOnly => "weekdays",
            TimeframeMode::WeekendOnly => "weekend",
            TimeframeMode::Default => "general",
        }
    }
}

/// Raw timeframe input as submitted by a client. Dates are only read for `date_range`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeframeRequest {
    pub mode: TimeframeMode,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl TimeframeRequest {
    /// Builds a fresh selection. Missing dates default to `today` and `today + 7 days`.
    /// An inverted range is passed through unchanged.
    pub fn resolve(&self, today: NaiveDate) -> TimeframeSelection {
        match self.mode {
            TimeframeMode::DateRange => {
                let mut selection = TimeframeSelection::default_range(today);
                if let TimeframeSelection::DateRange { start, end } = &mut selection {
                    if let Some(picked) = self.start {
                        *start = picked;
                    }
                    if let Some(picked) = self.end {
                        *end = picked;
                    }
                    if start > end {
                        warn!(%start, %end, "Date range ends before it starts; using it as given");
                    }
                }
                selection
            }
            TimeframeMode::WeekdaysOnly => TimeframeSelection::WeekdaysOnly,
            TimeframeMode::WeekendOnly => TimeframeSelection::WeekendOnly,
            TimeframeMode::Default => TimeframeSelection::Default,
        }
    }
}
