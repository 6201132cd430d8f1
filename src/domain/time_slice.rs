//! PTU identity: the canonical (calendar date, slice number) pair that every
//! forecast, order and settlement row in the market is keyed on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WorkflowError;

/// Minutes in a civil day. DST-variable days are the calendar owner's
/// concern; planboard repositories provision the actual PTU containers.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Number of PTUs in a day of `duration_minutes`-minute slices.
pub fn ptus_per_day(duration_minutes: u32) -> Result<u32, WorkflowError> {
    if duration_minutes == 0 || MINUTES_PER_DAY % duration_minutes != 0 {
        return Err(WorkflowError::Invariant(format!(
            "PTU duration of {duration_minutes} minutes does not divide a day evenly"
        )));
    }
    Ok(MINUTES_PER_DAY / duration_minutes)
}

/// Identity of one Program Time Unit: a trading day plus a 1-based slice
/// index within that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PtuId {
    period: NaiveDate,
    index: u32,
}

impl PtuId {
    /// Build a PTU id, enforcing `1 <= index <= ptus_in_day`.
    pub fn new(period: NaiveDate, index: u32, ptus_in_day: u32) -> Result<Self, WorkflowError> {
        if index == 0 || index > ptus_in_day {
            return Err(WorkflowError::Invariant(format!(
                "PTU index {index} outside 1..={ptus_in_day} for {period}"
            )));
        }
        Ok(Self { period, index })
    }

    pub fn period(&self) -> NaiveDate {
        self.period
    }

    /// 1-based index within the day.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for PtuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.period, self.index)
    }
}

/// Decompose a trading day into its ordered PTUs.
pub fn slices_of_day(period: NaiveDate, duration_minutes: u32) -> Result<Vec<PtuId>, WorkflowError> {
    let count = ptus_per_day(duration_minutes)?;
    (1..=count)
        .map(|index| PtuId::new(period, index, count))
        .collect()
}
