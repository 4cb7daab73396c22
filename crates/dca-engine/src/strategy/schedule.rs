//! Purchase Schedule
//!
//! The one place cadence stepping happens. The simulator, generic asset DCA,
//! savings comparison and future projection all walk dates through here.

use chrono::NaiveDate;

use crate::model::{Frequency, SimulationParameters};

/// Iterator over scheduled purchase dates in `[start, end]`.
///
/// Steps are applied one after another, so monthly schedules that clamp at
/// a short month keep the clamped day afterwards (Jan 31 -> Feb 29 -> Mar 29).
#[derive(Clone, Debug)]
pub struct Schedule {
    next: Option<NaiveDate>,
    end: NaiveDate,
    frequency: Frequency,
}

impl Schedule {
    pub fn new(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Self {
        Self {
            next: Some(start),
            end,
            frequency,
        }
    }

    pub fn for_parameters(params: &SimulationParameters) -> Self {
        Self::new(params.start_date, params.end_date, params.frequency)
    }

    /// Dates strictly after `after`, up to `end`
    pub fn following(after: NaiveDate, end: NaiveDate, frequency: Frequency) -> Self {
        Self {
            next: frequency.advance(after),
            end,
            frequency,
        }
    }
}

impl Iterator for Schedule {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = self.frequency.advance(current);
        Some(current)
    }
}
