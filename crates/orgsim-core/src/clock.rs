//! Simulation clock: days grouped into fiscal periods.
//!
//! The clock is the single source of truth for time. The engine copies
//! [`SimClock::time`] into the world state after every advance so policies
//! can read it.
//!
//! All counters use checked arithmetic; overflow is a [`ClockError`], never
//! a silent wrap.

use orgsim_types::SimTime;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The date counter would overflow.
    #[error("date counter overflow: cannot advance beyond u64::MAX")]
    DateOverflow,

    /// The period counter would overflow.
    #[error("period counter overflow: cannot advance beyond u64::MAX")]
    PeriodOverflow,

    /// A day was started after the period's last day.
    #[error("period {period} already ran all {fiscal_length} days")]
    PeriodExhausted {
        /// The period that is full.
        period: u64,
        /// Days per period.
        fiscal_length: u32,
    },

    /// Invalid time configuration.
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Clock advancing one day at a time within fixed-length periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    time: SimTime,
    fiscal_length: u32,
}

impl SimClock {
    /// Create a clock at date 0, period 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `fiscal_length` is 0.
    pub fn new(fiscal_length: u32) -> Result<Self, ClockError> {
        Self::from_parts(SimTime::start(), fiscal_length)
    }

    /// Create a clock at an arbitrary time (useful for restoration and tests).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `fiscal_length` is 0 or
    /// `time.day_of_period` exceeds it.
    pub fn from_parts(time: SimTime, fiscal_length: u32) -> Result<Self, ClockError> {
        if fiscal_length == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "fiscal_length must be at least 1".to_owned(),
            });
        }
        if time.day_of_period > fiscal_length {
            return Err(ClockError::InvalidConfig {
                reason: format!(
                    "day_of_period {} exceeds fiscal_length {fiscal_length}",
                    time.day_of_period
                ),
            });
        }
        Ok(Self {
            time,
            fiscal_length,
        })
    }

    /// Current time.
    pub const fn time(&self) -> SimTime {
        self.time
    }

    /// Days per period.
    pub const fn fiscal_length(&self) -> u32 {
        self.fiscal_length
    }

    /// Whether every day of the current period has run.
    pub const fn period_complete(&self) -> bool {
        self.time.day_of_period >= self.fiscal_length
    }

    /// Record the end of a day. Returns the new date.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::PeriodExhausted`] if the period is already
    /// complete, or [`ClockError::DateOverflow`] on overflow.
    pub fn advance_day(&mut self) -> Result<u64, ClockError> {
        if self.period_complete() {
            return Err(ClockError::PeriodExhausted {
                period: self.time.period,
                fiscal_length: self.fiscal_length,
            });
        }
        let date = self.time.date.checked_add(1).ok_or(ClockError::DateOverflow)?;
        // Bounded by fiscal_length, checked above.
        let day = self.time.day_of_period.saturating_add(1);
        self.time.date = date;
        self.time.day_of_period = day;
        Ok(date)
    }

    /// Start the next period. Returns the new period index.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::PeriodOverflow`] on overflow.
    pub fn advance_period(&mut self) -> Result<u64, ClockError> {
        let period = self
            .time
            .period
            .checked_add(1)
            .ok_or(ClockError::PeriodOverflow)?;
        self.time.period = period;
        self.time.day_of_period = 0;
        Ok(period)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_zero() {
        let clock = SimClock::new(30).unwrap();
        assert_eq!(clock.time(), SimTime::start());
        assert_eq!(clock.fiscal_length(), 30);
        assert!(!clock.period_complete());
    }

    #[test]
    fn zero_fiscal_length_rejected() {
        assert!(matches!(
            SimClock::new(0),
            Err(ClockError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn days_fill_a_period() {
        let mut clock = SimClock::new(3).unwrap();
        for expected in 1..=3 {
            assert_eq!(clock.advance_day().unwrap(), expected);
        }
        assert!(clock.period_complete());
        assert!(matches!(
            clock.advance_day(),
            Err(ClockError::PeriodExhausted { period: 0, .. })
        ));
    }

    #[test]
    fn new_period_resets_day_but_not_date() {
        let mut clock = SimClock::new(2).unwrap();
        clock.advance_day().unwrap();
        clock.advance_day().unwrap();
        assert_eq!(clock.advance_period().unwrap(), 1);
        let t = clock.time();
        assert_eq!((t.date, t.period, t.day_of_period), (2, 1, 0));
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = SimClock::from_parts(
            SimTime {
                date: u64::MAX,
                period: u64::MAX,
                day_of_period: 0,
            },
            5,
        )
        .unwrap();
        assert!(matches!(clock.advance_day(), Err(ClockError::DateOverflow)));
        assert!(matches!(clock.advance_period(), Err(ClockError::PeriodOverflow)));
    }

    #[test]
    fn from_parts_validates_day() {
        let time = SimTime {
            date: 0,
            period: 0,
            day_of_period: 9,
        };
        assert!(SimClock::from_parts(time, 5).is_err());
    }
}
