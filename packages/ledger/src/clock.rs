//! Source of "now" for the ledger.
//!
//! Due-date classification, payment stamps and approval dates all depend on
//! the current date, so it is injected rather than read ambiently.

use std::cell::Cell;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar date used for due-date comparisons.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock. `today` follows the local timezone, as a cashier would read it.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock that only moves when told to.
#[derive(Clone, Debug)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Midnight UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self::at(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }

    pub fn set(&self, date: NaiveDate) {
        self.now
            .set(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    pub fn advance_days(&self, days: u64) {
        let now = self.now.get();
        self.now
            .set(now.checked_add_days(Days::new(days)).unwrap_or(now));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
