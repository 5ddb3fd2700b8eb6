//! Wall clock abstraction so "now"-based window matching can be pinned in tests.

use crate::utils::time::TimeZoneSetting;
use chrono::NaiveDateTime;
use std::cell::Cell;

pub trait Clock {
    /// Current wall-clock time in the configured time zone.
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock {
    zone: TimeZoneSetting,
}

impl SystemClock {
    pub fn new(zone: TimeZoneSetting) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        self.zone.now()
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    at: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at: Cell::new(at) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.at.set(at);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at.get()
    }
}
