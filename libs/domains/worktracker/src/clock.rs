use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;

/// Source of "now" for the store and service.
///
/// Injected at construction so tests pin time with [`FixedClock`] instead of
/// patching the global clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Test support.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("fixed clock poisoned") = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("fixed clock poisoned");
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("fixed clock poisoned")
    }
}
