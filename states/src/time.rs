use std::any::Any;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{State, state_assign_impl};

/// Frame clock. Refreshed by the app loop; tests set it by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time(DateTime<Utc>);

impl Default for Time {
    fn default() -> Self {
        Self(Utc::now())
    }
}

impl Time {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    pub fn refresh(&mut self) {
        self.0 = Utc::now();
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.0 = now;
    }

    pub fn advance(&mut self, delta: TimeDelta) {
        self.0 += delta;
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl AsRef<DateTime<Utc>> for Time {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl State for Time {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
