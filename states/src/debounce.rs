use chrono::{DateTime, TimeDelta, Utc};

/// Timer-based coalescing queue.
///
/// Each [`Debouncer::push`] restarts the quiet window; [`Debouncer::poll`] yields the
/// latest pushed value once the window has elapsed. With [`Debouncer::distinct`] a
/// value equal to the previously emitted one is swallowed.
///
/// Time is passed in explicitly so callers can drive it from the `Time` state.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: TimeDelta,
    distinct: bool,
    pending: Option<(T, DateTime<Utc>)>,
    last_emitted: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(window: TimeDelta) -> Self {
        Self {
            window,
            distinct: false,
            pending: None,
            last_emitted: None,
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self::new(TimeDelta::milliseconds(millis))
    }

    /// Suppress emissions equal to the last emitted value.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn push(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|(_, at)| *at + self.window)
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<T> {
        let due = self.next_deadline()?;
        if now < due {
            return None;
        }

        let (value, _) = self.pending.take()?;
        if self.distinct && self.last_emitted.as_ref() == Some(&value) {
            return None;
        }

        self.last_emitted = Some(value.clone());
        Some(value)
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Drops the pending value and forgets the last emitted one, so the next value
    /// is emitted even if it repeats an earlier emission.
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_emitted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: DateTime<Utc>, millis: i64) -> DateTime<Utc> {
        base + TimeDelta::milliseconds(millis)
    }

    #[test]
    fn burst_collapses_to_last_value() {
        let t0 = Utc::now();
        let mut debouncer = Debouncer::from_millis(400);

        debouncer.push("abc", t0);
        assert_eq!(debouncer.poll(at(t0, 100)), None);
        debouncer.push("abcd", at(t0, 150));

        assert_eq!(debouncer.poll(at(t0, 450)), None, "window restarted");
        assert_eq!(debouncer.poll(at(t0, 550)), Some("abcd"));
        assert_eq!(debouncer.poll(at(t0, 2000)), None);
    }

    #[test]
    fn deadline_follows_latest_push() {
        let t0 = Utc::now();
        let mut debouncer = Debouncer::from_millis(200);
        assert_eq!(debouncer.next_deadline(), None);

        debouncer.push(1, t0);
        debouncer.push(2, at(t0, 50));

        assert_eq!(debouncer.next_deadline(), Some(at(t0, 250)));
    }

    #[test]
    fn distinct_suppresses_repeated_value() {
        let t0 = Utc::now();
        let mut debouncer = Debouncer::from_millis(400).distinct();

        debouncer.push("x".to_owned(), t0);
        assert_eq!(debouncer.poll(at(t0, 400)), Some("x".to_owned()));

        debouncer.push("x".to_owned(), at(t0, 500));
        assert_eq!(debouncer.poll(at(t0, 1000)), None);
        assert!(!debouncer.is_pending());

        debouncer.push("y".to_owned(), at(t0, 1100));
        assert_eq!(debouncer.poll(at(t0, 1500)), Some("y".to_owned()));
    }

    #[test]
    fn without_distinct_repeats_are_emitted() {
        let t0 = Utc::now();
        let mut debouncer = Debouncer::from_millis(10);

        debouncer.push(5, t0);
        assert_eq!(debouncer.poll(at(t0, 10)), Some(5));
        debouncer.push(5, at(t0, 20));
        assert_eq!(debouncer.poll(at(t0, 30)), Some(5));
    }

    #[test]
    fn cancel_drops_pending_value() {
        let t0 = Utc::now();
        let mut debouncer = Debouncer::from_millis(10);
        debouncer.push(1, t0);
        debouncer.cancel();
        assert_eq!(debouncer.poll(at(t0, 100)), None);
    }

    #[test]
    fn reset_lets_a_repeated_value_through() {
        let t0 = Utc::now();
        let mut debouncer = Debouncer::from_millis(10).distinct();
        debouncer.push("ann", t0);
        assert_eq!(debouncer.poll(at(t0, 10)), Some("ann"));

        debouncer.reset();
        debouncer.push("ann", at(t0, 20));
        assert_eq!(debouncer.poll(at(t0, 30)), Some("ann"));
    }
}
