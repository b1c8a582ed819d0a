//! Daily maintenance reset.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

/// Reason sent to every client when the world is wiped.
pub const RESET_NOTICE: &str = "Server Reset (Daily Maintenance)";

/// Fires once per calendar day during the first minute after local midnight.
///
/// Polled every second; the minute-wide window tolerates a late or skipped poll.
#[derive(Debug, Default)]
pub struct DailyReset {
    last_reset: Option<NaiveDate>,
}

impl DailyReset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_due(&mut self, now: NaiveDateTime) -> bool {
        if now.hour() != 0 || now.minute() != 0 {
            return false;
        }

        let today = now.date();
        if self.last_reset == Some(today) {
            return false;
        }

        self.last_reset = Some(today);
        true
    }

    pub fn is_due_now(&mut self) -> bool {
        self.is_due(Local::now().naive_local())
    }
}
