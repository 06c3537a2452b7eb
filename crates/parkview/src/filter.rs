//! Filter value object: which permit, on which day, at what time.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::lot::{Day, Permit, TimeOfDay};

/// Immutable evaluation context. A new filter means every lot is re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub permit: Permit,
    pub day: Day,
    pub time: TimeOfDay,
}

/// What the lot API assumes for omitted query params: no permit, Monday 09:00.
impl Default for Filter {
    fn default() -> Self {
        Self {
            permit: Permit::None,
            day: Day::Mon,
            time: TimeOfDay::NINE_AM,
        }
    }
}

impl Filter {
    pub fn new(permit: Permit, day: Day, time: TimeOfDay) -> Self {
        Self { permit, day, time }
    }

    /// No permit, at the local wall-clock day and minute.
    pub fn now() -> Self {
        Self::at(Permit::None, Local::now().naive_local())
    }

    pub fn at(permit: Permit, when: NaiveDateTime) -> Self {
        let time = TimeOfDay::from_hm(when.hour() as u8, when.minute() as u8)
            .unwrap_or(TimeOfDay::MIDNIGHT);
        Self {
            permit,
            day: when.weekday().into(),
            time,
        }
    }

    pub fn with_permit(mut self, permit: Permit) -> Self {
        self.permit = permit;
        self
    }

    /// Query parameters for `GET /api/lots`.
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("permit", self.permit.to_string()),
            ("day", self.day.to_string()),
            ("time", self.time.to_string()),
        ]
    }
}
