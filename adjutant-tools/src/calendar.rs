//! Process-local calendar store behind the calendar tools.
//!
//! Real calendar backends live outside this repository; the tool server keeps
//! events in memory so scheduling flows are exercisable end to end.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const WORK_START_HOUR: u32 = 9;
pub const WORK_END_HOUR: u32 = 17;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: u64,
    pub user_id: u64,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotProposal {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CalendarInner {
    next_id: u64,
    events: Vec<EventRecord>,
}

#[derive(Debug, Default)]
pub struct CalendarStore {
    inner: Mutex<CalendarInner>,
}

/// Round up to the next 15-minute boundary.
fn ceil_to_quarter_hour(dt: DateTime<Utc>) -> DateTime<Utc> {
    let minute = dt.minute();
    let add = match minute % 15 {
        0 => 0,
        r => 15 - r,
    };
    let out = dt + Duration::minutes(add.into());
    out.with_second(0).unwrap().with_nanosecond(0).unwrap()
}

fn day_at(dt: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let naive = dt
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .unwrap_or_else(|| dt.naive_utc());
    Utc.from_utc_datetime(&naive)
}

impl CalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, CalendarInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an event and return its link.
    pub fn create_event(
        &self,
        user_id: u64,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> String {
        let mut inner = self.locked();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.events.push(EventRecord {
            id,
            user_id,
            summary: summary.to_string(),
            start,
            end,
        });
        format!("event://{user_id}/{id}")
    }

    /// Events starting on the same UTC day as `now`, ordered by start.
    pub fn list_today(&self, user_id: u64, now: DateTime<Utc>) -> Vec<EventRecord> {
        let today = now.date_naive();
        let mut out: Vec<EventRecord> = self
            .locked()
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.start.date_naive() == today)
            .cloned()
            .collect();
        out.sort_by_key(|e| e.start);
        out
    }

    /// Propose up to `count` free slots of `minutes` length within working
    /// hours over the next seven days, skipping existing events. Slots are
    /// aligned to quarter-hour boundaries.
    pub fn propose_slots(
        &self,
        user_id: u64,
        minutes: i64,
        count: usize,
        now: DateTime<Utc>,
    ) -> Vec<SlotProposal> {
        let mut events: Vec<EventRecord> = self
            .locked()
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);

        let horizon = now + Duration::days(7);
        let length = Duration::minutes(minutes);
        let mut out = Vec::new();
        let mut cursor = ceil_to_quarter_hour(now);

        while out.len() < count && cursor < horizon {
            let work_start = day_at(cursor, WORK_START_HOUR);
            let work_end = day_at(cursor, WORK_END_HOUR);

            if cursor < work_start {
                cursor = work_start;
                continue;
            }
            let slot_end = cursor + length;
            if slot_end > work_end {
                cursor = day_at(cursor + Duration::days(1), WORK_START_HOUR);
                continue;
            }

            if let Some(conflict) = events
                .iter()
                .find(|e| e.start < slot_end && cursor < e.end)
            {
                cursor = ceil_to_quarter_hour(conflict.end);
                continue;
            }

            out.push(SlotProposal {
                start: cursor,
                end: slot_end,
            });
            cursor = slot_end;
        }

        out
    }
}
