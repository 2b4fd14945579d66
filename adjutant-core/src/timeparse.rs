//! Temporal phrase detection: day anchors, clock times, durations, offsets.
//!
//! Day-anchor patterns are tried in a fixed order and the first match wins;
//! a clock time anywhere in the text refines the hour. Resolution happens in
//! the caller's timezone against a caller-supplied "now", never an ambient
//! clock. Anything unparsable is simply left undetected.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

const WEEKDAY_PATTERN: &str = r"(?i)\b(?:(this|next)\s+)?(mon|monday|tue|tues|tuesday|wed|weds|wednesday|thu|thur|thurs|thursday|fri|friday|sat|saturday|sun|sunday)\b";

fn re(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

fn has(text: &str, pattern: &str) -> bool {
    Regex::new(pattern).map(|r| r.is_match(text)).unwrap_or(false)
}

/// Extract an explicit clock time: "3pm", "10:30am", "15:30".
pub fn clock_time(text: &str) -> Option<(u32, u32)> {
    if let Some(r12) = re(r"(?i)\b(1[0-2]|0?[1-9])(?::([0-5][0-9]))?\s?(am|pm)\b") {
        if let Some(c) = r12.captures(text) {
            let mut hour: u32 = c[1].parse().ok()?;
            hour %= 12;
            let minute: u32 = match c.get(2) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            if c[3].eq_ignore_ascii_case("pm") {
                hour += 12;
            }
            return Some((hour, minute));
        }
    }
    if let Some(r24) = re(r"\b([01]?[0-9]|2[0-3]):([0-5][0-9])\b") {
        if let Some(c) = r24.captures(text) {
            return Some((c[1].parse().ok()?, c[2].parse().ok()?));
        }
    }
    None
}

pub fn contains_clock_time(text: &str) -> bool {
    clock_time(text).is_some()
}

/// Extract an event duration: "for 45m", "for 1.5 hours".
pub fn duration_minutes(text: &str) -> Option<i64> {
    let caps = re(r"(?i)\bfor\s+(\d+(?:\.\d+)?)\s*(hours?|hrs?|h|minutes?|mins?|m)\b")?.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    let minutes = if caps[2].to_lowercase().starts_with('h') {
        value * 60.0
    } else {
        value
    };
    Some(minutes.round() as i64)
}

/// Extract a relative offset: "in 2 hours", "in 30 mins", "in 3 days".
fn relative_offset(text: &str) -> Option<Duration> {
    let caps =
        re(r"(?i)\bin\s+(\d{1,4})\s*(hours?|hrs?|h|minutes?|mins?|m|days?|d)\b")?.captures(text)?;
    let value: i64 = caps[1].parse().ok()?;
    match caps[2].to_lowercase().chars().next()? {
        'h' => Some(Duration::hours(value)),
        'd' => Some(Duration::days(value)),
        _ => Some(Duration::minutes(value)),
    }
}

fn weekday_index(name: &str) -> Option<i64> {
    let idx = match name.to_lowercase().as_str() {
        "mon" | "monday" => 0,
        "tue" | "tues" | "tuesday" => 1,
        "wed" | "weds" | "wednesday" => 2,
        "thu" | "thur" | "thurs" | "thursday" => 3,
        "fri" | "friday" => 4,
        "sat" | "saturday" => 5,
        "sun" | "sunday" => 6,
        _ => return None,
    };
    Some(idx)
}

fn weekday_phrase(text: &str) -> Option<(Option<String>, i64)> {
    let caps = re(WEEKDAY_PATTERN)?.captures(text)?;
    let qualifier = caps.get(1).map(|m| m.as_str().to_lowercase());
    let target = weekday_index(caps.get(2)?.as_str())?;
    Some((qualifier, target))
}

/// Resolve a local wall-clock time to UTC. DST gaps and ambiguous local times
/// resolve to `None` so callers treat the phrase as undetected.
fn local_at(date: NaiveDate, (hour, minute): (u32, u32), tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    let local = tz.from_local_datetime(&naive).single()?;
    Some(local.with_timezone(&Utc))
}

fn next_weekday(
    local_now: DateTime<Tz>,
    target: i64,
    time: (u32, u32),
    qualifier: Option<&str>,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    let today_idx = local_now.weekday().num_days_from_monday() as i64;
    let mut days_ahead = (target - today_idx).rem_euclid(7);

    if qualifier == Some("next") {
        if days_ahead == 0 {
            days_ahead = 7;
        }
    } else if days_ahead == 0 {
        // "this <weekday>" or bare name: today counts unless the time already passed.
        let candidate = local_at(local_now.date_naive(), time, tz)?;
        if candidate <= local_now.with_timezone(&Utc) {
            days_ahead = 7;
        }
    }

    local_at(local_now.date_naive() + Duration::days(days_ahead), time, tz)
}

/// Detect a due timestamp from free text.
///
/// Scan order (first match wins when several phrases appear):
/// tomorrow, tonight, today, "next week", "this weekend", weekday phrase,
/// bare clock time, relative offset.
pub fn detect_due(
    text: &str,
    now: DateTime<Utc>,
    tz: Tz,
    default_hour: u32,
) -> Option<DateTime<Utc>> {
    let local_now = now.with_timezone(&tz);
    let today = local_now.date_naive();
    let clock = clock_time(text);
    let fallback = (default_hour.min(23), 0);

    if has(text, r"(?i)\btomorrow\b") {
        return local_at(today + Duration::days(1), clock.unwrap_or(fallback), tz);
    }
    if has(text, r"(?i)\btonight\b") {
        return local_at(today, clock.unwrap_or((20, 0)), tz);
    }
    if has(text, r"(?i)\btoday\b") {
        return local_at(today, clock.unwrap_or(fallback), tz);
    }
    if has(text, r"(?i)\bnext\s+week\b") {
        return local_at(today + Duration::days(7), clock.unwrap_or(fallback), tz);
    }
    if has(text, r"(?i)\bthis\s+weekend\b") {
        let days_ahead = (5 - today.weekday().num_days_from_monday() as i64).rem_euclid(7);
        return local_at(today + Duration::days(days_ahead), clock.unwrap_or(fallback), tz);
    }
    if let Some((qualifier, target)) = weekday_phrase(text) {
        return next_weekday(local_now, target, clock.unwrap_or(fallback), qualifier.as_deref(), tz);
    }
    if let Some((h, m)) = clock {
        let candidate = local_at(today, (h, m), tz)?;
        if candidate <= now {
            return local_at(today + Duration::days(1), (h, m), tz);
        }
        return Some(candidate);
    }
    if let Some(offset) = relative_offset(text) {
        return Some(now + offset);
    }
    None
}

/// Remove recognized temporal phrases (and their connective words) from text.
/// Used when deriving a task title.
pub fn strip_temporal(text: &str) -> String {
    let mut out = text.to_string();
    let patterns = [
        r"(?i)\bfor\s+\d+(?:\.\d+)?\s*(hours?|hrs?|h|minutes?|mins?|m)\b",
        r"(?i)\bin\s+\d{1,4}\s*(hours?|hrs?|h|minutes?|mins?|m|days?|d)\b",
        r"(?i)\b(1[0-2]|0?[1-9])(:[0-5][0-9])?\s?(am|pm)\b",
        r"\b([01]?[0-9]|2[0-3]):([0-5][0-9])\b",
        WEEKDAY_PATTERN,
        r"(?i)\b(today|tomorrow|tonight)\b",
        r"(?i)\b(this|next)\s+(week|weekend|month|morning|afternoon|evening)\b",
        r"(?i)\b(at|on|from|to|by|around|about)\b",
    ];
    for pattern in patterns {
        if let Some(r) = re(pattern) {
            out = r.replace_all(&out, " ").into_owned();
        }
    }
    out
}
