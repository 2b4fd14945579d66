//! Free-text task field extraction: title, due date, priority, tags.
//!
//! Extraction never fails. A field with no detectable phrase degrades to its
//! default: Medium priority, no due date, no tags, truncated-prefix title.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::task::Priority;
use crate::timeparse;

/// Tunables for extraction. The keyword table is data so deployments can
/// localize or extend it without touching the matching logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Fallback title length when stripping leaves nothing usable.
    pub title_max_len: usize,
    /// Keep the input casing instead of title-casing the derived title.
    pub preserve_case: bool,
    /// Hour used when a day anchor carries no clock time.
    pub default_hour: u32,
    /// Priority keyword sets, scanned in order; first matching set wins.
    pub priority_keywords: Vec<(Priority, Vec<String>)>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            title_max_len: 50,
            preserve_case: false,
            default_hour: 9,
            priority_keywords: vec![
                (Priority::Urgent, words(&["urgent", "asap", "emergency", "critical"])),
                (Priority::High, words(&["important", "high", "priority"])),
                (Priority::Low, words(&["low", "whenever", "sometime"])),
            ],
        }
    }
}

/// Fields derived from one piece of input text.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub tags: BTreeSet<String>,
}

/// Derive task fields from raw text against an injected "now" and timezone.
pub fn extract_fields(
    text: &str,
    now: DateTime<Utc>,
    tz: Tz,
    cfg: &ExtractorConfig,
) -> TaskFields {
    TaskFields {
        title: derive_title(text, cfg),
        due_at: timeparse::detect_due(text, now, tz, cfg.default_hour),
        priority: detect_priority(text, cfg),
        tags: collect_tags(text),
    }
}

/// First matching keyword set wins; keyword sets are scanned in config order
/// (Urgent before High before Low by default). Tags count as words here, so
/// "#critical" still reads as urgent.
pub fn detect_priority(text: &str, cfg: &ExtractorConfig) -> Priority {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    for (level, keywords) in &cfg.priority_keywords {
        if tokens.iter().any(|t| keywords.iter().any(|k| k == t)) {
            return *level;
        }
    }
    Priority::Medium
}

/// Collect `#word` tokens, lowercased and deduplicated.
pub fn collect_tags(text: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    if let Ok(r) = Regex::new(r"#(\w+)") {
        for caps in r.captures_iter(text) {
            tags.insert(caps[1].to_lowercase());
        }
    }
    tags
}

fn replace_all(text: &str, pattern: &str, with: &str) -> String {
    match Regex::new(pattern) {
        Ok(r) => r.replace_all(text, with).into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Strip recognized priority/tag/time phrases and take the leading clause of
/// what remains. Falls back to a truncated prefix of the raw input so the
/// title is never empty for non-empty input.
pub fn derive_title(text: &str, cfg: &ExtractorConfig) -> String {
    let mut t = replace_all(text, r"#\w+", " ");

    for (_, keywords) in &cfg.priority_keywords {
        if keywords.is_empty() {
            continue;
        }
        let escaped: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
        t = replace_all(&t, &format!(r"(?i)\b({})\b", escaped.join("|")), " ");
    }

    t = timeparse::strip_temporal(&t);
    t = replace_all(
        &t,
        r"(?i)^\s*(please\s+)?(remind me to|add a task to|create a task to|add|create|schedule|set up|set|make)\s+",
        " ",
    );

    let mut t = t
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_string();

    // Leading clause only: cut at the first strong punctuation mark.
    if let Some(i) = t.find(['.', '!', '?', ';', ':']) {
        t.truncate(i);
    }

    let mut title: String = t.split_whitespace().collect::<Vec<_>>().join(" ");
    title = title
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_string();

    if title.is_empty() {
        title = text.trim().chars().take(cfg.title_max_len).collect();
        title = title.trim().to_string();
    }
    if title.is_empty() {
        title = text.chars().take(cfg.title_max_len).collect();
    }

    if title.chars().count() > 100 {
        title = title.chars().take(97).collect::<String>() + "...";
    }

    if cfg.preserve_case {
        title
    } else {
        title_case(&title)
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn cfg() -> ExtractorConfig {
        ExtractorConfig::default()
    }

    fn jan1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn groceries_tomorrow_afternoon() {
        let f = extract_fields("Buy groceries tomorrow at 5pm", jan1(), chrono_tz::UTC, &cfg());
        assert_eq!(f.title, "Buy Groceries");
        assert_eq!(f.due_at, Some(Utc.with_ymd_and_hms(2024, 1, 2, 17, 0, 0).unwrap()));
        assert_eq!(f.priority, Priority::Medium);
        assert!(f.tags.is_empty());
    }

    #[test]
    fn urgent_prefix_and_tags_leave_the_title() {
        let f = extract_fields(
            "Urgent: Fix server issue #work #critical",
            jan1(),
            chrono_tz::UTC,
            &cfg(),
        );
        assert_eq!(f.priority, Priority::Urgent);
        assert_eq!(
            f.tags,
            BTreeSet::from(["work".to_string(), "critical".to_string()])
        );
        assert!(!f.title.to_lowercase().contains("urgent"));
        assert!(!f.title.contains('#'));
        assert!(!f.title.to_lowercase().contains("work"));
        assert_eq!(f.title, "Fix Server Issue");
    }

    #[test]
    fn plain_task_with_one_tag() {
        let f = extract_fields("Clean desk #organization", jan1(), chrono_tz::UTC, &cfg());
        assert_eq!(f.priority, Priority::Medium);
        assert_eq!(f.tags, BTreeSet::from(["organization".to_string()]));
        assert_eq!(f.due_at, None);
        assert_eq!(f.title, "Clean Desk");
    }

    #[test]
    fn priority_precedence_urgent_beats_high_beats_low() {
        assert_eq!(detect_priority("urgent and important", &cfg()), Priority::Urgent);
        assert_eq!(detect_priority("important but low effort", &cfg()), Priority::High);
        assert_eq!(detect_priority("low stakes, whenever", &cfg()), Priority::Low);
        assert_eq!(detect_priority("just a note", &cfg()), Priority::Medium);
    }

    #[test]
    fn tags_dedupe_case_folded() {
        let tags = collect_tags("ship it #Work #work #WORK #ops");
        assert_eq!(tags, BTreeSet::from(["work".to_string(), "ops".to_string()]));
    }

    #[test]
    fn title_never_empty_for_nonempty_input() {
        for input in ["tomorrow 5pm", "!!!", "#tag", "asap", "at 3pm in 2 hours"] {
            let f = extract_fields(input, jan1(), chrono_tz::UTC, &cfg());
            assert!(!f.title.trim().is_empty(), "empty title for {input:?}");
        }
    }

    #[test]
    fn extraction_is_idempotent_under_fixed_now() {
        let input = "Urgent: prep slides tomorrow at 9am #talks";
        let a = extract_fields(input, jan1(), chrono_tz::UTC, &cfg());
        let b = extract_fields(input, jan1(), chrono_tz::UTC, &cfg());
        assert_eq!(a, b);
    }

    #[test]
    fn preserve_case_keeps_input_casing() {
        let mut c = cfg();
        c.preserve_case = true;
        let f = extract_fields("buy groceries tomorrow", jan1(), chrono_tz::UTC, &c);
        assert_eq!(f.title, "buy groceries");
    }

    #[test]
    fn long_input_falls_back_to_truncated_prefix() {
        // Every word here is a strippable phrase, so the fallback kicks in.
        let f = extract_fields("tomorrow at 5pm", jan1(), chrono_tz::UTC, &cfg());
        assert_eq!(f.title, "Tomorrow At 5pm");
    }
}
