//! Per-user settings: timezone preferences validated against IANA names.

use std::collections::HashMap;

use anyhow::Result;
use chrono_tz::Tz;

#[derive(Debug, Default)]
pub struct UserSettings {
    timezones: HashMap<u64, Tz>,
}

impl UserSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a timezone like "America/Chicago".
    pub fn set_timezone(&mut self, user_id: u64, name: &str) -> Result<Tz> {
        let tz: Tz = name
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {name}"))?;
        self.timezones.insert(user_id, tz);
        Ok(tz)
    }

    pub fn timezone(&self, user_id: u64) -> Option<Tz> {
        self.timezones.get(&user_id).copied()
    }

    pub fn timezone_or(&self, user_id: u64, fallback: Tz) -> Tz {
        self.timezone(user_id).unwrap_or(fallback)
    }
}
