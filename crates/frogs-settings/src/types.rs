//! Settings schema. Field names are camelCase on disk.

use std::path::PathBuf;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrogsSettings {
    pub storage: StorageSettings,
    pub reminder: ReminderSettings,
    pub logging: LoggingSettings,
}

/// Where task documents live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    pub db_path: String,
    pub big_frogs_key: String,
    pub daily_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_path: frogs_dir().join("frogs.db").to_string_lossy().into_owned(),
            big_frogs_key: "@big_frogs_tasks".into(),
            daily_key: "@daily_tasks".into(),
        }
    }
}

/// Evening reminder for unfinished daily tasks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderSettings {
    pub enabled: bool,
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    pub title: String,
    pub body: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            time: "21:00".into(),
            title: "Daily tasks pending".into(),
            body: "You still have unfinished daily tasks today.".into(),
        }
    }
}

impl ReminderSettings {
    pub const DEFAULT_TIME: (u32, u32) = (21, 0);

    /// Parsed reminder time; an unreadable value falls back to 21:00.
    pub fn time(&self) -> NaiveTime {
        parse_time(&self.time).unwrap_or_else(|| {
            tracing::warn!(time = %self.time, "invalid reminder time, using 21:00");
            let (h, m) = Self::DEFAULT_TIME;
            NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
        })
    }
}

/// Parse `HH:MM` (24-hour).
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    pub log_to_sqlite: bool,
    pub log_db_path: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            log_to_sqlite: true,
            log_db_path: frogs_dir().join("logs.db").to_string_lossy().into_owned(),
        }
    }
}

/// `~/.frogs`, or `/tmp/.frogs` without a home directory.
pub fn frogs_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".frogs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = FrogsSettings::default();
        assert_eq!(s.storage.big_frogs_key, "@big_frogs_tasks");
        assert_eq!(s.storage.daily_key, "@daily_tasks");
        assert!(s.storage.db_path.ends_with("frogs.db"));
        assert!(s.reminder.enabled);
        assert_eq!(s.reminder.time(), NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(s.logging.level, "warn");
    }

    #[test]
    fn camel_case_on_disk() {
        let json = serde_json::to_value(FrogsSettings::default()).unwrap();
        assert!(json["storage"].get("bigFrogsKey").is_some());
        assert!(json["logging"].get("logToSqlite").is_some());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let s: FrogsSettings = serde_json::from_str(r#"{"reminder":{"time":"20:15"}}"#).unwrap();
        assert_eq!(s.reminder.time(), NaiveTime::from_hms_opt(20, 15, 0).unwrap());
        assert!(s.reminder.enabled);
        assert_eq!(s.storage, StorageSettings::default());
    }

    #[test]
    fn bad_time_falls_back() {
        let r = ReminderSettings {
            time: "9pm".into(),
            ..ReminderSettings::default()
        };
        assert_eq!(r.time(), NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(parse_time(" 07:05 "), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_time("25:00"), None);
    }
}
