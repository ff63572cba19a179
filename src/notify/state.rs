//! Cursor state module.
//!
//! The cursor is the start time of the last successful check cycle,
//! persisted in a small TOML file in local time.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, TimeZone};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const STATE_DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
struct StateFile {
    previous_started_at: Option<String>,
}

/// Reads the cursor from the state file.
///
/// A missing file or value, or an unreadable one, falls back to 24
/// hours before now.
pub fn load(path: &Path) -> DateTime<FixedOffset> {
    match read(path) {
        Ok(Some(cursor)) => cursor,
        Ok(None) => default_cursor(),
        Err(err) => {
            warn!("{:?}", err);
            default_cursor()
        }
    }
}

fn read(path: &Path) -> Result<Option<DateTime<FixedOffset>>> {
    if !path.exists() {
        debug!("no state file at {:?}", path);
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read state file {:?}", path))?;
    let state: StateFile =
        toml::from_str(&content).with_context(|| format!("cannot parse state file {:?}", path))?;

    match state.previous_started_at.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let naive = NaiveDateTime::parse_from_str(raw, STATE_DATETIME_FMT)
                .with_context(|| format!("cannot parse previous start time {:?}", raw))?;
            Ok(Local
                .from_local_datetime(&naive)
                .earliest()
                .map(DateTime::from))
        }
    }
}

pub fn save(path: &Path, started_at: DateTime<FixedOffset>) -> Result<()> {
    let state = StateFile {
        previous_started_at: Some(
            started_at
                .with_timezone(&Local)
                .format(STATE_DATETIME_FMT)
                .to_string(),
        ),
    };
    let content = toml::to_string(&state).context("cannot serialize state")?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create state directory {:?}", dir))?;
    }
    fs::write(path, content).with_context(|| format!("cannot write state file {:?}", path))
}

fn default_cursor() -> DateTime<FixedOffset> {
    DateTime::from(Local::now() - Duration::hours(24))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_about_a_day_ago(cursor: DateTime<FixedOffset>) -> bool {
        let age = DateTime::<FixedOffset>::from(Local::now()) - cursor;
        age > Duration::hours(23) && age <= Duration::hours(24) + Duration::minutes(1)
    }

    #[test]
    fn it_should_default_to_a_day_ago() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        assert!(is_about_a_day_ago(load(&path)));

        fs::write(&path, "").unwrap();
        assert!(is_about_a_day_ago(load(&path)));

        fs::write(&path, "previous-started-at = \"yesterday\"\n").unwrap();
        assert!(is_about_a_day_ago(load(&path)));

        fs::write(&path, "not = [toml").unwrap();
        assert!(is_about_a_day_ago(load(&path)));
    }

    #[test]
    fn it_should_persist_cursor_in_local_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");
        let started_at: DateTime<FixedOffset> = Local
            .with_ymd_and_hms(2024, 1, 5, 12, 30, 15)
            .unwrap()
            .into();

        save(&path, started_at).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!("previous-started-at = \"2024-01-05 12:30:15\"\n", content);
        assert_eq!(started_at, load(&path));
    }
}
