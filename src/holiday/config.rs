use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::PathBuf;

use super::{
    ChinaHolidayBook, HolidayBook, HolidayCalendar, NagerDateHolidayBook, DEFAULT_WORKHOURS_END,
    DEFAULT_WORKHOURS_START,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HolidayProvider {
    #[default]
    China,
    NagerDate,
}

/// Represents the `[holiday]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HolidayConfig {
    pub provider: HolidayProvider,
    /// Country code used by the Nager.Date provider.
    pub country_code: Option<String>,
    /// Hours between the country local time and UTC, used by the
    /// Nager.Date provider.
    pub utc_offset: i32,
    pub cache_dir: Option<PathBuf>,
    pub workhours_start: u32,
    pub workhours_end: u32,
}

impl Default for HolidayConfig {
    fn default() -> Self {
        Self {
            provider: HolidayProvider::default(),
            country_code: None,
            utc_offset: 0,
            cache_dir: None,
            workhours_start: DEFAULT_WORKHOURS_START,
            workhours_end: DEFAULT_WORKHOURS_END,
        }
    }
}

impl HolidayConfig {
    /// Cache directory, defaulting to `<config dir>/mailaid/holiday`.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("mailaid").join("holiday"))
                .ok_or_else(|| anyhow!("cannot find config directory")),
        }
    }

    pub fn to_calendar(&self) -> Result<HolidayCalendar<Box<dyn HolidayBook>>> {
        if self.workhours_start >= self.workhours_end || self.workhours_end > 24 {
            return Err(anyhow!(
                "cannot use work hours from {} to {}",
                self.workhours_start,
                self.workhours_end
            ));
        }

        let book: Box<dyn HolidayBook> = match self.provider {
            HolidayProvider::China => Box::new(
                ChinaHolidayBook::new()?.with_work_hours(self.workhours_start, self.workhours_end),
            ),
            HolidayProvider::NagerDate => {
                let country_code = self
                    .country_code
                    .as_deref()
                    .ok_or_else(|| anyhow!("cannot use nager-date holidays: missing country-code"))?;
                Box::new(
                    NagerDateHolidayBook::new(country_code, self.utc_offset)?
                        .with_work_hours(self.workhours_start, self.workhours_end),
                )
            }
        };

        HolidayCalendar::new(book, &self.cache_dir()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_parse_holiday_section() {
        let config: HolidayConfig = toml::from_str(
            r#"
            provider = "nager-date"
            country-code = "US"
            utc-offset = -7
            workhours-start = 8
            "#,
        )
        .unwrap();
        assert_eq!(HolidayProvider::NagerDate, config.provider);
        assert_eq!(Some("US"), config.country_code.as_deref());
        assert_eq!(-7, config.utc_offset);
        assert_eq!((8, 18), (config.workhours_start, config.workhours_end));
    }

    #[test]
    fn it_should_build_calendar_in_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = HolidayConfig {
            provider: HolidayProvider::NagerDate,
            country_code: Some("FR".into()),
            utc_offset: 1,
            cache_dir: Some(dir.path().to_owned()),
            ..HolidayConfig::default()
        };
        let calendar = config.to_calendar().unwrap();
        assert_eq!("FR", calendar.country());
        assert_eq!(dir.path().join("FR.json"), calendar.cache_file());
        assert_eq!((9, 18), calendar.work_hours());

        let config = HolidayConfig {
            country_code: None,
            ..config
        };
        assert!(config.to_calendar().is_err());
        let config = HolidayConfig {
            workhours_start: 18,
            workhours_end: 9,
            ..HolidayConfig::default()
        };
        assert!(config.to_calendar().is_err());
    }
}
