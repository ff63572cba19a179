//! Nager.Date holiday book module.
//!
//! Public holidays of any country supported by the date.nager.at
//! API. The API only lists days off, so make-up working days are
//! unknown to this book.

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, NaiveDate};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{http_client, HolidayBook, HolidayMark, DEFAULT_WORKHOURS_END, DEFAULT_WORKHOURS_START};

const API_URL: &str = "https://date.nager.at/api/v3/publicholidays";

#[derive(Debug, Deserialize)]
struct PublicHoliday {
    date: NaiveDate,
    name: String,
}

pub struct NagerDateHolidayBook {
    client: Client,
    country_code: String,
    timezone: FixedOffset,
    work_hours: (u32, u32),
}

impl NagerDateHolidayBook {
    /// Builds a book for the given country code (`US`, `FR`…) whose
    /// local time is `utc_offset` hours away from UTC.
    pub fn new<S: ToString>(country_code: S, utc_offset: i32) -> Result<Self> {
        let timezone = FixedOffset::east_opt(utc_offset * 3600)
            .ok_or_else(|| anyhow!("cannot use utc offset of {} hour(s)", utc_offset))?;

        Ok(Self {
            client: http_client()?,
            country_code: country_code.to_string(),
            timezone,
            work_hours: (DEFAULT_WORKHOURS_START, DEFAULT_WORKHOURS_END),
        })
    }

    pub fn with_work_hours(self, start: u32, end: u32) -> Self {
        Self {
            work_hours: (start, end),
            ..self
        }
    }
}

impl HolidayBook for NagerDateHolidayBook {
    fn country(&self) -> &str {
        &self.country_code
    }

    fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    fn load_year(&mut self, year: i32) -> Result<Vec<HolidayMark>> {
        let url = format!("{}/{}/{}", API_URL, year, self.country_code);
        debug!("fetching holidays from {}", url);
        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|res| res.error_for_status())
            .and_then(|res| res.text())
            .with_context(|| format!("cannot fetch {} holidays of {}", self.country_code, year))?;
        parse_year(&body)
            .with_context(|| format!("cannot parse {} holidays of {}", self.country_code, year))
    }

    fn work_hours(&self) -> (u32, u32) {
        self.work_hours
    }
}

fn parse_year(body: &str) -> Result<Vec<HolidayMark>> {
    let holidays: Vec<PublicHoliday> = serde_json::from_str(body)?;
    Ok(holidays
        .into_iter()
        .map(|holiday| (holiday.date, true, holiday.name))
        .collect())
}
