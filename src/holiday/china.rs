//! China holiday book module.
//!
//! Holidays and make-up working days come from the timor.tech API.

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, NaiveDate};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{http_client, HolidayBook, HolidayMark, DEFAULT_WORKHOURS_END, DEFAULT_WORKHOURS_START};

const API_URL: &str = "https://timor.tech/api/holiday/year";

#[derive(Debug, Deserialize)]
struct TimorYear {
    code: i32,
    #[serde(default)]
    holiday: BTreeMap<String, TimorDay>,
}

#[derive(Debug, Deserialize)]
struct TimorDay {
    holiday: bool,
    name: String,
    date: NaiveDate,
}

pub struct ChinaHolidayBook {
    client: Client,
    timezone: FixedOffset,
    work_hours: (u32, u32),
}

impl ChinaHolidayBook {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            timezone: FixedOffset::east_opt(8 * 3600).ok_or_else(|| anyhow!("invalid utc+8 offset"))?,
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

impl HolidayBook for ChinaHolidayBook {
    fn country(&self) -> &str {
        "China"
    }

    fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    fn load_year(&mut self, year: i32) -> Result<Vec<HolidayMark>> {
        let url = format!("{}/{}", API_URL, year);
        debug!("fetching holidays from {}", url);
        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|res| res.error_for_status())
            .and_then(|res| res.text())
            .with_context(|| format!("cannot fetch china holidays of {}", year))?;
        parse_year(&body).with_context(|| format!("cannot parse china holidays of {}", year))
    }

    fn work_hours(&self) -> (u32, u32) {
        self.work_hours
    }
}

fn parse_year(body: &str) -> Result<Vec<HolidayMark>> {
    let year: TimorYear = serde_json::from_str(body)?;
    if year.code != 0 {
        return Err(anyhow!("holiday api replied with code {}", year.code));
    }

    Ok(year
        .holiday
        .into_values()
        .map(|day| (day.date, day.holiday, day.name))
        .collect())
}
