//! Holiday calendar module.
//!
//! This module contains the cached wrapper around holiday books. The
//! cache is a JSON file mapping every known date to its mark, loaded
//! once at creation and rewritten after each remote refresh.

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, FixedOffset, NaiveDate};
use log::{debug, info, warn};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use super::{HolidayBook, HolidayMark};

pub struct HolidayCalendar<B: HolidayBook> {
    book: B,
    cache_file: PathBuf,
    marks: BTreeMap<NaiveDate, (bool, String)>,
}

impl<B: HolidayBook> HolidayCalendar<B> {
    /// Wraps the book, reading its cache file from the given
    /// directory when it exists.
    ///
    /// An unreadable cache is ignored and overwritten at the next
    /// refresh.
    pub fn new(book: B, cache_dir: &Path) -> Result<Self> {
        let name = sanitize_filename(book.country());
        if name.is_empty() {
            return Err(anyhow!("cannot build holiday cache file name: country name is empty"));
        }

        fs::create_dir_all(cache_dir)
            .with_context(|| format!("cannot create holiday cache directory {:?}", cache_dir))?;
        let cache_file = cache_dir.join(format!("{}.json", name));

        let marks = if cache_file.exists() {
            match load_cache(&cache_file) {
                Ok(marks) => marks,
                Err(err) => {
                    warn!("{:?}", err);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!("{} cached holiday mark(s) from {:?}", marks.len(), cache_file);

        Ok(Self {
            book,
            cache_file,
            marks,
        })
    }

    pub fn book(&self) -> &B {
        &self.book
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Loads the given year from the book unless at least one date of
    /// that year is already known.
    pub fn ensure_year(&mut self, year: i32) -> Result<()> {
        if self.marks.keys().any(|date| date.year() == year) {
            return Ok(());
        }

        info!("loading {} holiday data for {}", self.book.country(), year);
        for (date, is_holiday, name) in self.book.load_year(year)? {
            self.marks.insert(date, (is_holiday, name));
        }
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.marks)
            .context("cannot serialize holiday cache")?;
        fs::write(&self.cache_file, content)
            .with_context(|| format!("cannot write holiday cache {:?}", self.cache_file))
    }
}

impl<B: HolidayBook> HolidayBook for HolidayCalendar<B> {
    fn country(&self) -> &str {
        self.book.country()
    }

    fn timezone(&self) -> FixedOffset {
        self.book.timezone()
    }

    fn load_year(&mut self, year: i32) -> Result<Vec<HolidayMark>> {
        self.ensure_year(year)?;
        Ok(self
            .marks
            .iter()
            .filter(|(date, _)| date.year() == year)
            .map(|(date, (is_holiday, name))| (*date, *is_holiday, name.clone()))
            .collect())
    }

    fn work_hours(&self) -> (u32, u32) {
        self.book.work_hours()
    }

    fn lookup(&mut self, date: NaiveDate) -> Result<Option<(bool, String)>> {
        self.ensure_year(date.year())?;
        Ok(self.marks.get(&date).cloned())
    }
}

fn load_cache(path: &Path) -> Result<BTreeMap<NaiveDate, (bool, String)>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read holiday cache {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("cannot parse holiday cache {:?}", path))
}

/// Keeps alphanumerics, spaces, dots, underscores and dashes.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .collect()
}
