//! Holiday book module.
//!
//! A holiday book knows, for one country, which dates are days off
//! and which are worked. Dates without any remote mark fall back to
//! the weekend rule.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use log::trace;

/// Remote mark of a single date: the date, whether it is a day off,
/// and the name of the occasion.
pub type HolidayMark = (NaiveDate, bool, String);

pub const DEFAULT_WORKHOURS_START: u32 = 9;
pub const DEFAULT_WORKHOURS_END: u32 = 18;

pub trait HolidayBook {
    /// Name of the country, also used to name the cache file.
    fn country(&self) -> &str;

    fn timezone(&self) -> FixedOffset;

    /// Loads the remote marks of the given year.
    fn load_year(&mut self, year: i32) -> Result<Vec<HolidayMark>>;

    /// Work hours as a `[start, end)` pair of hours of the day.
    fn work_hours(&self) -> (u32, u32) {
        (DEFAULT_WORKHOURS_START, DEFAULT_WORKHOURS_END)
    }

    /// Looks up the remote mark of a date.
    ///
    /// The default implementation loads the whole year every time;
    /// [`HolidayCalendar`](super::HolidayCalendar) caches it.
    fn lookup(&mut self, date: NaiveDate) -> Result<Option<(bool, String)>> {
        Ok(self
            .load_year(date.year())?
            .into_iter()
            .find(|(d, _, _)| *d == date)
            .map(|(_, is_holiday, name)| (is_holiday, name)))
    }

    /// Checks whether a date is a day off, and why.
    fn check_date(&mut self, date: NaiveDate) -> Result<(bool, String)> {
        if let Some(mark) = self.lookup(date)? {
            trace!("{} marked as {:?}", date, mark);
            return Ok(mark);
        }

        match date.weekday() {
            Weekday::Sat | Weekday::Sun => Ok((true, String::from("weekend"))),
            _ => Ok((false, String::new())),
        }
    }

    /// Checks the date of the given instant, as seen from the book
    /// time zone.
    fn check<Tz: TimeZone>(&mut self, dt: &DateTime<Tz>) -> Result<(bool, String)>
    where
        Self: Sized,
    {
        let date = dt.with_timezone(&self.timezone()).date_naive();
        self.check_date(date)
    }

    fn is_holiday(&mut self, date: NaiveDate) -> Result<bool> {
        Ok(self.check_date(date)?.0)
    }

    /// Tells whether the instant falls within the work hours of a
    /// working day. The optional extension widens the work hours on
    /// both sides.
    fn is_workhour<Tz: TimeZone>(&mut self, dt: &DateTime<Tz>, extend: Option<Duration>) -> Result<bool>
    where
        Self: Sized,
    {
        let tz = self.timezone();
        let dt = dt.with_timezone(&tz);
        let date = dt.date_naive();
        if self.is_holiday(date)? {
            return Ok(false);
        }

        let (start_hour, end_hour) = self.work_hours();
        let at = |hour: u32| {
            date.and_hms_opt(0, 0, 0)
                .and_then(|midnight| tz.from_local_datetime(&midnight).single())
                .map(|midnight| midnight + Duration::hours(hour as i64))
        };
        let (mut start, mut end) = match (at(start_hour), at(end_hour)) {
            (Some(start), Some(end)) => (start, end),
            _ => return Ok(false),
        };
        if let Some(extend) = extend {
            start = start - extend;
            end = end + extend;
        }

        Ok(start <= dt && dt < end)
    }

    /// Tells whether now is a work hour.
    fn is_workday_now(&mut self) -> Result<bool>
    where
        Self: Sized,
    {
        self.is_workhour(&Utc::now(), None)
    }

    /// Returns the first working day strictly after the given date.
    fn next_workday(&mut self, date: NaiveDate) -> Result<NaiveDate> {
        let mut date = date;
        loop {
            date = date + Duration::days(1);
            if !self.is_holiday(date)? {
                return Ok(date);
            }
        }
    }

    /// Returns the given date if it is a working day, otherwise the
    /// closest working day before it.
    fn latest_workday(&mut self, date: NaiveDate) -> Result<NaiveDate> {
        let mut date = date;
        while self.is_holiday(date)? {
            date = date - Duration::days(1);
        }
        Ok(date)
    }
}

impl<B: HolidayBook + ?Sized> HolidayBook for Box<B> {
    fn country(&self) -> &str {
        (**self).country()
    }

    fn timezone(&self) -> FixedOffset {
        (**self).timezone()
    }

    fn load_year(&mut self, year: i32) -> Result<Vec<HolidayMark>> {
        (**self).load_year(year)
    }

    fn work_hours(&self) -> (u32, u32) {
        (**self).work_hours()
    }

    fn lookup(&mut self, date: NaiveDate) -> Result<Option<(bool, String)>> {
        (**self).lookup(date)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate};

    use super::*;

    /// Book with a fixed list of marks, counting remote loads.
    pub struct FixedBook {
        pub marks: Vec<HolidayMark>,
        pub loads: Vec<i32>,
    }

    impl FixedBook {
        pub fn new(marks: Vec<HolidayMark>) -> Self {
            Self {
                marks,
                loads: Vec::new(),
            }
        }
    }

    impl HolidayBook for FixedBook {
        fn country(&self) -> &str {
            "Testland"
        }

        fn timezone(&self) -> FixedOffset {
            FixedOffset::east_opt(8 * 3600).unwrap()
        }

        fn load_year(&mut self, year: i32) -> Result<Vec<HolidayMark>> {
            self.loads.push(year);
            Ok(self
                .marks
                .iter()
                .filter(|(date, _, _)| date.year() == year)
                .cloned()
                .collect())
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn april_book() -> FixedBook {
        FixedBook::new(vec![
            (date(2023, 4, 5), true, "Qingming".into()),
            // Sunday worked in exchange.
            (date(2023, 4, 23), false, "Labour Day makeup".into()),
        ])
    }

    #[test]
    fn it_should_fall_back_to_weekends() {
        let mut book = april_book();
        // 2023-04-08 is a Saturday.
        assert_eq!((true, "weekend".to_owned()), book.check_date(date(2023, 4, 8)).unwrap());
        assert_eq!((false, String::new()), book.check_date(date(2023, 4, 4)).unwrap());
        assert_eq!((true, "Qingming".to_owned()), book.check_date(date(2023, 4, 5)).unwrap());
        assert!(!book.is_holiday(date(2023, 4, 23)).unwrap());
    }

    #[test]
    fn it_should_check_dates_in_book_timezone() {
        let mut book = april_book();
        // 2023-04-04 20:00 UTC is already 2023-04-05 in UTC+8.
        let dt = DateTime::parse_from_rfc3339("2023-04-04T20:00:00+00:00").unwrap();
        assert_eq!((true, "Qingming".to_owned()), book.check(&dt).unwrap());
    }

    #[test]
    fn it_should_gate_work_hours() {
        let mut book = april_book();
        let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();

        assert!(book.is_workhour(&at("2023-04-06T09:00:00+08:00"), None).unwrap());
        assert!(book.is_workhour(&at("2023-04-06T17:59:59+08:00"), None).unwrap());
        assert!(!book.is_workhour(&at("2023-04-06T18:00:00+08:00"), None).unwrap());
        assert!(!book.is_workhour(&at("2023-04-06T06:00:00+08:00"), None).unwrap());
        assert!(book
            .is_workhour(&at("2023-04-06T07:00:00+08:00"), Some(Duration::hours(2)))
            .unwrap());
        // Same instant expressed in UTC.
        assert!(book.is_workhour(&at("2023-04-06T02:00:00+00:00"), None).unwrap());
        // Holidays are never work hours.
        assert!(!book.is_workhour(&at("2023-04-05T10:00:00+08:00"), None).unwrap());
    }

    #[test]
    fn it_should_find_next_and_latest_workdays() {
        let mut book = april_book();
        assert_eq!(date(2023, 4, 6), book.next_workday(date(2023, 4, 4)).unwrap());
        assert_eq!(date(2023, 4, 4), book.latest_workday(date(2023, 4, 4)).unwrap());
        assert_eq!(date(2023, 4, 4), book.latest_workday(date(2023, 4, 5)).unwrap());
        // Friday to Monday.
        assert_eq!(date(2023, 4, 10), book.next_workday(date(2023, 4, 7)).unwrap());
        // Sunday to Friday.
        assert_eq!(date(2023, 4, 7), book.latest_workday(date(2023, 4, 9)).unwrap());
    }
}
