//! Fetch iterators module.
//!
//! Both iterators are lazy: one backend request per item, nothing is
//! read ahead and nothing is cached between calls.

use chrono::{DateTime, FixedOffset};
use log::debug;
use std::{iter::Rev, ops::RangeInclusive, vec};

use crate::{
    backend::{Backend, Error, Result},
    msg::Envelope,
    store::MailStore,
};

/// Represents the ids to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ids {
    /// Inclusive range, descending when the end is lower than the
    /// start.
    Range(u32, u32),
    /// Explicit ids, fetched in the given order.
    List(Vec<u32>),
}

impl From<u32> for Ids {
    fn from(id: u32) -> Self {
        Self::List(vec![id])
    }
}

impl From<(u32, u32)> for Ids {
    fn from((start, end): (u32, u32)) -> Self {
        Self::Range(start, end)
    }
}

impl From<RangeInclusive<u32>> for Ids {
    fn from(range: RangeInclusive<u32>) -> Self {
        Self::Range(*range.start(), *range.end())
    }
}

impl From<Vec<u32>> for Ids {
    fn from(ids: Vec<u32>) -> Self {
        Self::List(ids)
    }
}

enum IdsIter {
    Asc(RangeInclusive<u32>),
    Desc(Rev<RangeInclusive<u32>>),
    List(vec::IntoIter<u32>),
}

impl From<Ids> for IdsIter {
    fn from(ids: Ids) -> Self {
        match ids {
            Ids::Range(start, end) if end >= start => Self::Asc(start..=end),
            Ids::Range(start, end) => Self::Desc((end..=start).rev()),
            Ids::List(ids) => Self::List(ids.into_iter()),
        }
    }
}

impl Iterator for IdsIter {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            Self::Asc(ids) => ids.next(),
            Self::Desc(ids) => ids.next(),
            Self::List(ids) => ids.next(),
        }
    }
}

/// Iterator over fetched envelopes. Stops for good after the first
/// error.
pub struct FetchRange<'a, B: Backend> {
    store: &'a mut MailStore<B>,
    ids: IdsIter,
    total: u32,
    header_only: bool,
    done: bool,
}

impl<'a, B: Backend> FetchRange<'a, B> {
    pub(crate) fn new(store: &'a mut MailStore<B>, ids: Ids, total: u32, header_only: bool) -> Self {
        debug!("fetch {:?} out of {} message(s)", ids, total);
        Self {
            store,
            ids: ids.into(),
            total,
            header_only,
            done: false,
        }
    }
}

impl<'a, B: Backend> Iterator for FetchRange<'a, B> {
    type Item = Result<Envelope>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let id = self.ids.next()?;
        let res = if id < 1 || id > self.total {
            Err(Error::NotFoundError(id, self.total))
        } else {
            self.store.fetch_unchecked(id, self.header_only)
        };

        if res.is_err() {
            self.done = true;
        }
        Some(res)
    }
}

/// Date threshold of a [`DateBounded`] iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Stops at the first message dated strictly before.
    After(DateTime<FixedOffset>),
    /// Stops at the first message dated strictly after.
    Before(DateTime<FixedOffset>),
}

impl Bound {
    fn is_crossed_by(&self, date: &DateTime<FixedOffset>) -> bool {
        match self {
            Self::After(threshold) => date < threshold,
            Self::Before(threshold) => date > threshold,
        }
    }
}

/// Iterator over fetched envelopes that ends at the first message
/// crossing a date bound. Undated messages are yielded and never end
/// it.
pub struct DateBounded<'a, B: Backend> {
    inner: FetchRange<'a, B>,
    bound: Bound,
    done: bool,
}

impl<'a, B: Backend> DateBounded<'a, B> {
    pub(crate) fn new(inner: FetchRange<'a, B>, bound: Bound) -> Self {
        Self {
            inner,
            bound,
            done: false,
        }
    }
}

impl<'a, B: Backend> Iterator for DateBounded<'a, B> {
    type Item = Result<Envelope>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.inner.next()? {
            Ok(envelope) => match envelope.date() {
                Some(date) if self.bound.is_crossed_by(&date) => {
                    debug!("message {} dated {} crosses {:?}", envelope.id, date, self.bound);
                    self.done = true;
                    None
                }
                _ => Some(Ok(envelope)),
            },
            Err(err) => Some(Err(err)),
        }
    }
}
