//! Watcher module.
//!
//! The watcher polls the mailbox at a fixed interval and notifies
//! every new message matching the filter. Each check cycle starts
//! from the cursor left by the last successful one.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use log::{debug, error, info, warn};
use mailaid_lib::{
    backend::Backend,
    store::MailStore,
};
use std::path::PathBuf;

use crate::holiday::HolidayBook;

use super::{state, CancellationToken, FilterConfig, Notifier, NotifierConfig};

/// Notifies the messages dated from `since` that pass the filter,
/// newest first. Returns the number of notified messages.
///
/// Headers are scanned first, full messages are only fetched for the
/// matching ones.
pub fn check_mail<B: Backend, N: Notifier + ?Sized>(
    store: &mut MailStore<B>,
    since: DateTime<FixedOffset>,
    filter: &FilterConfig,
    notifier: &mut N,
) -> Result<usize> {
    let mut ids = Vec::new();
    for envelope in store.fetch_messages_after(since, true)? {
        let envelope = envelope?;
        if filter.matches(&envelope) {
            debug!("message {} matches: {:?}", envelope.id, envelope.subject());
            ids.push(envelope.id);
        }
    }

    for id in &ids {
        let envelope = store.fetch(*id, false)?;
        notifier.notify(&envelope)?;
    }

    Ok(ids.len())
}

type Connect<'a> = Box<dyn FnMut() -> Result<MailStore<Box<dyn Backend>>> + 'a>;

pub struct Watcher<'a> {
    config: &'a NotifierConfig,
    dry_run: bool,
    state_file: PathBuf,
    cursor: Option<DateTime<FixedOffset>>,
    connect: Connect<'a>,
    notifier: Box<dyn Notifier + 'a>,
    gate: Option<Box<dyn HolidayBook + 'a>>,
}

impl<'a> Watcher<'a> {
    /// Builds a watcher opening a new store at every check cycle.
    ///
    /// In dry-run mode the cursor only lives in memory and the work
    /// hours gate is ignored.
    pub fn new<C, N>(config: &'a NotifierConfig, dry_run: bool, connect: C, notifier: N) -> Result<Self>
    where
        C: FnMut() -> Result<MailStore<Box<dyn Backend>>> + 'a,
        N: Notifier + 'a,
    {
        Ok(Self {
            config,
            dry_run,
            state_file: config.state_file()?,
            cursor: None,
            connect: Box::new(connect),
            notifier: Box::new(notifier),
            gate: None,
        })
    }

    /// Restricts check cycles to the work hours of the given book.
    pub fn with_gate<G: HolidayBook + 'a>(self, gate: G) -> Self {
        Self {
            gate: Some(Box::new(gate)),
            ..self
        }
    }

    pub fn cursor(&mut self) -> DateTime<FixedOffset> {
        match self.cursor {
            Some(cursor) => cursor,
            None => {
                let cursor = state::load(&self.state_file);
                self.cursor = Some(cursor);
                cursor
            }
        }
    }

    /// Runs one check cycle from the cursor, moving the cursor to the
    /// cycle start time on success.
    pub fn check(&mut self) -> Result<usize> {
        let since = self.cursor();
        let started_at: DateTime<FixedOffset> = Local::now().into();
        info!("start checking new mails since {}", since);

        let mut store = (self.connect)().context("cannot connect to mail store")?;
        store.open().context("cannot open mail store")?;
        let notified = check_mail(&mut store, since, &self.config.filter, &mut self.notifier);
        let closed = store.close().context("cannot close mail store");
        let notified = notified.context("cannot check new mails")?;
        closed?;

        self.cursor = Some(started_at);
        if !self.dry_run {
            state::save(&self.state_file, started_at)?;
        }
        info!(
            "done checking new mails, {} notified, next since would be {}",
            notified, started_at
        );

        Ok(notified)
    }

    /// Tells whether the current instant lets a check cycle run.
    fn is_open(&mut self) -> bool {
        if self.dry_run {
            return true;
        }

        match self.gate.as_mut() {
            None => true,
            Some(gate) => match gate.is_workhour(&Local::now(), None) {
                Ok(open) => open,
                Err(err) => {
                    warn!("cannot check work hours, checking mails anyway: {:?}", err);
                    true
                }
            },
        }
    }

    /// Runs a check cycle if the gate allows it. Errors are logged, so
    /// that the next tick retries from the same cursor.
    pub fn tick(&mut self) -> Option<usize> {
        if !self.is_open() {
            debug!("out of work hours, skipping check");
            return None;
        }

        match self.check() {
            Ok(notified) => Some(notified),
            Err(err) => {
                error!("{:?}", err);
                None
            }
        }
    }

    /// Ticks until the token is cancelled.
    pub fn run(&mut self, token: &CancellationToken) {
        let interval = self.config.interval();
        while !token.is_cancelled() {
            self.tick();
            if token.wait_timeout(interval) {
                break;
            }
        }
        info!("notifier stopped");
    }
}
