//! Mail store session module.
//!
//! The mail store drives a [`Backend`] through a checked lifecycle,
//! validates message ids against the live message count and applies
//! the dry-run policy to every destructive verb.

use chrono::{DateTime, FixedOffset};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    account::ServerConfig,
    backend::{Backend, Error, FetchKind, Result},
    mbox::Mboxes,
    msg::Envelope,
    store::{Bound, DateBounded, FetchRange, Ids},
};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Represents the behaviour settings of a mail store session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Logs destructive operations instead of sending them.
    pub dry_run: bool,
    /// Maximum number of messages marked between two flushes.
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Open,
    Closed,
}

pub struct MailStore<B: Backend> {
    backend: B,
    config: StoreConfig,
    state: State,
    header_kind: FetchKind,
    full_kind: FetchKind,
}

impl MailStore<Box<dyn Backend>> {
    /// Builds an unopened store over the backend matching the
    /// protocol of the given server config.
    pub fn connect(server: &ServerConfig, config: StoreConfig) -> Result<Self> {
        server.validate()?;
        Self::new(server.to_backend()?, config)
    }
}

impl<B: Backend> MailStore<B> {
    /// Wraps an unopened backend.
    ///
    /// Fails when the backend can fetch neither headers nor full
    /// messages. A backend supporting a single fetch kind serves both
    /// kinds of request with it.
    pub fn new(backend: B, mut config: StoreConfig) -> Result<Self> {
        let header = backend.supports(FetchKind::Header);
        let full = backend.supports(FetchKind::Full);
        let (header_kind, full_kind) = match (header, full) {
            (true, true) => (FetchKind::Header, FetchKind::Full),
            (true, false) => (FetchKind::Header, FetchKind::Header),
            (false, true) => (FetchKind::Full, FetchKind::Full),
            (false, false) => return Err(Error::MissingFetchPrimitiveError(backend.name())),
        };

        if config.batch_size == 0 {
            warn!("batch size cannot be 0, using 1 instead");
            config.batch_size = 1;
        }

        Ok(Self {
            backend,
            config,
            state: State::Created,
            header_kind,
            full_kind,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        match self.state {
            State::Open => Ok(()),
            State::Created => Err(Error::NotOpenError),
            State::Closed => Err(Error::ClosedError),
        }
    }

    /// Connects and authenticates the backend.
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            State::Created => (),
            State::Open => return Err(Error::AlreadyOpenError),
            State::Closed => return Err(Error::ClosedError),
        }

        debug!("open {} mail store", self.backend.name());
        self.backend.open()?;
        self.state = State::Open;
        Ok(())
    }

    /// Commits pending deletions, or discards them in dry-run mode,
    /// then releases the connection. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let prev = self.state;
        self.state = State::Closed;
        if prev != State::Open {
            debug!("mail store not open, nothing to close");
            return Ok(());
        }

        let commit = !self.config.dry_run;
        debug!("close {} mail store (commit: {})", self.backend.name(), commit);
        self.backend.close(commit)
    }

    /// Returns the live number of messages. Never cached.
    pub fn total_messages(&mut self) -> Result<u32> {
        self.ensure_open()?;
        self.backend.total_messages()
    }

    fn check_id(&mut self, id: u32) -> Result<()> {
        let total = self.total_messages()?;
        if id < 1 || id > total {
            return Err(Error::NotFoundError(id, total));
        }
        Ok(())
    }

    pub fn fetch(&mut self, id: u32, header_only: bool) -> Result<Envelope> {
        self.check_id(id)?;
        self.fetch_unchecked(id, header_only)
    }

    /// Fetches a message without checking its id against the message
    /// count.
    pub fn fetch_unchecked(&mut self, id: u32, header_only: bool) -> Result<Envelope> {
        self.ensure_open()?;
        let kind = if header_only {
            self.header_kind
        } else {
            self.full_kind
        };
        let raw = self.backend.fetch(id, kind)?;
        Ok(Envelope::new(id, raw))
    }

    /// Lazily fetches the given ids, one request per item.
    ///
    /// Ids are validated against the message count taken when the
    /// iterator is built.
    pub fn fetch_range<I: Into<Ids>>(
        &mut self,
        ids: I,
        header_only: bool,
    ) -> Result<FetchRange<'_, B>> {
        let total = self.total_messages()?;
        Ok(FetchRange::new(self, ids.into(), total, header_only))
    }

    /// Streams messages from the newest down, stopping at the first
    /// one dated strictly before the threshold.
    ///
    /// Relies on ids growing with dates, which holds for mailboxes
    /// filled by regular delivery only.
    pub fn fetch_messages_after(
        &mut self,
        threshold: DateTime<FixedOffset>,
        header_only: bool,
    ) -> Result<DateBounded<'_, B>> {
        let total = self.total_messages()?;
        let ids = match total {
            0 => Ids::List(Vec::new()),
            total => Ids::Range(total, 1),
        };
        let range = FetchRange::new(self, ids, total, header_only);
        Ok(DateBounded::new(range, Bound::After(threshold)))
    }

    /// Streams messages from the oldest up, stopping at the first one
    /// dated strictly after the threshold.
    pub fn fetch_messages_before(
        &mut self,
        threshold: DateTime<FixedOffset>,
        header_only: bool,
    ) -> Result<DateBounded<'_, B>> {
        let total = self.total_messages()?;
        let ids = match total {
            0 => Ids::List(Vec::new()),
            total => Ids::Range(1, total),
        };
        let range = FetchRange::new(self, ids, total, header_only);
        Ok(DateBounded::new(range, Bound::Before(threshold)))
    }

    pub fn mark_deleted(&mut self, id: u32) -> Result<()> {
        self.check_id(id)?;
        self.mark_deleted_unchecked(id)
    }

    pub(crate) fn mark_deleted_unchecked(&mut self, id: u32) -> Result<()> {
        self.ensure_open()?;
        if self.config.dry_run {
            info!("[dry run] mark message {} as deleted", id);
            return Ok(());
        }
        info!("mark message {} as deleted", id);
        self.backend.mark_deleted(id)
    }

    pub fn unmark_deleted(&mut self, id: u32) -> Result<()> {
        self.check_id(id)?;
        if self.config.dry_run {
            info!("[dry run] unmark deleted message {}", id);
            return Ok(());
        }
        info!("unmark deleted message {}", id);
        self.backend.unmark_deleted(id)
    }

    pub fn unmark_all_deleted(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.config.dry_run {
            info!("[dry run] unmark all deleted messages");
            return Ok(());
        }
        info!("unmark all deleted messages");
        self.backend.unmark_all_deleted()
    }

    /// Commits pending deletion marks.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.config.dry_run {
            info!("[dry run] flush deleted messages");
            return Ok(());
        }
        info!("flush deleted messages");
        self.backend.flush()
    }

    pub fn list_mboxes(&mut self) -> Result<Mboxes> {
        self.ensure_open()?;
        self.backend.list_mboxes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::ErrorKind,
        store::memory_backend::{msg, MemoryBackend},
    };

    fn open_store(total: u32, config: StoreConfig) -> MailStore<MemoryBackend> {
        let backend = MemoryBackend::with_messages(
            (1..=total).map(|i| msg(&format!("subject {}", i), None)),
        );
        let mut store = MailStore::new(backend, config).unwrap();
        store.open().unwrap();
        store
    }

    #[test]
    fn it_should_reject_backend_without_fetch_primitive() {
        let backend = MemoryBackend::default().supporting(false, false);
        let err = MailStore::new(backend, StoreConfig::default()).err().unwrap();
        assert_eq!(ErrorKind::Contract, err.kind());
    }

    #[test]
    fn it_should_use_single_fetch_kind_for_both_requests() {
        let backend = MemoryBackend::with_messages([msg("only", None)]).supporting(false, true);
        let mut store = MailStore::new(backend, StoreConfig::default()).unwrap();
        store.open().unwrap();
        store.fetch(1, true).unwrap();
        store.fetch(1, false).unwrap();
        assert_eq!(
            vec![(1, FetchKind::Full), (1, FetchKind::Full)],
            store.backend().fetched
        );
    }

    #[test]
    fn it_should_enforce_lifecycle() {
        let mut store =
            MailStore::new(MemoryBackend::default(), StoreConfig::default()).unwrap();
        assert!(matches!(store.total_messages(), Err(Error::NotOpenError)));

        store.open().unwrap();
        assert!(matches!(store.open(), Err(Error::AlreadyOpenError)));
        assert_eq!(0, store.total_messages().unwrap());

        store.close().unwrap();
        assert!(store.close().is_ok());
        let err = store.fetch(1, true).err().unwrap();
        assert!(matches!(err, Error::ClosedError));
        assert_eq!(ErrorKind::Closed, err.kind());
        assert!(matches!(store.open(), Err(Error::ClosedError)));
    }

    #[test]
    fn it_should_validate_ids() {
        let mut store = open_store(3, StoreConfig::default());
        assert!(matches!(store.fetch(0, true), Err(Error::NotFoundError(0, 3))));
        assert!(matches!(store.fetch(4, true), Err(Error::NotFoundError(4, 3))));
        assert!(matches!(
            store.mark_deleted(4),
            Err(Error::NotFoundError(4, 3))
        ));
        assert!(store.backend().fetched.is_empty());
        assert!(store.backend().deleted.is_empty());

        let envelope = store.fetch(3, true).unwrap();
        assert_eq!(3, envelope.id);
        assert_eq!("subject 3", envelope.subject());
    }

    #[test]
    fn it_should_not_send_marks_in_dry_run() {
        let mut store = open_store(3, StoreConfig {
            dry_run: true,
            ..StoreConfig::default()
        });
        store.mark_deleted(2).unwrap();
        store.flush().unwrap();
        store.close().unwrap();
        assert!(store.backend().deleted.is_empty());
        assert_eq!(0, store.backend().flushes);
        assert_eq!(Some(false), store.backend().closed_with);
        assert_eq!(3, store.backend().messages.len());
    }

    #[test]
    fn it_should_commit_marks_on_close() {
        let mut store = open_store(3, StoreConfig::default());
        store.mark_deleted(2).unwrap();
        store.close().unwrap();
        assert_eq!(Some(true), store.backend().closed_with);
        assert_eq!(2, store.backend().messages.len());
    }

    #[test]
    fn it_should_unmark_deleted() {
        let mut store = open_store(3, StoreConfig::default());
        store.mark_deleted(1).unwrap();
        store.mark_deleted(2).unwrap();
        store.unmark_deleted(2).unwrap();
        assert_eq!(vec![1], store.backend().deleted.iter().copied().collect::<Vec<_>>());
        store.unmark_all_deleted().unwrap();
        assert!(store.backend().deleted.is_empty());
    }

    #[test]
    fn it_should_clamp_batch_size() {
        let store = MailStore::new(
            MemoryBackend::default(),
            StoreConfig {
                batch_size: 0,
                ..StoreConfig::default()
            },
        )
        .unwrap();
        assert_eq!(1, store.config().batch_size);
    }
}
