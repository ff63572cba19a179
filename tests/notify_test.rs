mod common;

use std::{cell::RefCell, fs, rc::Rc};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, FixedOffset, Local};
use mailaid::notify::{state, FilterConfig, Notifier, NotifierConfig, Watcher};
use mailaid_lib::{
    backend::Backend,
    msg::Envelope,
    store::{MailStore, StoreConfig},
};

use common::{message, Mailbox};

#[derive(Clone, Default)]
struct Recorder {
    subjects: Rc<RefCell<Vec<String>>>,
    fail: Rc<RefCell<bool>>,
}

impl Notifier for Recorder {
    fn notify(&mut self, envelope: &Envelope) -> Result<()> {
        if *self.fail.borrow() {
            return Err(anyhow!("hook unreachable"));
        }
        // Full messages carry the body.
        assert!(envelope.text().contains("https://ci/"));
        self.subjects.borrow_mut().push(envelope.subject().to_owned());
        Ok(())
    }
}

fn ago(hours: i64) -> String {
    (Local::now() - Duration::hours(hours)).to_rfc2822()
}

fn mailbox() -> Mailbox {
    let mailbox = Mailbox::default();
    mailbox.push(message("CI <ci@localhost>", "[deploy] old", &ago(72), "https://ci/1"));
    mailbox.push(message("CI <ci@localhost>", "[deploy] new", &ago(3), "https://ci/2"));
    mailbox.push(message("CI <ci@localhost>", "[build] other", &ago(2), "https://ci/3"));
    mailbox.push(message("Eve <eve@localhost>", "[deploy] spoof", &ago(1), "https://ci/4"));
    mailbox
}

fn notifier_config(state_file: &std::path::Path) -> NotifierConfig {
    NotifierConfig {
        state_file: Some(state_file.to_owned()),
        filter: FilterConfig {
            subject_keyword: Some("[deploy]".into()),
            from_addrs: vec!["ci@localhost".into()],
            ignore_realnames: vec![],
        },
        ..NotifierConfig::default()
    }
}

#[test]
fn test_watcher_notifies_new_matching_messages() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.toml");
    let config = notifier_config(&state_file);
    let mailbox = mailbox();
    let recorder = Recorder::default();

    let mut watcher = Watcher::new(
        &config,
        false,
        || Ok(MailStore::new(Box::new(mailbox.backend()) as Box<dyn Backend>, StoreConfig::default())?),
        recorder.clone(),
    )
    .unwrap();

    // No state yet: everything from the last 24 hours.
    assert_eq!(Some(1), watcher.tick());
    assert_eq!(vec!["[deploy] new".to_owned()], *recorder.subjects.borrow());
    let cursor = state::load(&state_file);
    assert!(Local::now().signed_duration_since(cursor) < Duration::minutes(1));

    // Only messages dated after the new cursor come next.
    assert_eq!(Some(0), watcher.tick());
    mailbox.push(message("CI <ci@localhost>", "[deploy] newer", &ago(-1), "https://ci/5"));
    assert_eq!(Some(1), watcher.tick());
    assert_eq!(
        vec!["[deploy] new".to_owned(), "[deploy] newer".to_owned()],
        *recorder.subjects.borrow()
    );
    assert_eq!(5, mailbox.len());
}

#[test]
fn test_watcher_keeps_cursor_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.toml");
    let since: DateTime<FixedOffset> = (Local::now() - Duration::hours(4)).into();
    state::save(&state_file, since).unwrap();
    let saved = fs::read_to_string(&state_file).unwrap();

    let config = notifier_config(&state_file);
    let mailbox = mailbox();
    let recorder = Recorder::default();
    *recorder.fail.borrow_mut() = true;

    let mut watcher = Watcher::new(
        &config,
        false,
        || Ok(MailStore::new(Box::new(mailbox.backend()) as Box<dyn Backend>, StoreConfig::default())?),
        recorder.clone(),
    )
    .unwrap();

    assert_eq!(None, watcher.tick());
    assert_eq!(saved, fs::read_to_string(&state_file).unwrap());

    // The next cycle retries from the same cursor.
    *recorder.fail.borrow_mut() = false;
    assert_eq!(Some(1), watcher.tick());
    assert_eq!(vec!["[deploy] new".to_owned()], *recorder.subjects.borrow());
    assert_ne!(saved, fs::read_to_string(&state_file).unwrap());
}

#[test]
fn test_watcher_dry_run_keeps_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.toml");
    let config = notifier_config(&state_file);
    let mailbox = mailbox();
    let recorder = Recorder::default();

    let mut watcher = Watcher::new(
        &config,
        true,
        || Ok(MailStore::new(Box::new(mailbox.backend()) as Box<dyn Backend>, StoreConfig::default())?),
        recorder.clone(),
    )
    .unwrap();

    assert_eq!(Some(1), watcher.tick());
    // The cursor moves in memory only.
    assert_eq!(Some(0), watcher.tick());
    assert!(!state_file.exists());
}
