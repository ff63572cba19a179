use anyhow::{Context, Result};
use clap::Parser;
use log::{info, trace};
use mailaid_lib::{backend::Backend, store::MailStore};

use crate::printer::Printer;

/// List all mailboxes of the account.
///
/// Only IMAP servers hold several mailboxes.
#[derive(Debug, Parser)]
pub struct MailboxListCommand {}

impl MailboxListCommand {
    pub fn execute<B: Backend>(
        self,
        printer: &mut impl Printer,
        store: &mut MailStore<B>,
    ) -> Result<()> {
        info!("executing mailbox list command");

        let mboxes = store.list_mboxes().context("cannot list mailboxes")?;
        trace!("mailboxes: {:?}", mboxes);

        printer.out(mboxes)
    }
}
