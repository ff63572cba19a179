use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use mailaid_lib::{backend::Backend, store::MailStore};

use crate::{
    msg::{EnvelopeRow, EnvelopeRows},
    printer::Printer,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// List a page of envelopes.
///
/// Pages start from the oldest message of the mailbox.
#[derive(Debug, Parser)]
pub struct MessageListCommand {
    /// The page number, starting from 1
    #[arg(value_name = "PAGE", default_value_t = 1)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// The number of envelopes per page
    #[arg(long, short = 's', value_name = "SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Fetch full messages instead of headers only
    #[arg(long, short)]
    pub full: bool,
}

impl MessageListCommand {
    /// Returns the inclusive id range of the page, clamped to the
    /// number of messages. `None` when the page is past the end.
    pub fn page_range(&self, total: u32) -> Option<(u32, u32)> {
        let start = (self.page - 1).checked_mul(self.page_size)?.checked_add(1)?;
        if start > total {
            return None;
        }
        let end = start.saturating_add(self.page_size - 1).min(total);
        Some((start, end))
    }

    pub fn execute<B: Backend>(
        self,
        printer: &mut impl Printer,
        store: &mut MailStore<B>,
    ) -> Result<()> {
        info!("executing message list command");

        let total = store.total_messages().context("cannot count messages")?;
        let rows = match self.page_range(total) {
            None => {
                debug!("page {} is past the {} message(s)", self.page, total);
                EnvelopeRows::default()
            }
            Some(range) => store
                .fetch_range(range, !self.full)?
                .map(|envelope| envelope.map(|envelope| EnvelopeRow::from(&envelope)))
                .collect::<Result<EnvelopeRows, _>>()
                .context("cannot fetch envelopes")?,
        };

        printer.out(rows)
    }
}
