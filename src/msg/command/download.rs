use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mailaid_lib::{backend::Backend, store::MailStore};
use std::path::PathBuf;

use crate::{config, msg::mbox_file::MboxWriter, printer::Printer};

/// Append messages to an mbox file.
///
/// All messages are downloaded unless a range is given.
#[derive(Debug, Parser)]
pub struct MessageDownloadCommand {
    /// The mbox file, created if missing
    #[arg(value_name = "PATH", value_parser = config::path_parser)]
    pub path: PathBuf,

    /// The first message id
    #[arg(long, value_name = "ID")]
    pub id: Option<u32>,

    /// The last message id, defaults to the newest message
    #[arg(long, value_name = "ID")]
    pub id_end: Option<u32>,
}

impl MessageDownloadCommand {
    pub fn execute<B: Backend>(
        self,
        printer: &mut impl Printer,
        store: &mut MailStore<B>,
    ) -> Result<()> {
        info!("executing message download command");

        let total = store.total_messages().context("cannot count messages")?;
        let start = self.id.unwrap_or(1);
        let end = self.id_end.unwrap_or(total);

        let mut mbox = MboxWriter::append(&self.path)?;
        let mut count = 0;
        if total > 0 {
            for envelope in store.fetch_range((start, end), false)? {
                let envelope = envelope.context("cannot fetch message")?;
                mbox.write(&envelope)?;
                count += 1;
            }
        }
        mbox.flush()?;

        printer.out(format!(
            "{} message(s) successfully downloaded to {:?}\n",
            count, self.path
        ))
    }
}
