use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use clap::{ArgGroup, Parser};
use log::info;
use mailaid_lib::{backend::Backend, store::MailStore};

use crate::printer::Printer;

/// Delete messages according to one retention rule.
///
/// Deletions are committed when the command ends, unless running in
/// dry-run mode.
#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("rule").required(true)))]
pub struct MessageDeleteCommand {
    /// Delete the message with the given id
    #[arg(long, group = "rule", value_name = "ID")]
    pub id: Option<u32>,

    /// Delete the oldest messages, keeping the given number of newest
    /// ones
    #[arg(long, group = "rule", value_name = "COUNT")]
    pub keep: Option<u32>,

    /// Delete messages dated up to the given date (YYYY-MM-DD, local
    /// midnight, or RFC 3339)
    #[arg(long, group = "rule", value_name = "DATE", value_parser = date_parser)]
    pub before: Option<DateTime<FixedOffset>>,

    /// Delete messages dated from the given date (YYYY-MM-DD, local
    /// midnight, or RFC 3339)
    #[arg(long, group = "rule", value_name = "DATE", value_parser = date_parser)]
    pub after: Option<DateTime<FixedOffset>>,

    /// Delete all messages
    #[arg(long, group = "rule")]
    pub all: bool,
}

/// Parses a date argument, either a local calendar date or a full
/// RFC 3339 date time.
pub fn date_parser(date: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(date) {
        return Ok(date);
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .map(DateTime::from)
        .ok_or_else(|| format!("cannot parse date {:?}, expected YYYY-MM-DD", date))
}

impl MessageDeleteCommand {
    pub fn execute<B: Backend>(
        self,
        printer: &mut impl Printer,
        store: &mut MailStore<B>,
    ) -> Result<()> {
        info!("executing message delete command");

        let count = match self {
            Self { id: Some(id), .. } => store.mark_deleted(id).map(|()| 1),
            Self { keep: Some(keep), .. } => store.mark_deleted_keep(keep),
            Self { before: Some(before), .. } => store.mark_deleted_before(before),
            Self { after: Some(after), .. } => store.mark_deleted_after(after),
            Self { all: true, .. } => store.mark_deleted_all(),
            _ => return Err(anyhow!("cannot delete messages: missing retention rule")),
        }
        .context("cannot mark messages as deleted")?;

        store.flush().context("cannot commit deletions")?;

        if store.is_dry_run() {
            printer.out(format!("[dry run] {} message(s) would be deleted\n", count))
        } else {
            printer.out(format!("{} message(s) successfully deleted\n", count))
        }
    }
}
