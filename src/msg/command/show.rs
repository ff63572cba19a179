use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use mailaid_lib::{backend::Backend, store::MailStore};

use crate::{msg::MessageView, printer::Printer};

/// Show one message.
#[derive(Debug, Parser)]
pub struct MessageShowCommand {
    /// The message id, negative ids counting from the newest one
    /// (-1 being the newest)
    #[arg(value_name = "ID", allow_negative_numbers = true)]
    pub id: i64,
}

/// Turns a possibly negative id into a message id.
pub fn resolve_id(id: i64, total: u32) -> Result<u32> {
    let resolved = if id < 0 { total as i64 + id + 1 } else { id };
    u32::try_from(resolved)
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| anyhow!("cannot find message {}: valid ids range from 1 to {}", id, total))
}

impl MessageShowCommand {
    pub fn execute<B: Backend>(
        self,
        printer: &mut impl Printer,
        store: &mut MailStore<B>,
    ) -> Result<()> {
        info!("executing message show command");

        let total = store.total_messages().context("cannot count messages")?;
        let id = resolve_id(self.id, total)?;
        let envelope = store
            .fetch(id, false)
            .with_context(|| format!("cannot fetch message {}", id))?;

        printer.out(MessageView::from(&envelope))
    }
}
