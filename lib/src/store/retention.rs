//! Retention policies module.
//!
//! Every policy returns the number of marked messages. Only
//! [`MailStore::mark_deleted_keep`] flushes on its own, the others
//! leave the marks pending until the next flush or close.

use chrono::{DateTime, FixedOffset};
use log::{debug, info};

use crate::{
    backend::{Backend, Result},
    store::MailStore,
};

impl<B: Backend> MailStore<B> {
    /// Marks every message dated up to the threshold, oldest first.
    pub fn mark_deleted_before(&mut self, threshold: DateTime<FixedOffset>) -> Result<usize> {
        let ids = self
            .fetch_messages_before(threshold, true)?
            .map(|envelope| envelope.map(|envelope| envelope.id))
            .collect::<Result<Vec<_>>>()?;
        info!("{} message(s) dated up to {}", ids.len(), threshold);
        self.mark_all_of(&ids)
    }

    /// Marks every message dated from the threshold on, newest first.
    pub fn mark_deleted_after(&mut self, threshold: DateTime<FixedOffset>) -> Result<usize> {
        let ids = self
            .fetch_messages_after(threshold, true)?
            .map(|envelope| envelope.map(|envelope| envelope.id))
            .collect::<Result<Vec<_>>>()?;
        info!("{} message(s) dated from {}", ids.len(), threshold);
        self.mark_all_of(&ids)
    }

    /// Deletes the oldest messages until only the `keep` newest ones
    /// remain, in batches flushed one after the other.
    ///
    /// In dry-run mode nothing is deleted so the count never shrinks:
    /// a single batch is simulated.
    pub fn mark_deleted_keep(&mut self, keep: u32) -> Result<usize> {
        let batch_size = u32::try_from(self.config().batch_size).unwrap_or(u32::MAX);
        let mut marked = 0;

        loop {
            let total = self.total_messages()?;
            let to_delete = total.saturating_sub(keep);
            if to_delete == 0 {
                debug!("{} message(s) left, keeping {}", total, keep);
                break;
            }

            let upper = to_delete.min(batch_size);
            info!(
                "delete messages 1 to {} out of {}, keeping {}",
                upper, total, keep
            );
            for id in (1..=upper).rev() {
                self.mark_deleted_unchecked(id)?;
            }
            marked += upper as usize;
            self.flush()?;

            if self.is_dry_run() {
                break;
            }
        }

        Ok(marked)
    }

    /// Marks every message of the mailbox.
    pub fn mark_deleted_all(&mut self) -> Result<usize> {
        let total = self.total_messages()?;
        info!("mark all {} message(s) as deleted", total);
        for id in 1..=total {
            self.mark_deleted_unchecked(id)?;
        }
        Ok(total as usize)
    }

    fn mark_all_of(&mut self, ids: &[u32]) -> Result<usize> {
        for id in ids {
            self.mark_deleted_unchecked(*id)?;
        }
        Ok(ids.len())
    }
}
