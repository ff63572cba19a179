use log::trace;
use mailaid_lib::msg::Envelope;
use serde::Deserialize;

/// Represents the `[notify.filter]` section of the config file.
///
/// Empty rules let every message through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Text the subject must contain.
    pub subject_keyword: Option<String>,
    /// Sender addresses allowed to trigger a notification.
    pub from_addrs: Vec<String>,
    /// Sender display names never triggering a notification.
    pub ignore_realnames: Vec<String>,
}

impl FilterConfig {
    pub fn matches(&self, envelope: &Envelope) -> bool {
        if let Some(keyword) = &self.subject_keyword {
            if !envelope.subject().contains(keyword.as_str()) {
                trace!("message {}: subject without {:?}", envelope.id, keyword);
                return false;
            }
        }

        let (realname, addr) = envelope.sender_addr();
        if !self.from_addrs.is_empty()
            && !self
                .from_addrs
                .iter()
                .any(|from| from.trim().eq_ignore_ascii_case(addr))
        {
            trace!("message {}: sender {:?} not allowed", envelope.id, addr);
            return false;
        }

        if self.ignore_realnames.iter().any(|name| name == realname) {
            trace!("message {}: sender name {:?} ignored", envelope.id, realname);
            return false;
        }

        true
    }
}
