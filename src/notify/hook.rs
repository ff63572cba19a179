//! Web hook module.
//!
//! This module turns a matching message into one HTTP request: a link
//! is extracted from the message text, then spliced with the message
//! metadata into the configured body template.

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, error, info, trace, warn};
use mailaid_lib::msg::Envelope;
use regex::{Regex, RegexBuilder};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Deserialize;
use std::{collections::HashMap, time::Duration};
use url::Url;

use super::Template;

pub const DEFAULT_HOOK_METHOD: &str = "POST";
pub const HOOK_DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholders available in the body template.
pub const HOOK_PLACEHOLDERS: &[&str] = &[
    "subject",
    "subject_json",
    "date",
    "link",
    "realname",
    "fromaddr",
];

/// Represents the `[notify.hook]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HookConfig {
    /// Multi-line regex matching links in the message text. The first
    /// capture group is the link when present, the whole match
    /// otherwise.
    pub link_regex: String,
    /// Index of the link among all matches, negative values counting
    /// from the last one.
    pub link_idx: i64,
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            link_regex: String::from(r"https?://\S+"),
            link_idx: 0,
            method: DEFAULT_HOOK_METHOD.into(),
            url: String::new(),
            headers: HashMap::new(),
            body: String::new(),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, envelope: &Envelope) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, envelope: &Envelope) -> Result<()> {
        (**self).notify(envelope)
    }
}

pub struct Hook {
    link_regex: Regex,
    link_idx: i64,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Template,
    client: Client,
    dry_run: bool,
}

impl Hook {
    pub fn new(config: &HookConfig, dry_run: bool) -> Result<Self> {
        let link_regex = RegexBuilder::new(&config.link_regex)
            .multi_line(true)
            .build()
            .with_context(|| format!("cannot compile link regex {:?}", config.link_regex))?;
        let method = Method::from_bytes(config.method.trim().to_uppercase().as_bytes())
            .with_context(|| format!("cannot parse hook method {:?}", config.method))?;
        let url =
            Url::parse(&config.url).with_context(|| format!("cannot parse hook url {:?}", config.url))?;

        let mut headers = HeaderMap::new();
        for (key, val) in &config.headers {
            let key = HeaderName::from_bytes(key.as_bytes())
                .with_context(|| format!("cannot parse hook header name {:?}", key))?;
            let val = HeaderValue::from_str(val)
                .with_context(|| format!("cannot parse hook header value {:?}", val))?;
            headers.insert(key, val);
        }

        let body = Template::new(&config.body, HOOK_PLACEHOLDERS)
            .context("cannot parse hook body template")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("cannot build hook http client")?;

        Ok(Self {
            link_regex,
            link_idx: config.link_idx,
            method,
            url,
            headers,
            body,
            client,
            dry_run,
        })
    }

    /// Picks the configured link among all the links of the text.
    pub fn extract_link(&self, text: &str) -> Option<String> {
        let links: Vec<&str> = self
            .link_regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|link| link.as_str())
            .collect();
        trace!("links: {:?}", links);

        let idx = if self.link_idx < 0 {
            links.len() as i64 + self.link_idx
        } else {
            self.link_idx
        };
        usize::try_from(idx)
            .ok()
            .and_then(|idx| links.get(idx))
            .map(|link| link.to_string())
    }

    /// Renders the request body for the message and its link.
    pub fn render(&self, envelope: &Envelope, link: String) -> Result<String> {
        let subject = envelope.subject().to_owned();
        let subject_json = serde_json::to_string(&subject).context("cannot encode subject")?;
        let date = envelope
            .date()
            .map(|date| date.with_timezone(&Local).format(HOOK_DATETIME_FMT).to_string())
            .unwrap_or_default();
        let (realname, fromaddr) = envelope.sender_addr();

        let vars = HashMap::from([
            ("subject", subject),
            ("subject_json", subject_json),
            ("date", date),
            ("link", link),
            ("realname", realname.to_owned()),
            ("fromaddr", fromaddr.to_owned()),
        ]);
        self.body.render(&vars)
    }
}

impl Notifier for Hook {
    fn notify(&mut self, envelope: &Envelope) -> Result<()> {
        let link = match self.extract_link(envelope.text()) {
            Some(link) => link,
            None => {
                error!(
                    "cannot extract link from message {}:\n{}",
                    envelope.id,
                    envelope.text()
                );
                return Ok(());
            }
        };
        let body = self.render(envelope, link)?;

        if self.dry_run {
            info!("[dry run] notify for {:?}", envelope.subject());
            debug!("{} {} with body:\n{}", self.method, self.url, body);
            return Ok(());
        }

        let res = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .with_context(|| format!("cannot send hook request to {}", self.url))?;

        let status = res.status();
        if status.is_success() {
            info!("notify for {:?} status: {}", envelope.subject(), status);
        } else {
            warn!(
                "notify for {:?} failed with status {}: {}",
                envelope.subject(),
                status,
                res.text().unwrap_or_default()
            );
        }

        Ok(())
    }
}
