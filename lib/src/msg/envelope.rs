//! Envelope module.
//!
//! This module contains the representation of a fetched message. The
//! raw bytes are kept as is, every field is decoded on first access
//! and then memoized.

use chrono::{DateTime, FixedOffset};
use log::{trace, warn};
use mailparse::{DispositionType, ParsedMail};
use once_cell::unsync::OnceCell;
use std::fmt;

use super::{decode_header, parse_addr, parse_date};

/// Represents a message fetched from a backend, either header-only
/// or full.
///
/// The id is the backend ordinal of the message and is only
/// meaningful within the session that fetched it.
pub struct Envelope {
    pub id: u32,
    raw: Vec<u8>,
    headers: OnceCell<Vec<(String, Vec<u8>)>>,
    subject: OnceCell<String>,
    sender: OnceCell<String>,
    sender_addr: OnceCell<(String, String)>,
    to: OnceCell<String>,
    cc: OnceCell<String>,
    bcc: OnceCell<String>,
    date: OnceCell<Option<DateTime<FixedOffset>>>,
    plain: OnceCell<String>,
    html: OnceCell<String>,
}

impl Envelope {
    pub fn new(id: u32, raw: Vec<u8>) -> Self {
        Self {
            id,
            raw,
            headers: OnceCell::new(),
            subject: OnceCell::new(),
            sender: OnceCell::new(),
            sender_addr: OnceCell::new(),
            to: OnceCell::new(),
            cc: OnceCell::new(),
            bcc: OnceCell::new(),
            date: OnceCell::new(),
            plain: OnceCell::new(),
            html: OnceCell::new(),
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }

    fn headers(&self) -> &[(String, Vec<u8>)] {
        self.headers.get_or_init(|| match mailparse::parse_headers(&self.raw) {
            Ok((headers, _)) => headers
                .iter()
                .map(|h| (h.get_key().to_lowercase(), h.get_value_raw().to_vec()))
                .collect(),
            Err(err) => {
                warn!("cannot parse headers of message {}: {}", self.id, err);
                Vec::new()
            }
        })
    }

    /// Returns the raw value of the first header matching the given
    /// case-insensitive key.
    pub fn header_raw(&self, key: &str) -> Option<&[u8]> {
        let key = key.to_lowercase();
        self.headers()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Returns the decoded value of the first header matching the
    /// given key, or an empty string.
    pub fn header(&self, key: &str) -> String {
        self.header_raw(key).map(decode_header).unwrap_or_default()
    }

    pub fn subject(&self) -> &str {
        self.subject
            .get_or_init(|| self.header("subject").replace(['\r', '\n'], ""))
    }

    /// Returns the decoded `From` header.
    pub fn sender(&self) -> &str {
        self.sender.get_or_init(|| self.header("from"))
    }

    /// Returns the display name and the address of the sender.
    pub fn sender_addr(&self) -> (&str, &str) {
        let (name, addr) = self.sender_addr.get_or_init(|| parse_addr(self.sender()));
        (name, addr)
    }

    pub fn to(&self) -> &str {
        self.to.get_or_init(|| self.header("to"))
    }

    pub fn cc(&self) -> &str {
        self.cc.get_or_init(|| self.header("cc"))
    }

    pub fn bcc(&self) -> &str {
        self.bcc.get_or_init(|| self.header("bcc"))
    }

    /// Returns the date of the message, taken from the `Date` header
    /// or else from the timestamp of the first `Received` header.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        *self.date.get_or_init(|| {
            let date = self.header("date");
            if !date.is_empty() {
                return parse_date(&date);
            }

            let received = self.header("received");
            match received.rsplit_once(';') {
                Some((_, date)) => parse_date(date),
                None => {
                    warn!("cannot find date of message {}", self.id);
                    None
                }
            }
        })
    }

    /// Returns the first text/plain part, or an empty string.
    pub fn plain(&self) -> &str {
        self.plain.get_or_init(|| self.first_by_type("text/plain"))
    }

    /// Returns the first text/html part, or an empty string.
    pub fn html(&self) -> &str {
        self.html.get_or_init(|| self.first_by_type("text/html"))
    }

    /// Returns the plain text body, falling back to the html one.
    pub fn text(&self) -> &str {
        match self.plain() {
            "" => self.html(),
            plain => plain,
        }
    }

    /// Returns the body of the first non-attachment part matching the
    /// given mime type. A message that is not multipart returns its
    /// only body whatever its type.
    pub fn first_by_type(&self, mime: &str) -> String {
        let parsed = match mailparse::parse_mail(&self.raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("cannot parse message {}: {}", self.id, err);
                return String::from_utf8_lossy(&self.raw).into_owned();
            }
        };

        if parsed.subparts.is_empty() {
            return body_text(&parsed);
        }

        find_part_rec(&parsed, mime)
            .map(body_text)
            .unwrap_or_else(|| {
                trace!("no {} part found in message {}", mime, self.id);
                String::new()
            })
    }
}

fn find_part_rec<'a>(part: &'a ParsedMail<'a>, mime: &str) -> Option<&'a ParsedMail<'a>> {
    if part.subparts.is_empty() {
        let is_attachment = matches!(
            part.get_content_disposition().disposition,
            DispositionType::Attachment
        );
        if !is_attachment && part.ctype.mimetype.eq_ignore_ascii_case(mime) {
            return Some(part);
        }
        return None;
    }

    part.subparts
        .iter()
        .find_map(|subpart| find_part_rec(subpart, mime))
}

fn body_text(part: &ParsedMail) -> String {
    match part.get_body() {
        Ok(body) => body,
        Err(err) => {
            warn!("cannot decode body part: {}", err);
            String::from_utf8_lossy(part.get_body_raw().as_deref().unwrap_or_default())
                .into_owned()
        }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("size", &self.raw.len())
            .finish()
    }
}
