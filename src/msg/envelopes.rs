//! Envelopes module.
//!
//! This module contains the printable views of decoded envelopes.

use mailaid_lib::msg::Envelope;
use serde::Serialize;
use std::fmt;

/// Display width of the sender column.
const SENDER_WIDTH: usize = 40;
/// Senders are cut to leave room for the column separator.
const SENDER_MAX_LEN: usize = 38;

/// Represents one line of the envelope listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeRow {
    pub id: u32,
    pub date: Option<String>,
    pub sender: String,
    pub subject: String,
}

impl From<&Envelope> for EnvelopeRow {
    fn from(envelope: &Envelope) -> Self {
        Self {
            id: envelope.id,
            date: envelope.date().map(|date| date.to_rfc3339()),
            sender: envelope.sender().to_owned(),
            subject: envelope.subject().to_owned(),
        }
    }
}

impl fmt::Display for EnvelopeRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sender: String = self.sender.chars().take(SENDER_MAX_LEN).collect();
        write!(
            f,
            "{:>3} {} {:<width$} {}",
            self.id,
            self.date.as_deref().unwrap_or("?"),
            sender,
            self.subject,
            width = SENDER_WIDTH
        )
    }
}

/// Represents the envelope listing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeRows {
    #[serde(rename = "envelopes")]
    pub rows: Vec<EnvelopeRow>,
}

impl FromIterator<EnvelopeRow> for EnvelopeRows {
    fn from_iter<T: IntoIterator<Item = EnvelopeRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for EnvelopeRows {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// Represents a message as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub id: u32,
    pub subject: String,
    pub date: Option<String>,
    pub sender: String,
    pub text: String,
}

impl From<&Envelope> for MessageView {
    fn from(envelope: &Envelope) -> Self {
        Self {
            id: envelope.id,
            subject: envelope.subject().to_owned(),
            date: envelope
                .date()
                .map(|date| date.format("%Y-%m-%d %H:%M:%S%:z").to_string()),
            sender: envelope.sender().to_owned(),
            text: envelope.text().to_owned(),
        }
    }
}

impl fmt::Display for MessageView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", "-".repeat(49))?;
        writeln!(f, "Subject   {}", self.subject)?;
        writeln!(f, "Date      {}", self.date.as_deref().unwrap_or("?"))?;
        writeln!(f, "From      {}", self.sender)?;
        writeln!(f)?;
        writeln!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(id: u32, from: &str, date: Option<&str>) -> Envelope {
        let mut raw = format!("From: {}\r\nSubject: Weekly report\r\n", from);
        if let Some(date) = date {
            raw.push_str(&format!("Date: {}\r\n", date));
        }
        raw.push_str("Content-Type: text/plain\r\n\r\nAll green.\r\n");
        Envelope::new(id, raw.into_bytes())
    }

    #[test]
    fn it_should_format_rows() {
        let row = EnvelopeRow::from(&envelope(7, "Bob <bob@localhost>", Some("Fri, 05 Jan 2024 12:00:00 +0000")));
        assert_eq!(
            format!("  7 2024-01-05T12:00:00+00:00 {:<40} Weekly report", "Bob <bob@localhost>"),
            row.to_string()
        );

        let row = EnvelopeRow::from(&envelope(12, &"x".repeat(50), None));
        assert_eq!(
            format!(" 12 ? {:<40} Weekly report", "x".repeat(38)),
            row.to_string()
        );
    }

    #[test]
    fn it_should_show_message() {
        let view = MessageView::from(&envelope(1, "Bob <bob@localhost>", Some("Fri, 05 Jan 2024 12:00:00 +0000")));
        let text = view.to_string();
        assert!(text.contains("Subject   Weekly report\n"));
        assert!(text.contains("Date      2024-01-05 12:00:00+00:00\n"));
        assert!(text.contains("All green."));
    }
}
