//! Body template module.
//!
//! Templates hold `$name` or `${name}` placeholders, `$$` standing for
//! a literal dollar sign.

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})")
        .expect("cannot compile placeholder regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses the template, rejecting stray dollar signs and
    /// placeholders outside the given names.
    pub fn new(src: &str, names: &[&str]) -> Result<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(src) {
            let whole = match caps.get(0) {
                Some(whole) => whole,
                None => continue,
            };
            push_text(&mut text, &src[last..whole.start()])?;
            last = whole.end();

            if caps.get(1).is_some() {
                text.push('$');
                continue;
            }

            let name = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|name| name.as_str())
                .unwrap_or_default();
            if !names.contains(&name) {
                return Err(anyhow!(
                    "cannot use unknown placeholder ${} in template, expected one of {}",
                    name,
                    names.join(", ")
                ));
            }
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Var(name.to_owned()));
        }

        push_text(&mut text, &src[last..])?;
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, vars: &HashMap<&str, String>) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(name) => out.push_str(
                    vars.get(name.as_str())
                        .ok_or_else(|| anyhow!("cannot render template: missing value for ${}", name))?,
                ),
            }
        }
        Ok(out)
    }
}

fn push_text(text: &mut String, chunk: &str) -> Result<()> {
    if let Some(pos) = chunk.find('$') {
        return Err(anyhow!("cannot parse template: invalid placeholder near {:?}", &chunk[pos..]));
    }
    text.push_str(chunk);
    Ok(())
}
