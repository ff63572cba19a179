//! Module related to email addresses.

use log::warn;

/// Splits a decoded address header into its display name and its
/// address. Returns empty strings for the missing parts.
pub fn parse_addr(value: &str) -> (String, String) {
    let value = value.trim();
    if value.is_empty() {
        return Default::default();
    }

    match mailparse::addrparse(value) {
        Ok(addrs) => match addrs.first() {
            Some(mailparse::MailAddr::Single(info)) if addrs.len() == 1 => (
                info.display_name.clone().unwrap_or_default(),
                info.addr.clone(),
            ),
            Some(mailparse::MailAddr::Group(group)) if addrs.len() == 1 => group
                .addrs
                .first()
                .map(|info| {
                    (
                        info.display_name.clone().unwrap_or_default(),
                        info.addr.clone(),
                    )
                })
                .unwrap_or_default(),
            _ => fallback_addr(value),
        },
        Err(err) => {
            warn!("cannot parse address {:?}: {}", value, err);
            fallback_addr(value)
        }
    }
}

// Handles names mailparse rejects, like unquoted commas.
fn fallback_addr(value: &str) -> (String, String) {
    match (value.rfind('<'), value.rfind('>')) {
        (Some(start), Some(end)) if start < end => {
            let name = value[..start].trim().trim_matches('"').trim().to_owned();
            (name, value[start + 1..end].trim().to_owned())
        }
        _ if value.contains('@') => (String::new(), value.to_owned()),
        _ => (value.to_owned(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_parse_named_addr() {
        assert_eq!(
            ("Alice Liddell".to_owned(), "alice@example.com".to_owned()),
            parse_addr("\"Alice Liddell\" <alice@example.com>")
        );
        assert_eq!(
            (String::new(), "bob@example.com".to_owned()),
            parse_addr("bob@example.com")
        );
        assert_eq!((String::new(), String::new()), parse_addr(" "));
    }

    #[test]
    fn it_should_fall_back_on_unquoted_commas() {
        let (name, addr) = parse_addr("Liddell, Alice <alice@example.com>");
        assert_eq!("alice@example.com", addr);
        assert!(name.contains("Alice"));
    }

    #[test]
    fn it_should_parse_group_and_multiple_addrs() {
        assert_eq!(
            ("Carol".to_owned(), "carol@example.com".to_owned()),
            parse_addr("team: Carol <carol@example.com>, dan@example.com;")
        );
        let (_, addr) = parse_addr("a@example.com, Bob <b@example.com>");
        assert_eq!("b@example.com", addr);
    }
}
