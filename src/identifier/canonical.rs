use super::bare_address;

/// Provider-specific rules for [`canonical_email`].
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalFlags {
    /// Mailboxes are case-insensitive at this provider.
    pub lowercase: bool,
    /// Periods in the mailbox are ignored by this provider.
    pub strip_periods: bool,
    /// Alias domains, as `(alias, canonical)` pairs.
    pub substitute_domains: Vec<(String, String)>,
}

/// Canonical form of an address, to compare addresses that reach the same
/// mailbox: the display name and any `+tag` are dropped, the domain is
/// lowercased, then `flags` are applied.
///
/// Returns `None` when `input` is not an address.
pub fn canonical_email(input: &str, flags: &CanonicalFlags) -> Option<String> {
    let address = bare_address(input);
    let (mailbox, domain) = address.rsplit_once('@')?;
    if domain.is_empty() || !is_plain_local(mailbox) {
        return None;
    }

    let mut mailbox = match mailbox.find('+') {
        Some(pos) => mailbox[..pos].to_string(),
        None => mailbox.to_string(),
    };
    if flags.strip_periods {
        mailbox.retain(|c| c != '.');
    }
    if flags.lowercase {
        mailbox = mailbox.to_lowercase();
    }
    if mailbox.is_empty() {
        return None;
    }

    let mut domain = domain.to_lowercase();
    if let Some((_, target)) = flags
        .substitute_domains
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(&domain))
    {
        domain = target.clone();
    }

    Some(format!("{mailbox}@{domain}"))
}

/// Dot-atom local part: atext plus non-leading, non-trailing, non-repeated '.'.
fn is_plain_local(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars().all(|c| {
        c.is_alphanumeric()
            || matches!(
                c,
                '!' | '#'
                    | '$'
                    | '%'
                    | '&'
                    | '\''
                    | '*'
                    | '+'
                    | '-'
                    | '/'
                    | '='
                    | '?'
                    | '^'
                    | '_'
                    | '`'
                    | '{'
                    | '|'
                    | '}'
                    | '~'
                    | '.'
            )
    })
}
