//! Identifier normalisation: email address, URL or bare domain to an ASCII
//! domain suitable for an MX query.

mod canonical;
mod domain;

pub use canonical::{CanonicalFlags, canonical_email};
pub(crate) use domain::registrable_domain;

use std::borrow::Cow;

use thiserror::Error;
use url::Url;

use domain::to_ascii_domain;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,
    #[error("no host found in '{input}'")]
    NoHost { input: String },
    #[error("URL parse failed for '{input}': {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },
    #[error("domain '{domain}' failed IDNA conversion")]
    Idna { domain: String },
    #[error("domain '{domain}' is malformed: {reason}")]
    Malformed { domain: String, reason: String },
}

/// Extract the domain part of `input` and return it lowercased and
/// IDNA-encoded.
///
/// * anything containing `@` is treated as an address and the text after the
///   last `@` is used (`Name <user@host>` is unwrapped first);
/// * anything containing `://` or starting with `www.` is parsed as a URL,
///   keeping only the host without a leading `www.`;
/// * everything else is a bare domain.
///
/// With `registrable` set, the result is further reduced to its registrable
/// domain (`mail.example.co.uk` becomes `example.co.uk`). MX records belong to
/// the exact name, so callers normally leave it off.
pub fn normalize_identifier(input: &str, registrable: bool) -> Result<String, IdentifierError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let candidate: Cow<'_, str> = if trimmed.contains('@') {
        Cow::Borrowed(address_domain(trimmed))
    } else if trimmed.contains("://") || has_www_prefix(trimmed) {
        Cow::Owned(url_host(trimmed)?)
    } else {
        Cow::Borrowed(trimmed)
    };

    if candidate.trim().is_empty() {
        return Err(IdentifierError::NoHost {
            input: trimmed.to_string(),
        });
    }

    let ascii = to_ascii_domain(candidate.trim())?;
    if registrable {
        let reduced = registrable_domain(&ascii).map(str::to_string);
        Ok(reduced.unwrap_or(ascii))
    } else {
        Ok(ascii)
    }
}

/// `Name <user@host>` → `user@host`; anything else is returned trimmed.
pub(crate) fn bare_address(input: &str) -> &str {
    let trimmed = input.trim();
    if let Some(start) = trimmed.rfind('<') {
        if let Some(len) = trimmed[start + 1..].find('>') {
            return trimmed[start + 1..start + 1 + len].trim();
        }
    }
    trimmed
}

fn address_domain(input: &str) -> &str {
    let address = bare_address(input);
    match address.rsplit_once('@') {
        Some((_, domain)) => domain.trim(),
        None => "",
    }
}

fn has_www_prefix(input: &str) -> bool {
    input
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."))
}

fn url_host(input: &str) -> Result<String, IdentifierError> {
    let with_scheme: Cow<'_, str> = if input.contains("://") {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("http://{input}"))
    };
    let url = Url::parse(&with_scheme).map_err(|source| IdentifierError::Url {
        input: input.to_string(),
        source,
    })?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| IdentifierError::NoHost {
            input: input.to_string(),
        })?;
    let host = if has_www_prefix(host) { &host[4..] } else { host };
    Ok(host.to_string())
}
