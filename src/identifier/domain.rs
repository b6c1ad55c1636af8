use super::IdentifierError;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// IDNA conversion followed by label checks. Returns the first problem found.
pub(super) fn to_ascii_domain(domain: &str) -> Result<String, IdentifierError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let ascii = idna::domain_to_ascii(trimmed).map_err(|_| IdentifierError::Idna {
        domain: trimmed.to_string(),
    })?;
    let malformed = |reason: String| IdentifierError::Malformed {
        domain: trimmed.to_string(),
        reason,
    };

    if ascii.is_empty() {
        return Err(malformed("empty after IDNA conversion".to_string()));
    }
    if ascii.len() > MAX_DOMAIN_LEN {
        return Err(malformed(format!(
            "length {} > {MAX_DOMAIN_LEN}",
            ascii.len()
        )));
    }

    for label in ascii.split('.') {
        if label.is_empty() {
            return Err(malformed("empty label".to_string()));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(malformed(format!(
                "label '{label}' length {} > {MAX_LABEL_LEN}",
                label.len()
            )));
        }
        // '_' is tolerated: such names are legal in DNS even if not as hosts.
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(malformed(format!("label '{label}' has invalid chars")));
        }
    }

    Ok(ascii.to_ascii_lowercase())
}

/// Registrable domain (public suffix plus one label), if the name has one.
pub(crate) fn registrable_domain(domain: &str) -> Option<&str> {
    psl::domain_str(domain.trim_end_matches('.'))
}
