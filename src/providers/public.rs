use phf::phf_set;

use crate::identifier::registrable_domain;

/// Popular public mailbox domains. Complements the `public` provider flag
/// for providers that also host private domains on the same servers (Zoho,
/// Protonmail).
static PUBLIC_DOMAINS: phf::Set<&'static str> = phf_set! {
    "aol.com",
    "gmail.com",
    "googlemail.com",
    "hotmail.com",
    "icloud.com",
    "live.com",
    "live.in",
    "mac.com",
    "mail.com",
    "mailinator.com",
    "me.com",
    "msn.com",
    "outlook.co",
    "outlook.com",
    "pm.me",
    "proton.me",
    "protonmail.ch",
    "protonmail.com",
    "rocketmail.com",
    "yahoo.co.in",
    "yahoo.co.uk",
    "yahoo.com",
    "yandex.com",
    "yandex.ru",
    "ymail.com",
    "zoho.com",
};

/// Whether `domain` (or its registrable domain) is a well-known public
/// mailbox domain. Purely name-based; no DNS involved.
pub fn is_public_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');
    PUBLIC_DOMAINS.contains(domain)
        || registrable_domain(domain).is_some_and(|parent| PUBLIC_DOMAINS.contains(parent))
}
