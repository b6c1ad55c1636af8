#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::mx::ResolverOptions;

/// Settings for [`Sniffer`](super::Sniffer).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SniffOptions {
    /// Include the MX records in each result.
    pub verbose: bool,
    /// Match domains listed in a provider's `domains` without querying DNS.
    pub use_static_domains: bool,
    /// Reduce hosts to their registrable domain (`mail.example.co.uk` to
    /// `example.co.uk`) before the lookup.
    pub registrable_domain: bool,
    pub resolver: ResolverOptions,
}

impl SniffOptions {
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }
}
