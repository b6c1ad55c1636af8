use std::fmt;

use crate::error::Failure;
use crate::mx::MxRecord;
use crate::providers::{ProviderInfo, ProviderMatch};

/// How mail for a domain is routed.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routing {
    /// At least one exchange belongs to a known provider.
    Provider,
    /// The exchanges live under the domain itself, or the domain is its own
    /// implicit exchange.
    SelfHosted,
    /// RFC 7505 null MX: the domain refuses all mail.
    NullMx,
    /// MX records exist but no provider pattern matches them.
    Unrecognized,
    /// Neither MX nor address records, or the domain does not exist.
    NoMailServer,
}

impl Routing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::SelfHosted => "self_hosted",
            Self::NullMx => "null_mx",
            Self::Unrecognized => "unrecognized",
            Self::NoMailServer => "no_mail_server",
        }
    }
}

impl fmt::Display for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one identifier.
///
/// Always produced, even when normalisation or DNS fails; in that case
/// `error` is set and `matched` stays [`ProviderMatch::None`].
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SniffResult {
    pub input: String,
    pub domain: Option<String>,
    #[cfg_attr(feature = "with-serde", serde(rename = "match"))]
    pub matched: ProviderMatch,
    pub providers: Vec<ProviderInfo>,
    pub routing: Option<Routing>,
    /// Only filled in verbose mode.
    #[cfg_attr(
        feature = "with-serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub mx: Option<Vec<MxRecord>>,
    pub is_public: bool,
    pub canonical: Option<String>,
    pub error: Option<Failure>,
}

impl SniffResult {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            domain: None,
            matched: ProviderMatch::None,
            providers: Vec::new(),
            routing: None,
            mx: None,
            is_public: false,
            canonical: None,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Label used in summaries: the provider ids, or the routing when no
    /// provider matched.
    pub fn label(&self) -> String {
        match (&self.matched, self.routing) {
            (ProviderMatch::None, Some(routing)) => routing.to_string(),
            (ProviderMatch::None, None) => "unknown".to_string(),
            (matched, _) => matched.to_string(),
        }
    }
}
