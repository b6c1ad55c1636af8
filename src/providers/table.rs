use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, LazyLock};

use super::data::{PROVIDERS, StaticProvider};
use super::public;
use super::{Pattern, Specificity, TableError};
use crate::identifier::{CanonicalFlags, registrable_domain};

const RESERVED_IDS: [&str; 4] = ["self", "unknown", "nomx", "nullmx"];

/// Provider definition as written in a table (built-in or JSON).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSpec {
    pub id: String,
    /// MX hostname patterns.
    pub mx: Vec<String>,
    /// Mailbox domains known to be served by this provider.
    pub domains: Vec<String>,
    pub title: Option<String>,
    pub note: Option<String>,
    pub url: Option<String>,
    /// The provider hands out public mailboxes.
    pub public: bool,
    pub canonical: CanonicalFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub id: String,
    pub title: Option<String>,
    pub note: Option<String>,
    pub url: Option<String>,
    pub public: bool,
    pub domains: Vec<String>,
    pub canonical: CanonicalFlags,
}

impl Provider {
    pub fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            note: self.note.clone(),
            url: self.url.clone(),
            public: self.public,
        }
    }
}

/// Public metadata of a matched provider.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: String,
    pub title: Option<String>,
    pub note: Option<String>,
    pub url: Option<String>,
    pub public: bool,
}

/// Result of matching a set of MX hostnames.
///
/// `Multiple` only appears when distinct providers tie at the best
/// specificity reached by any hostname (co-hosted mail, overlapping
/// patterns); its ids are sorted.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "with-serde",
    serde(tag = "kind", content = "providers", rename_all = "snake_case")
)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProviderMatch {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl ProviderMatch {
    fn from_ids(mut ids: Vec<String>) -> Self {
        ids.sort();
        ids.dedup();
        match ids.len() {
            0 => Self::None,
            1 => Self::Single(ids.remove(0)),
            _ => Self::Multiple(ids),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::Single(id) => vec![id.as_str()],
            Self::Multiple(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    /// The provider id when the match is unambiguous.
    pub fn single(&self) -> Option<&str> {
        match self {
            Self::Single(id) => Some(id),
            _ => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids().contains(&id)
    }
}

impl fmt::Display for ProviderMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ids().join(" "))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    pattern: Pattern,
    specificity: Specificity,
    provider: usize,
}

/// Immutable provider table.
///
/// Patterns are sorted once at load time, most specific first (ties broken
/// by pattern text, then provider id), so matching never depends on the
/// order providers were declared in.
#[derive(Debug, Clone)]
pub struct ProviderTable {
    providers: Vec<Provider>,
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
    by_domain: HashMap<String, usize>,
    public_domains: HashSet<String>,
}

static BUILTIN: LazyLock<Result<Arc<ProviderTable>, TableError>> =
    LazyLock::new(|| ProviderTable::from_specs(builtin_specs()).map(Arc::new));

impl ProviderTable {
    /// The table compiled into the crate, loaded on first use.
    pub fn builtin() -> Result<Arc<ProviderTable>, TableError> {
        BUILTIN.as_ref().map(Arc::clone).map_err(Clone::clone)
    }

    pub fn from_specs(specs: Vec<ProviderSpec>) -> Result<Self, TableError> {
        let mut providers = Vec::with_capacity(specs.len());
        let mut entries = Vec::new();
        let mut by_id = HashMap::new();
        let mut by_domain: HashMap<String, usize> = HashMap::new();
        let mut public_domains = HashSet::new();

        for spec in specs {
            let id = spec.id.trim().to_string();
            if id.is_empty() {
                return Err(TableError::EmptyId);
            }
            if RESERVED_IDS.contains(&id.as_str()) {
                return Err(TableError::ReservedId(id));
            }
            if by_id.contains_key(&id) {
                return Err(TableError::DuplicateProvider(id));
            }
            if spec.mx.is_empty() {
                return Err(TableError::NoPatterns(id));
            }

            let index = providers.len();
            let mut seen = HashSet::new();
            for raw in &spec.mx {
                let pattern =
                    Pattern::parse(raw).map_err(|reason| TableError::InvalidPattern {
                        provider: id.clone(),
                        pattern: raw.clone(),
                        reason,
                    })?;
                if seen.insert(pattern.as_str().to_string()) {
                    entries.push(Entry {
                        specificity: pattern.specificity(),
                        pattern,
                        provider: index,
                    });
                }
            }

            let domains: Vec<String> = spec
                .domains
                .iter()
                .map(|domain| domain.trim().trim_end_matches('.').to_ascii_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect();
            for domain in &domains {
                if let Some(&other) = by_domain.get(domain) {
                    let first: &Provider = &providers[other];
                    return Err(TableError::DuplicateDomain {
                        domain: domain.clone(),
                        first: first.id.clone(),
                        second: id,
                    });
                }
                by_domain.insert(domain.clone(), index);
                if spec.public {
                    public_domains.insert(domain.clone());
                }
            }

            by_id.insert(id.clone(), index);
            providers.push(Provider {
                id,
                title: spec.title,
                note: spec.note,
                url: spec.url,
                public: spec.public,
                domains,
                canonical: spec.canonical,
            });
        }

        entries.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then_with(|| a.pattern.as_str().cmp(b.pattern.as_str()))
                .then_with(|| providers[a.provider].id.cmp(&providers[b.provider].id))
        });

        tracing::debug!(
            providers = providers.len(),
            patterns = entries.len(),
            "provider table loaded"
        );

        Ok(Self {
            providers,
            entries,
            by_id,
            by_domain,
            public_domains,
        })
    }

    /// Load a table from a JSON array of [`ProviderSpec`].
    #[cfg(feature = "with-serde")]
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let specs: Vec<ProviderSpec> =
            serde_json::from_str(json).map_err(|err| TableError::Json(err.to_string()))?;
        Self::from_specs(specs)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.by_id.get(id).map(|&index| &self.providers[index])
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    /// Patterns in matching order, with the id of their provider.
    pub fn patterns(&self) -> impl Iterator<Item = (&Pattern, &str)> {
        self.entries
            .iter()
            .map(|entry| (&entry.pattern, self.providers[entry.provider].id.as_str()))
    }

    /// Provider whose static `domains` list contains `domain` or its
    /// registrable domain.
    pub fn provider_for_domain(&self, domain: &str) -> Option<&Provider> {
        let domain = domain.trim_end_matches('.');
        self.by_domain
            .get(domain)
            .or_else(|| registrable_domain(domain).and_then(|parent| self.by_domain.get(parent)))
            .map(|&index| &self.providers[index])
    }

    /// Public-domain tag: the built-in public list plus the domains of
    /// providers flagged `public`. Independent of any MX data.
    pub fn is_public_domain(&self, domain: &str) -> bool {
        let domain = domain.trim_end_matches('.');
        public::is_public_domain(domain)
            || self.public_domains.contains(domain)
            || registrable_domain(domain).is_some_and(|parent| self.public_domains.contains(parent))
    }

    /// Match MX exchange hostnames against the table.
    ///
    /// Each hostname contributes the providers matching it at its own best
    /// specificity; across hostnames only the overall best specificity is
    /// kept.
    pub fn match_exchanges<'a, I>(&self, exchanges: I) -> ProviderMatch
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<Specificity> = None;
        let mut winners: BTreeSet<usize> = BTreeSet::new();

        for host in exchanges {
            let Some((specificity, providers)) = self.best_for_host(host) else {
                continue;
            };
            match best {
                Some(current) if specificity < current => {}
                Some(current) if specificity == current => winners.extend(providers),
                _ => {
                    best = Some(specificity);
                    winners = providers;
                }
            }
        }

        ProviderMatch::from_ids(
            winners
                .into_iter()
                .map(|index| self.providers[index].id.clone())
                .collect(),
        )
    }

    fn best_for_host(&self, host: &str) -> Option<(Specificity, BTreeSet<usize>)> {
        let mut found: Option<(Specificity, BTreeSet<usize>)> = None;
        for entry in &self.entries {
            if let Some((specificity, _)) = &found {
                if entry.specificity < *specificity {
                    break;
                }
            }
            if entry.pattern.matches(host) {
                found
                    .get_or_insert_with(|| (entry.specificity, BTreeSet::new()))
                    .1
                    .insert(entry.provider);
            }
        }
        found
    }
}

fn builtin_specs() -> Vec<ProviderSpec> {
    PROVIDERS
        .entries()
        .map(|(id, provider)| spec_from_static(id, provider))
        .collect()
}

fn spec_from_static(id: &str, provider: &StaticProvider) -> ProviderSpec {
    ProviderSpec {
        id: id.to_string(),
        mx: provider.mx.iter().map(|p| p.to_string()).collect(),
        domains: provider.domains.iter().map(|d| d.to_string()).collect(),
        title: provider.title.map(str::to_string),
        note: provider.note.map(str::to_string),
        url: provider.url.map(str::to_string),
        public: provider.public,
        canonical: CanonicalFlags {
            lowercase: provider.canonical.lowercase,
            strip_periods: provider.canonical.strip_periods,
            substitute_domains: provider
                .canonical
                .substitute
                .iter()
                .map(|(alias, target)| (alias.to_string(), target.to_string()))
                .collect(),
        },
    }
}
