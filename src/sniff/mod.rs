//! Single-identifier classification.
//!
//! A [`Sniffer`] owns the resolver (and so the per-run DNS cache) and a
//! shared, read-only [`ProviderTable`]. [`Sniffer::sniff`] never fails:
//! problems with the input or with DNS are recorded in
//! [`SniffResult::error`].

mod options;
mod types;


pub use options::SniffOptions;
pub use types::{Routing, SniffResult};

use std::sync::Arc;

use trust_dns_resolver::Resolver;

use crate::error::{Error, Failure, FailureKind};
use crate::identifier::{CanonicalFlags, canonical_email, normalize_identifier, registrable_domain};
use crate::mx::{LookupMx, MxLookup, MxResolver, MxStatus};
use crate::probe::{self, ProbeOptions, ProbeResult};
use crate::providers::{ProviderMatch, ProviderTable};

/// Classify one identifier with the system resolver and the built-in
/// provider table.
pub fn mxsniff(input: &str, options: &SniffOptions) -> Result<SniffResult, Error> {
    let sniffer = Sniffer::from_system_conf(options.clone())?;
    Ok(sniffer.sniff(input))
}

#[derive(Debug)]
pub struct Sniffer<R> {
    resolver: MxResolver<R>,
    table: Arc<ProviderTable>,
    options: SniffOptions,
}

impl Sniffer<Resolver> {
    /// System resolver configured from `options.resolver`, built-in table.
    pub fn from_system_conf(options: SniffOptions) -> Result<Self, Error> {
        let resolver = MxResolver::from_system_conf(&options.resolver)?;
        Ok(Self::with_resolver(resolver, ProviderTable::builtin()?, options))
    }
}

impl<R: LookupMx> Sniffer<R> {
    pub fn new(backend: R, table: Arc<ProviderTable>, options: SniffOptions) -> Self {
        Self::with_resolver(MxResolver::new(backend), table, options)
    }

    pub fn with_resolver(
        resolver: MxResolver<R>,
        table: Arc<ProviderTable>,
        options: SniffOptions,
    ) -> Self {
        Self {
            resolver,
            table,
            options,
        }
    }

    pub fn resolver(&self) -> &MxResolver<R> {
        &self.resolver
    }

    pub fn table(&self) -> &ProviderTable {
        &self.table
    }

    pub fn options(&self) -> &SniffOptions {
        &self.options
    }

    /// Probe `address` through this sniffer's resolver, sharing its cache.
    pub fn probe(&self, address: &str, options: &ProbeOptions) -> ProbeResult {
        probe::probe_with(&self.resolver, address, options)
    }

    pub fn sniff(&self, input: &str) -> SniffResult {
        let mut result = SniffResult::new(input);

        let domain = match normalize_identifier(input, self.options.registrable_domain) {
            Ok(domain) => domain,
            Err(err) => {
                tracing::debug!(input, error = %err, "identifier rejected");
                result.error = Some(Failure::new(FailureKind::InvalidIdentifier, err.to_string()));
                return result;
            }
        };
        result.is_public = self.table.is_public_domain(&domain);

        let static_hit = if self.options.use_static_domains {
            self.table.provider_for_domain(&domain)
        } else {
            None
        };
        if let Some(provider) = static_hit {
            result.matched = ProviderMatch::Single(provider.id.clone());
            result.routing = Some(Routing::Provider);
        } else {
            match self.resolver.resolve(&domain) {
                Ok(lookup) => self.apply_lookup(&mut result, &lookup),
                Err(err) => result.error = Some(Failure::from(&err)),
            }
        }

        result.providers = result
            .matched
            .ids()
            .into_iter()
            .filter_map(|id| self.table.provider(id))
            .map(|provider| provider.info())
            .collect();
        if input.contains('@') {
            result.canonical = canonical_email(input, self.canonical_flags(&result.matched));
        }
        result.domain = Some(domain);
        result
    }

    fn apply_lookup(&self, result: &mut SniffResult, lookup: &MxLookup) {
        if self.options.verbose {
            result.mx = Some(lookup.records.clone());
        }
        result.matched = self.table.match_exchanges(lookup.exchanges());
        result.routing = Some(routing(lookup, &result.matched));
        result.error = match lookup.status {
            MxStatus::NoSuchDomain => Some(Failure::new(
                FailureKind::NoSuchDomain,
                format!("{} does not exist", lookup.domain),
            )),
            MxStatus::Unresolvable => Some(Failure::new(
                FailureKind::Unresolvable,
                format!("{} has neither MX nor address records", lookup.domain),
            )),
            MxStatus::Records | MxStatus::SelfHosted => None,
        };
    }

    fn canonical_flags(&self, matched: &ProviderMatch) -> &CanonicalFlags {
        static PLAIN: CanonicalFlags = CanonicalFlags {
            lowercase: false,
            strip_periods: false,
            substitute_domains: Vec::new(),
        };
        matched
            .single()
            .and_then(|id| self.table.provider(id))
            .map_or(&PLAIN, |provider| &provider.canonical)
    }
}

fn routing(lookup: &MxLookup, matched: &ProviderMatch) -> Routing {
    if !matched.is_none() {
        return Routing::Provider;
    }
    match lookup.status {
        MxStatus::NoSuchDomain | MxStatus::Unresolvable => Routing::NoMailServer,
        MxStatus::SelfHosted => Routing::SelfHosted,
        MxStatus::Records if lookup.is_null_mx() => Routing::NullMx,
        MxStatus::Records if is_own_exchange(lookup) => Routing::SelfHosted,
        MxStatus::Records => Routing::Unrecognized,
    }
}

/// At least one exchange lives under the domain's own registrable domain.
/// Third-party backup exchanges do not change that.
fn is_own_exchange(lookup: &MxLookup) -> bool {
    let owner = registrable_domain(&lookup.domain).unwrap_or(lookup.domain.as_str());
    lookup
        .exchanges()
        .any(|exchange| registrable_domain(exchange).unwrap_or(exchange) == owner)
}
