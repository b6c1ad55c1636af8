use trust_dns_resolver::Resolver;
use trust_dns_resolver::system_conf::read_system_conf;

use super::cache::DnsCache;
use super::{LookupError, MxError, MxLookup, MxRecord, MxStatus, ResolverOptions};
use crate::Error;

/// DNS backend used by [`MxResolver`].
pub trait LookupMx {
    /// MX records of `domain`, in DNS answer order.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupError>;

    /// Whether `domain` has at least one A or AAAA record.
    fn has_address(&self, domain: &str) -> Result<bool, LookupError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupError> {
        let lookup = Resolver::mx_lookup(self, domain)?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(mx.exchange().to_utf8())))
            .collect())
    }

    fn has_address(&self, domain: &str) -> Result<bool, LookupError> {
        match Resolver::lookup_ip(self, domain) {
            Ok(lookup) => Ok(lookup.iter().next().is_some()),
            Err(err) => match LookupError::from(&err) {
                LookupError::NoRecords => Ok(false),
                other => Err(other),
            },
        }
    }
}

/// Build a blocking resolver from the system configuration, with the
/// timeout and attempt count taken from `options`.
pub fn system_resolver(options: &ResolverOptions) -> Result<Resolver, Error> {
    let (config, mut opts) = read_system_conf().map_err(Error::resolver_init)?;
    opts.timeout = options.timeout;
    opts.attempts = options.attempts.max(1);
    Resolver::new(config, opts).map_err(Error::resolver_init)
}

/// MX resolver with a per-run cache.
///
/// One instance is meant to live for one run (a single sniff, or a whole
/// bulk batch); repeated domains are resolved once. `Records`, `SelfHosted`
/// and `NoSuchDomain` outcomes are cached, timeouts and `Unresolvable` are
/// not, so a later occurrence of the same domain retries.
#[derive(Debug)]
pub struct MxResolver<R> {
    backend: R,
    cache: DnsCache,
}

impl<R: LookupMx> MxResolver<R> {
    pub fn new(backend: R) -> Self {
        Self {
            backend,
            cache: DnsCache::default(),
        }
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }

    /// Resolve `domain`, which must already be normalised (see
    /// [`normalize_identifier`](crate::normalize_identifier)).
    pub fn resolve(&self, domain: &str) -> Result<MxLookup, MxError> {
        self.cache
            .get_or_resolve(domain, || resolve_uncached(&self.backend, domain))
    }

    /// Number of domains currently held in the cache.
    pub fn cached_domains(&self) -> usize {
        self.cache.len()
    }
}

impl MxResolver<Resolver> {
    pub fn from_system_conf(options: &ResolverOptions) -> Result<Self, Error> {
        Ok(Self::new(system_resolver(options)?))
    }
}

pub(crate) fn resolve_uncached<R>(backend: &R, domain: &str) -> Result<MxLookup, MxError>
where
    R: LookupMx + ?Sized,
{
    match backend.lookup_mx(domain) {
        Ok(records) => {
            let records = order_records(records);
            if records.is_empty() {
                implicit_mx(backend, domain)
            } else {
                Ok(MxLookup::new(domain, MxStatus::Records, records))
            }
        }
        Err(LookupError::NoSuchDomain) => {
            Ok(MxLookup::new(domain, MxStatus::NoSuchDomain, Vec::new()))
        }
        Err(LookupError::NoRecords) => implicit_mx(backend, domain),
        Err(err) => {
            tracing::warn!(domain, error = %err, "MX lookup failed");
            Err(MxError::dns_timeout(domain, &err))
        }
    }
}

/// RFC 5321 §5.1: without MX records the domain itself is the exchange,
/// provided it has an address.
fn implicit_mx<R>(backend: &R, domain: &str) -> Result<MxLookup, MxError>
where
    R: LookupMx + ?Sized,
{
    match backend.has_address(domain) {
        Ok(true) => Ok(MxLookup::new(
            domain,
            MxStatus::SelfHosted,
            vec![MxRecord::new(0, domain)],
        )),
        Ok(false) | Err(LookupError::NoRecords) => {
            Ok(MxLookup::new(domain, MxStatus::Unresolvable, Vec::new()))
        }
        Err(LookupError::NoSuchDomain) => {
            Ok(MxLookup::new(domain, MxStatus::NoSuchDomain, Vec::new()))
        }
        Err(err) => {
            tracing::warn!(domain, error = %err, "address lookup failed");
            Err(MxError::dns_timeout(domain, &err))
        }
    }
}

/// Stable sort by priority, dropping exact duplicates.
pub(crate) fn order_records(records: Vec<MxRecord>) -> Vec<MxRecord> {
    let mut ordered: Vec<MxRecord> = Vec::with_capacity(records.len());
    for record in records {
        if !ordered.contains(&record) {
            ordered.push(record);
        }
    }
    ordered.sort_by_key(|record| record.priority);
    ordered
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    if trimmed.is_empty() {
        // null MX keeps its root label
        ".".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}
