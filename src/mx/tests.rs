use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use super::resolver::{normalize_exchange, order_records, resolve_uncached};
use super::{LookupError, LookupMx, MxError, MxRecord, MxResolver, MxStatus};

/// Table-driven resolver for tests. Domains without an MX entry answer
/// `NoRecords`; domains without an address entry have no A record.
#[derive(Debug, Default)]
pub(crate) struct StubResolver {
    mx: HashMap<String, Result<Vec<MxRecord>, LookupError>>,
    addresses: HashSet<String>,
    delay: Option<Duration>,
    pub queries: AtomicUsize,
}

impl StubResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mx(mut self, domain: &str, records: &[(u16, &str)]) -> Self {
        let records = records
            .iter()
            .map(|(priority, exchange)| MxRecord::new(*priority, *exchange))
            .collect();
        self.mx.insert(domain.to_string(), Ok(records));
        self
    }

    pub(crate) fn fail(mut self, domain: &str, err: LookupError) -> Self {
        self.mx.insert(domain.to_string(), Err(err));
        self
    }

    pub(crate) fn address(mut self, domain: &str) -> Self {
        self.addresses.insert(domain.to_string());
        self
    }

    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl LookupMx for StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, LookupError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.mx
            .get(domain)
            .cloned()
            .unwrap_or(Err(LookupError::NoRecords))
    }

    fn has_address(&self, domain: &str) -> Result<bool, LookupError> {
        Ok(self.addresses.contains(domain))
    }
}

/// The common fixtures used across the crate's tests.
pub(crate) fn google_fixture() -> StubResolver {
    StubResolver::new()
        .mx(
            "google.com",
            &[
                (20, "alt1.aspmx.l.google.com"),
                (10, "aspmx.l.google.com"),
                (30, "alt2.aspmx.l.google.com"),
            ],
        )
        .mx(
            "gmail.com",
            &[
                (5, "gmail-smtp-in.l.google.com"),
                (10, "alt1.gmail-smtp-in.l.google.com"),
            ],
        )
        .mx("example.com", &[(0, ".")])
        .fail("__invalid_domain_name__.com", LookupError::NoSuchDomain)
}

#[test]
fn records_sorted_by_priority_keeping_answer_order_on_ties() {
    let stub = StubResolver::new().mx(
        "example.com",
        &[
            (20, "mx2.example.com"),
            (10, "b.example.com"),
            (10, "a.example.com"),
            (10, "b.example.com"),
            (30, "mx3.example.com"),
        ],
    );

    let lookup = resolve_uncached(&stub, "example.com").expect("lookup succeeds");
    assert_eq!(lookup.status, MxStatus::Records);
    let exchanges: Vec<_> = lookup.records.iter().map(|r| r.exchange.as_str()).collect();
    assert_eq!(
        exchanges,
        ["b.example.com", "a.example.com", "mx2.example.com", "mx3.example.com"]
    );
}

#[test]
fn nxdomain_is_empty_and_tagged() {
    let stub = StubResolver::new().fail("nope.example", LookupError::NoSuchDomain);
    let lookup = resolve_uncached(&stub, "nope.example").expect("not an error");
    assert_eq!(lookup.status, MxStatus::NoSuchDomain);
    assert!(lookup.records.is_empty());
}

#[test]
fn no_mx_with_address_is_self_hosted() {
    let stub = StubResolver::new().address("solo.example");
    let lookup = resolve_uncached(&stub, "solo.example").expect("lookup succeeds");
    assert_eq!(lookup.status, MxStatus::SelfHosted);
    assert_eq!(lookup.records, vec![MxRecord::new(0, "solo.example")]);
}

#[test]
fn no_mx_and_no_address_is_unresolvable() {
    let stub = StubResolver::new();
    let lookup = resolve_uncached(&stub, "void.example").expect("lookup succeeds");
    assert_eq!(lookup.status, MxStatus::Unresolvable);
    assert!(lookup.records.is_empty());

    // an empty answer behaves like NoRecords
    let stub = StubResolver::new().mx("void.example", &[]);
    let lookup = resolve_uncached(&stub, "void.example").expect("lookup succeeds");
    assert_eq!(lookup.status, MxStatus::Unresolvable);
}

#[test]
fn timeouts_and_transient_failures_are_errors() {
    let stub = StubResolver::new()
        .fail("slow.example", LookupError::Timeout)
        .fail("broken.example", LookupError::Transient("SERVFAIL".into()));
    assert!(matches!(
        resolve_uncached(&stub, "slow.example"),
        Err(MxError::DnsTimeout { .. })
    ));
    assert!(matches!(
        resolve_uncached(&stub, "broken.example"),
        Err(MxError::DnsTimeout { .. })
    ));
}

#[test]
fn cache_reuses_records_and_nxdomain() {
    let resolver = MxResolver::new(google_fixture());
    for _ in 0..3 {
        resolver.resolve("google.com").unwrap();
        resolver.resolve("__invalid_domain_name__.com").unwrap();
    }
    assert_eq!(resolver.backend().query_count(), 2);
    assert_eq!(resolver.cached_domains(), 2);
}

#[test]
fn cache_skips_timeouts_and_unresolvable() {
    let resolver = MxResolver::new(
        StubResolver::new().fail("slow.example", LookupError::Timeout),
    );
    assert!(resolver.resolve("slow.example").is_err());
    assert!(resolver.resolve("slow.example").is_err());
    assert_eq!(resolver.resolve("void.example").unwrap().status, MxStatus::Unresolvable);
    assert_eq!(resolver.resolve("void.example").unwrap().status, MxStatus::Unresolvable);
    assert_eq!(resolver.backend().query_count(), 4);
    assert_eq!(resolver.cached_domains(), 0);
}

#[test]
fn concurrent_lookups_of_one_domain_collapse() {
    let resolver = Arc::new(MxResolver::new(
        google_fixture().delay(Duration::from_millis(50)),
    ));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || resolver.resolve("google.com").unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(resolver.backend().query_count(), 1);
}

#[test]
fn order_records_drops_duplicates_only() {
    let out = order_records(vec![
        MxRecord::new(10, "a"),
        MxRecord::new(10, "a"),
        MxRecord::new(20, "a"),
    ]);
    assert_eq!(out, vec![MxRecord::new(10, "a"), MxRecord::new(20, "a")]);
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    assert_eq!(normalize_exchange("Mail.EXAMPLE.com.".to_string()), "mail.example.com");
    assert_eq!(normalize_exchange(".".to_string()), ".");
}
