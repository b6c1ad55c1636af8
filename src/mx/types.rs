#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MxRecord {
    pub priority: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(priority: u16, exchange: impl Into<String>) -> Self {
        Self {
            priority,
            exchange: exchange.into(),
        }
    }

    /// RFC 7505 "null MX": the domain explicitly accepts no mail.
    pub fn is_null(&self) -> bool {
        self.exchange == "."
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MxStatus {
    /// The domain published MX records.
    Records,
    /// No MX records, but the domain has an address record and is used as
    /// its own exchange (implicit MX).
    SelfHosted,
    /// NXDOMAIN.
    NoSuchDomain,
    /// Neither MX nor address records.
    Unresolvable,
}

impl MxStatus {
    pub(crate) fn is_cacheable(self) -> bool {
        matches!(self, Self::Records | Self::SelfHosted | Self::NoSuchDomain)
    }
}

/// Outcome of an MX lookup. `records` is sorted by ascending priority, equal
/// priorities keeping the order of the DNS answer.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxLookup {
    pub domain: String,
    pub status: MxStatus,
    pub records: Vec<MxRecord>,
}

impl MxLookup {
    pub fn new(domain: impl Into<String>, status: MxStatus, records: Vec<MxRecord>) -> Self {
        Self {
            domain: domain.into(),
            status,
            records,
        }
    }

    pub fn records(&self) -> &[MxRecord] {
        self.records.as_slice()
    }

    /// Exchanges that can actually receive mail, in preference order.
    pub fn exchanges(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|record| !record.is_null())
            .map(|record| record.exchange.as_str())
    }

    pub fn is_null_mx(&self) -> bool {
        self.records.first().is_some_and(MxRecord::is_null)
    }
}
