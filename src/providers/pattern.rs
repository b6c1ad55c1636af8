use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Label {
    Fixed(String),
    Any,
}

/// How precisely a pattern pins down a hostname. Exact patterns beat
/// wildcard ones; between wildcards, more fixed labels win.
///
/// All exact patterns rank equal whatever their length, so exact matches on
/// hosts of different depth still tie.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Specificity {
    pub exact: bool,
    pub fixed_labels: usize,
}

impl Specificity {
    fn rank(&self) -> (bool, usize) {
        if self.exact {
            (true, 0)
        } else {
            (false, self.fixed_labels)
        }
    }
}

impl PartialEq for Specificity {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Specificity {}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl Hash for Specificity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
    }
}

/// An MX hostname pattern. Each `*` label matches exactly one hostname
/// label, so `*.l.google.com` matches `aspmx.l.google.com` but neither
/// `l.google.com` nor `alt1.aspmx.l.google.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    labels: Vec<Label>,
}

impl Pattern {
    /// Parse a pattern. On error, returns the reason as text.
    pub fn parse(source: &str) -> Result<Self, String> {
        let normalized = source.trim().trim_end_matches('.').to_ascii_lowercase();
        if normalized.is_empty() {
            return Err("pattern is empty".to_string());
        }

        let mut labels = Vec::new();
        for raw in normalized.split('.') {
            let label = match raw {
                "" => return Err("empty label".to_string()),
                "*" => Label::Any,
                _ if raw.contains('*') => {
                    return Err(format!("partial wildcard in label '{raw}'"));
                }
                _ if !raw
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
                {
                    return Err(format!("label '{raw}' has invalid chars"));
                }
                _ => Label::Fixed(raw.to_string()),
            };
            labels.push(label);
        }

        if labels.iter().all(|label| *label == Label::Any) {
            return Err("pattern has no fixed label".to_string());
        }

        Ok(Self {
            source: normalized,
            labels,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn specificity(&self) -> Specificity {
        let fixed_labels = self
            .labels
            .iter()
            .filter(|label| matches!(label, Label::Fixed(_)))
            .count();
        Specificity {
            exact: fixed_labels == self.labels.len(),
            fixed_labels,
        }
    }

    pub fn matches(&self, hostname: &str) -> bool {
        let host = hostname.trim_end_matches('.');
        if host.is_empty() || host.split('.').count() != self.labels.len() {
            return false;
        }
        self.labels
            .iter()
            .zip(host.split('.'))
            .all(|(label, part)| match label {
                Label::Any => !part.is_empty(),
                Label::Fixed(fixed) => fixed.eq_ignore_ascii_case(part),
            })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
