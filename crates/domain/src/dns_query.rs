use super::RecordType;
use std::sync::Arc;

/// A single lookup request. Built fresh for every resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    /// Fully-qualified name, always ending in exactly one dot (empty if the
    /// caller supplied an empty name).
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub recursion_desired: bool,
}

impl DnsQuery {
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        Self {
            domain: fqdn(domain).into(),
            record_type,
            recursion_desired: true,
        }
    }
}

/// Normalizes `domain` to fully-qualified form: `example.com`, `example.com.`
/// and `example.com..` all become `example.com.`.
pub fn fqdn(domain: &str) -> String {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut name = trimmed.trim_end_matches('.').to_string();
    name.push('.');
    name
}
