//! Ferrous Lookup Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_record;
pub mod errors;

pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, LookupConfig};
pub use dns_protocol::{LookupMethod, UpstreamAddr, DEFAULT_DNS_PORT};
pub use dns_query::DnsQuery;
pub use dns_record::RecordType;
pub use errors::DomainError;
