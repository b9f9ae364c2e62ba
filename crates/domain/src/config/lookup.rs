use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Resolver used by the `tcp` method. Port 53 unless given as `host:port`.
    #[serde(default = "default_tcp_server")]
    pub tcp_server: String,

    /// Endpoint used by the `doh` method.
    #[serde(default = "default_doh_url")]
    pub doh_url: String,

    #[serde(default = "default_method")]
    pub default_method: String,

    #[serde(default = "default_record_type")]
    pub record_type: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound on a DoH response body.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl LookupConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            tcp_server: default_tcp_server(),
            doh_url: default_doh_url(),
            default_method: default_method(),
            record_type: default_record_type(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

fn default_tcp_server() -> String {
    "8.8.8.8".to_string()
}

fn default_doh_url() -> String {
    "https://cloudflare-dns.com/dns-query".to_string()
}

fn default_method() -> String {
    "tcp".to_string()
}

fn default_record_type() -> String {
    "A".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_response_bytes() -> usize {
    65_535
}
