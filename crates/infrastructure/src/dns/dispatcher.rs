use super::forwarding::DnsResponse;
use super::transport::create_transport;
use ferrous_lookup_domain::{DnsQuery, DomainError, LookupConfig, LookupMethod, RecordType};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Picks a transport by method name and runs one lookup against the endpoint
/// configured for it. Holds only the injected, immutable configuration.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: LookupConfig,
}

impl Dispatcher {
    pub fn new(config: LookupConfig) -> Self {
        Self { config }
    }

    /// Resolve `domain` with the configured record type via the transport
    /// named by `method_name` (`tcp`, `doh`).
    pub async fn dispatch(
        &self,
        domain: &str,
        method_name: &str,
    ) -> Result<DnsResponse, DomainError> {
        let method: LookupMethod = method_name.parse()?;
        let record_type: RecordType = self
            .config
            .record_type
            .parse()
            .map_err(DomainError::Configuration)?;

        self.dispatch_with(domain, method, record_type, &CancellationToken::new())
            .await
    }

    pub async fn dispatch_with(
        &self,
        domain: &str,
        method: LookupMethod,
        record_type: RecordType,
        cancel: &CancellationToken,
    ) -> Result<DnsResponse, DomainError> {
        let transport = create_transport(method, &self.config)?;
        let query = DnsQuery::new(domain, record_type);

        debug!(
            domain = %query.domain,
            method = %method,
            endpoint = self.endpoint(method),
            "Dispatching lookup"
        );

        let response = transport
            .resolve(&query, self.config.request_timeout(), cancel)
            .await?;

        info!(
            domain = %query.domain,
            record_type = %record_type,
            protocol = transport.protocol_name(),
            answers = response.answers().len(),
            "Lookup complete"
        );

        Ok(response)
    }

    pub fn endpoint(&self, method: LookupMethod) -> &str {
        match method {
            LookupMethod::Tcp => &self.config.tcp_server,
            LookupMethod::Doh => &self.config.doh_url,
        }
    }
}
