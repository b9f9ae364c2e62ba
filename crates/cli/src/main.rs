use clap::Parser;
use ferrous_lookup_domain::{CliOverrides, LookupMethod, RecordType};
use ferrous_lookup_infrastructure::dns::Dispatcher;
use tracing::{error, info};

mod bootstrap;
mod output;

#[derive(Parser)]
#[command(name = "ferrous-lookup")]
#[command(version = "0.1.0")]
#[command(about = "Ferrous Lookup - DNS queries over TCP or DNS-over-HTTPS")]
struct Cli {
    /// Domain name to resolve
    domain: String,

    /// Lookup method (tcp, doh). Defaults to the configured method
    method: Option<String>,

    /// Record type to query (A, AAAA, MX, ...)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    record_type: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// TCP DNS server (host or host:port)
    #[arg(short = 's', long)]
    server: Option<String>,

    /// DNS-over-HTTPS endpoint URL
    #[arg(long)]
    doh_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        tcp_server: cli.server.clone(),
        doh_url: cli.doh_url.clone(),
        record_type: cli.record_type.clone(),
        request_timeout_ms: cli.timeout,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    let method: LookupMethod = cli
        .method
        .as_deref()
        .unwrap_or(config.lookup.default_method.as_str())
        .parse()?;
    let record_type: RecordType = config
        .lookup
        .record_type
        .parse()
        .map_err(anyhow::Error::msg)?;

    let dispatcher = Dispatcher::new(config.lookup);
    info!(
        domain = %cli.domain,
        method = %method,
        endpoint = dispatcher.endpoint(method),
        "Starting lookup"
    );

    let cancel = bootstrap::cancel_on_ctrl_c();
    let response = dispatcher
        .dispatch_with(&cli.domain, method, record_type, &cancel)
        .await
        .inspect_err(|e| error!(error = %e, kind = e.kind(), "Lookup failed"))?;

    print!("{}", output::render(&cli.domain, &response));
    Ok(())
}
