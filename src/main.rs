//! intercept-proxy binary.
//!
//! A pass-through interception proxy for local development.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!                   │               INTERCEPT PROXY                 │
//!                   │                                               │
//!   Client Request  │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ────────────────┼─▶│  http  │──▶│ routing │──▶│   driver    │  │
//!                   │  │ server │   │  table  │   │  handshake  │  │
//!                   │  └────────┘   └─────────┘   └──────┬──────┘  │
//!                   │                                    │          │
//!                   │              request observer ◀────┤          │
//!                   │              (respond / pass through)         │
//!                   │                                    │          │
//!   Client Response │  ┌──────────┐   ┌──────────┐   ┌───▼──────┐  │
//!   ◀───────────────┼──│ status + │◀──│ response │◀──│ upstream │◀─┼── Real
//!                   │  │ body     │   │ observer │   │  client  │  │   Service
//!                   │  └──────────┘   └──────────┘   └──────────┘  │
//!                   │                                               │
//!                   │  config · observability · lifecycle           │
//!                   └──────────────────────────────────────────────┘
//! ```
//!
//! Embedded use (test suites) builds the same pieces through the
//! library and installs its own observers; this binary wires them with
//! a pass-through request observer and a logging response observer.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use intercept_proxy::config::{load_config, ProxyConfig};
use intercept_proxy::driver::{DriverRegistry, InterceptDriver};
use intercept_proxy::http::HttpServer;
use intercept_proxy::lifecycle::{signals, Shutdown};
use intercept_proxy::observability::{logging, metrics};
use intercept_proxy::routing::RouteTable;

#[derive(Parser)]
#[command(
    name = "intercept-proxy",
    version,
    about = "HTTP interception proxy for test harnesses and dev-time mocking"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        "intercept-proxy starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let registry = DriverRegistry::new();
    let routes = RouteTable::from_config(&config.routes)?;
    let server = HttpServer::new(config.clone());
    let driver = InterceptDriver::attach(&server, routes, &registry)?;

    // Standalone mode: defer every request to the real upstream and log
    // every exchange.
    driver.on_request_fn(|intercepted| async move {
        intercepted.pass_through("passthrough").await;
        Ok(())
    });
    driver.on_response_fn(|exchange| async move {
        tracing::info!(
            url = %exchange.request.original_url,
            status = %exchange.response.response().status,
            provenance = exchange.response.provenance(),
            interceptor = %exchange.interceptor,
            "Exchange observed"
        );
        Ok(())
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    tokio::spawn(signals::wait_for_ctrl_c(shutdown.clone()));

    server.run(driver.router(), listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
