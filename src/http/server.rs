//! HTTP server setup.
//!
//! # Responsibilities
//! - Carry the identity of one server instance (what drivers attach to)
//! - Wire up middleware (tracing, body limits)
//! - Serve a driver's router with graceful shutdown
//!
//! # Design Decisions
//! - The server owns no routes of its own; a driver supplies the router
//! - `run` borrows the server, so a harness can keep using the instance
//!   identity while the serving task runs

use axum::Router;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::ProxyConfig;
use crate::driver::registry::InstanceId;
use crate::lifecycle::shutdown::Shutdown;

/// One proxy server instance.
pub struct HttpServer {
    instance: InstanceId,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new server instance with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            instance: InstanceId::new(),
            config,
        }
    }

    /// Identity of this instance, stable for its whole lifetime.
    pub fn instance_id(&self) -> InstanceId {
        self.instance
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve the given router until the shutdown coordinator triggers.
    pub async fn run(
        &self,
        app: Router,
        listener: TcpListener,
        shutdown: &Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            instance = %self.instance,
            "HTTP server starting"
        );

        let app = app
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_body_bytes))
            .layer(TraceLayer::new_for_http());

        let mut rx = shutdown.subscribe();
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
