//! HTTP Bridge Server
//!
//! Accepts TCP connections and serves HTTP/1.1 on each from its own task.
//! Connections share nothing but the resolver and the request counter, so a
//! request stuck on a slow engine never holds up the others.
//!
//! There is no graceful shutdown: the process is expected to be killed.

use std::net::SocketAddr;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;
use tracing::{debug, error, info, info_span, instrument, Instrument};

use crate::engine::invoker::{EngineConfig, ProcessEngine};
use crate::engine::resolver::MoveResolver;
use crate::network::handler::{router, AppState};

/// Port the web client talks to.
pub const DEFAULT_PORT: u16 = 8001;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Engine launch configuration.
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            engine: EngineConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("invalid {name}: {value:?}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Value found.
        value: String,
    },
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// - `BRIDGE_BIND_ADDR`: socket address to listen on
    /// - `BRIDGE_ENGINE`: engine program path
    /// - `BRIDGE_ENGINE_ARGS`: whitespace-separated engine arguments
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("BRIDGE_BIND_ADDR") {
            config.bind_addr = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVar { name: "BRIDGE_BIND_ADDR", value })?;
        }

        if let Some(value) = lookup("BRIDGE_ENGINE") {
            let program = value.trim();
            if program.is_empty() {
                return Err(ConfigError::InvalidVar { name: "BRIDGE_ENGINE", value });
            }
            config.engine.program = program.into();
        }

        if let Some(value) = lookup("BRIDGE_ENGINE_ARGS") {
            config.engine.args = value.split_whitespace().map(String::from).collect();
        }

        Ok(config)
    }
}

/// Server errors.
#[derive(Debug, Error)]
pub enum BridgeServerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        /// Address requested.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Socket error after binding.
    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// The bridge server.
pub struct BridgeServer {
    config: ServerConfig,
    state: AppState,
}

impl BridgeServer {
    /// Create a server that runs the configured engine program.
    pub fn new(config: ServerConfig) -> Self {
        let resolver = MoveResolver::new(ProcessEngine::new(config.engine.clone()));
        Self::with_resolver(config, resolver)
    }

    /// Create a server around an existing resolver.
    pub fn with_resolver(config: ServerConfig, resolver: MoveResolver) -> Self {
        Self {
            config,
            state: AppState::new(resolver),
        }
    }

    /// Bind the configured address and serve forever.
    pub async fn run(&self) -> Result<(), BridgeServerError> {
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BridgeServerError::BindFailed { addr, source })?;
        self.serve(listener).await
    }

    /// Serve connections from an already-bound listener.
    #[instrument(skip_all)]
    pub async fn serve(&self, listener: TcpListener) -> Result<(), BridgeServerError> {
        info!("Bridge server listening on {}", listener.local_addr()?);
        info!("Engine: {}", self.config.engine.program.display());

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    self.handle_connection(stream, addr);
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }

    /// Serve one connection on its own task.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let app = router(self.state.clone());

        tokio::spawn(
            async move {
                let service = service_fn(move |request: Request<Incoming>| app.clone().oneshot(request));

                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!("Connection error: {}", e);
                }
                debug!("Connection closed");
            }
            .instrument(info_span!("conn", peer = %addr)),
        );
    }
}
