//! Network Layer
//!
//! HTTP surface for the web client.

pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::{router, AppState};
pub use protocol::RequestError;
pub use server::{BridgeServer, BridgeServerError, ConfigError, ServerConfig};
