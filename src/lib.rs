//! # Hacker Chess Move Bridge
//!
//! HTTP bridge between the hacker chess web client and native move engines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  HACKER CHESS BRIDGE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Pure types and wire format               │
//! │  ├── state.rs     - GameState (JSON) and Move                │
//! │  └── codec.rs     - 31-byte request / 4-byte response        │
//! │                                                              │
//! │  engine/          - Move engines                             │
//! │  ├── invoker.rs   - DecisionEngine, subprocess engine        │
//! │  └── resolver.rs  - State -> move, engine failure -> null    │
//! │                                                              │
//! │  network/         - HTTP                                     │
//! │  ├── protocol.rs  - CORS headers, JSON framing, status codes │
//! │  ├── handler.rs   - OPTIONS / POST handling                  │
//! │  └── server.rs    - Accept loop, one task per connection     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! POST {"currentPlayer":1,"board":[..25],"progs":[..5]}
//!   -> encode_state -> engine stdin (31 bytes)
//!   -> engine stdout (4 bytes) -> decode_move
//!   -> [from,to,pieceId] | null
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod network;

// Re-export commonly used types
pub use crate::core::codec::{decode_move, encode_state, DecodingError, EncodingError};
pub use crate::core::state::{GameState, Move};
pub use crate::engine::invoker::{DecisionEngine, EngineConfig, EngineError, ProcessEngine};
pub use crate::engine::resolver::{MoveResolver, ResolveError};
pub use crate::network::server::{BridgeServer, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
