//! Engine Layer
//!
//! Running move engines and turning their answers into moves.

pub mod invoker;
pub mod resolver;

pub use invoker::{DecisionEngine, EngineConfig, EngineError, ProcessEngine};
pub use resolver::{MoveResolver, ResolveError};
