//! Move Resolution
//!
//! Turns a client game state into a move by way of the engine.
//!
//! An engine that exits unsuccessfully is not an error here: the resolver
//! answers "no move" and the client receives `null`. The web client relies on
//! this, so engine failures must never surface as HTTP errors. Bad input and
//! malformed engine output are still reported.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::core::codec::{decode_move, encode_state, DecodingError, EncodingError};
use crate::core::state::{GameState, Move};
use crate::engine::invoker::{DecisionEngine, EngineError};

/// Resolution errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The client's state cannot be encoded.
    #[error("invalid game state: {0}")]
    InvalidState(#[from] EncodingError),

    /// The engine reported success but its reply is malformed.
    #[error("engine protocol violation: {0}")]
    ProtocolViolation(#[from] DecodingError),

    /// The engine could not be run at all.
    #[error(transparent)]
    Engine(EngineError),
}

/// Resolves game states to moves through a [`DecisionEngine`].
#[derive(Clone)]
pub struct MoveResolver {
    engine: Arc<dyn DecisionEngine>,
}

impl std::fmt::Debug for MoveResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveResolver").finish_non_exhaustive()
    }
}

impl MoveResolver {
    /// Create a resolver over an engine.
    pub fn new(engine: impl DecisionEngine + 'static) -> Self {
        Self { engine: Arc::new(engine) }
    }

    /// Create a resolver over a shared engine.
    pub fn from_shared(engine: Arc<dyn DecisionEngine>) -> Self {
        Self { engine }
    }

    /// Pick a move for `state`.
    ///
    /// Returns `Ok(None)` when the engine fails.
    #[instrument(skip_all, fields(player = state.current_player))]
    pub async fn resolve(&self, state: &GameState) -> Result<Option<Move>, ResolveError> {
        let request = encode_state(state)?;

        let reply = match self.engine.decide(&request).await {
            Ok(reply) => reply,
            Err(EngineError::Failed { status, .. }) => {
                info!("Engine gave no move ({}), answering null", status);
                return Ok(None);
            }
            Err(EngineError::ProtocolViolation { len }) => {
                warn!("Engine exited cleanly with {} output bytes", len);
                return Err(DecodingError::Length(len).into());
            }
            Err(e) => return Err(ResolveError::Engine(e)),
        };

        Ok(Some(decode_move(&reply)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::{MoveBytes, StateBytes};
    use crate::engine::invoker::tests::sh_engine;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Engine that returns a fixed reply and records what it was asked.
    struct FixedEngine {
        reply: MoveBytes,
        seen: Mutex<Vec<StateBytes>>,
    }

    impl FixedEngine {
        fn new(reply: MoveBytes) -> Self {
            Self { reply, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl DecisionEngine for FixedEngine {
        async fn decide(&self, request: &StateBytes) -> Result<MoveBytes, EngineError> {
            self.seen.lock().unwrap().push(*request);
            Ok(self.reply)
        }
    }

    #[tokio::test]
    async fn test_resolve_move() {
        let engine = Arc::new(FixedEngine::new([1, 3, 7, 2]));
        let resolver = MoveResolver::from_shared(engine.clone());

        let mut state = GameState::empty(1);
        state.board[24] = 9;
        state.progs[0] = 4;
        let mv = resolver.resolve(&state).await.unwrap();
        assert_eq!(mv, Some(Move::new(3, 7, 2)));

        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0], 1);
        assert_eq!(seen[0][25], 9);
        assert_eq!(seen[0][26], 4);
    }

    #[tokio::test]
    async fn test_invalid_state_skips_engine() {
        let engine = Arc::new(FixedEngine::new([0, 0, 0, 0]));
        let resolver = MoveResolver::from_shared(engine.clone());

        let mut state = GameState::empty(0);
        state.board.truncate(24);
        let err = resolver.resolve(&state).await.unwrap_err();

        assert!(matches!(err, ResolveError::InvalidState(EncodingError::BoardLength(24))));
        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_is_no_move() {
        let resolver = MoveResolver::new(sh_engine("cat >/dev/null; echo 'no legal move' >&2; exit 1"));
        let mv = resolver.resolve(&GameState::empty(1)).await.unwrap();
        assert_eq!(mv, None);
    }

    #[tokio::test]
    async fn test_protocol_violation_is_reported() {
        let resolver = MoveResolver::new(sh_engine(r"cat >/dev/null; printf '\000\003'"));
        let err = resolver.resolve(&GameState::empty(1)).await.unwrap_err();
        assert!(matches!(err, ResolveError::ProtocolViolation(DecodingError::Length(2))));
        assert_eq!(err.to_string(), "engine protocol violation: engine response must be 4 bytes, got 2");
    }

    #[tokio::test]
    async fn test_missing_engine_is_reported() {
        let resolver = MoveResolver::new(crate::engine::invoker::ProcessEngine::new(
            crate::engine::invoker::EngineConfig::new("/nonexistent/engine"),
        ));
        let err = resolver.resolve(&GameState::empty(1)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Engine(EngineError::Spawn { .. })));
    }
}
