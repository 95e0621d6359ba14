//! Engine Invocation
//!
//! A move engine is anything that turns a 31-byte encoded state into a
//! 4-byte move, or fails with a diagnostic. [`ProcessEngine`] realizes that
//! contract by running an external program once per request:
//!
//! - request bytes on stdin, then stdin is closed
//! - exit status 0 and exactly 4 bytes on stdout is a move
//! - any other exit status is a failure, with stderr as the diagnostic
//!
//! No timeout is applied. A stalled engine holds its request open for as long
//! as it runs.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, instrument};

use crate::core::codec::{MoveBytes, StateBytes};

/// Program run when no engine is configured.
pub const DEFAULT_ENGINE: &str = "./brute";

/// Engine invocation errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine program could not be started.
    #[error("failed to start engine {program}: {source}")]
    Spawn {
        /// Program that was run.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// I/O error talking to a running engine.
    #[error("engine I/O error: {0}")]
    Io(#[from] io::Error),

    /// The engine exited unsuccessfully.
    #[error("engine failed ({status}): {diagnostic}")]
    Failed {
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// Whatever the engine wrote to stderr.
        diagnostic: String,
    },

    /// The engine exited successfully but its output is not a 4-byte move.
    #[error("engine protocol violation: expected 4 output bytes, got {len}")]
    ProtocolViolation {
        /// Number of bytes actually written.
        len: usize,
    },
}

/// A source of moves.
///
/// Implementations may run a subprocess, call into a library, or talk to a
/// remote service. Only the byte contract matters.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    /// Pick a move for the encoded state.
    async fn decide(&self, request: &StateBytes) -> Result<MoveBytes, EngineError>;
}

/// How to launch the engine program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub program: PathBuf,
    /// Extra command-line arguments.
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_ENGINE),
            args: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Run `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Runs a fresh engine process for every decision.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config: EngineConfig,
}

impl ProcessEngine {
    /// Create an engine from its launch configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DecisionEngine for ProcessEngine {
    #[instrument(skip_all, fields(program = %self.config.program.display()))]
    async fn decide(&self, request: &StateBytes) -> Result<MoveBytes, EngineError> {
        debug!("Engine request: {}", hex::encode(request));

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.config.program.display().to_string(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(request).await {
                Ok(()) => {}
                // Engine exited without reading; its exit status decides.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("Engine closed stdin before reading the request");
                }
                Err(e) => return Err(EngineError::Io(e)),
            }
        }

        let output = child.wait_with_output().await?;
        let diagnostic = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

        if !output.status.success() {
            error!("Engine failed ({}): {}", output.status, diagnostic);
            return Err(EngineError::Failed {
                status: output.status,
                diagnostic,
            });
        }

        if !diagnostic.is_empty() {
            debug!("Engine stderr:\n{}", diagnostic);
        }

        let reply: MoveBytes = output
            .stdout
            .as_slice()
            .try_into()
            .map_err(|_| EngineError::ProtocolViolation { len: output.stdout.len() })?;

        debug!("Engine reply: {}", hex::encode(reply));
        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::codec::STATE_LEN;

    /// Engine backed by a `/bin/sh` script.
    pub(crate) fn sh_engine(script: &str) -> ProcessEngine {
        ProcessEngine::new(EngineConfig::new("/bin/sh").with_args(["-c", script]))
    }

    fn request() -> StateBytes {
        let mut bytes = [0u8; STATE_LEN];
        bytes[0] = 1;
        bytes
    }

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.program, PathBuf::from("./brute"));
        assert!(config.args.is_empty());
    }

    #[tokio::test]
    async fn test_engine_success() {
        let engine = sh_engine(r"cat >/dev/null; printf '\001\003\007\002'");
        let reply = engine.decide(&request()).await.unwrap();
        assert_eq!(reply, [1, 3, 7, 2]);
    }

    #[tokio::test]
    async fn test_engine_receives_full_request() {
        let engine = sh_engine(r"[ $(wc -c) -eq 31 ] || exit 3; printf '\000\011\012\013'");
        assert_eq!(engine.decide(&request()).await.unwrap(), [0, 9, 10, 11]);
    }

    #[tokio::test]
    async fn test_engine_ignores_unread_stdin() {
        let engine = sh_engine(r"printf '\000\004\005\006'");
        assert_eq!(engine.decide(&request()).await.unwrap(), [0, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_engine_nonzero_exit() {
        let engine = sh_engine("cat >/dev/null; echo 'no legal move' >&2; exit 1");
        match engine.decide(&request()).await {
            Err(EngineError::Failed { status, diagnostic }) => {
                assert_eq!(status.code(), Some(1));
                assert_eq!(diagnostic, "no legal move");
            }
            other => panic!("expected engine failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_engine_short_output() {
        let engine = sh_engine(r"cat >/dev/null; printf '\000\003\007'");
        match engine.decide(&request()).await {
            Err(EngineError::ProtocolViolation { len }) => assert_eq!(len, 3),
            other => panic!("expected protocol violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_engine_long_output() {
        let engine = sh_engine(r"cat >/dev/null; printf '\000\003\007\002\001'");
        assert!(matches!(
            engine.decide(&request()).await,
            Err(EngineError::ProtocolViolation { len: 5 })
        ));
    }

    #[tokio::test]
    async fn test_engine_missing_program() {
        let engine = ProcessEngine::new(EngineConfig::new("/nonexistent/engine"));
        assert!(matches!(
            engine.decide(&request()).await,
            Err(EngineError::Spawn { .. })
        ));
    }
}
