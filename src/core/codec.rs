//! Engine Wire Codec
//!
//! Fixed-layout binary format exchanged with move engines.
//!
//! Request (31 bytes):
//!
//! ```text
//! [current_player: u8][board: 25 x u8, row-major][progs: 5 x u8]
//! ```
//!
//! Response (4 bytes):
//!
//! ```text
//! [version: u8][from: u8][to: u8][piece_id: u8]
//! ```
//!
//! All fields are single unsigned bytes, so there is no byte-order concern
//! beyond the field order above.

use thiserror::Error;

use super::state::{GameState, Move, BOARD_CELLS, PROG_SLOTS};

/// Encoded request size in bytes.
pub const STATE_LEN: usize = 1 + BOARD_CELLS + PROG_SLOTS;

/// Encoded response size in bytes.
pub const MOVE_LEN: usize = 4;

/// Encoded game state, ready to be written to an engine.
pub type StateBytes = [u8; STATE_LEN];

/// Raw engine response.
pub type MoveBytes = [u8; MOVE_LEN];

/// Offset of the board within [`StateBytes`].
const BOARD_OFFSET: usize = 1;

/// Offset of the program slots within [`StateBytes`].
const PROGS_OFFSET: usize = BOARD_OFFSET + BOARD_CELLS;

/// Errors encoding a game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Board does not have exactly 25 cells.
    #[error("board must have 25 cells, got {0}")]
    BoardLength(usize),

    /// Program slots are not exactly 5.
    #[error("progs must have 5 entries, got {0}")]
    ProgsLength(usize),

    /// A value does not fit in an unsigned byte.
    #[error("{field} value {value} is out of byte range")]
    OutOfRange {
        /// Field and index, e.g. `board[12]`.
        field: String,
        /// The offending value.
        value: i64,
    },
}

/// Errors decoding an engine response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    /// Response is not exactly 4 bytes.
    #[error("engine response must be 4 bytes, got {0}")]
    Length(usize),
}

fn to_byte(field: impl FnOnce() -> String, value: i64) -> Result<u8, EncodingError> {
    u8::try_from(value).map_err(|_| EncodingError::OutOfRange { field: field(), value })
}

/// Encode a game state into the 31-byte engine request.
pub fn encode_state(state: &GameState) -> Result<StateBytes, EncodingError> {
    if state.board.len() != BOARD_CELLS {
        return Err(EncodingError::BoardLength(state.board.len()));
    }
    if state.progs.len() != PROG_SLOTS {
        return Err(EncodingError::ProgsLength(state.progs.len()));
    }

    let mut out = [0u8; STATE_LEN];
    out[0] = to_byte(|| "currentPlayer".to_string(), state.current_player)?;

    for (i, &cell) in state.board.iter().enumerate() {
        out[BOARD_OFFSET + i] = to_byte(|| format!("board[{}]", i), cell)?;
    }
    for (i, &prog) in state.progs.iter().enumerate() {
        out[PROGS_OFFSET + i] = to_byte(|| format!("progs[{}]", i), prog)?;
    }

    Ok(out)
}

/// Decode a 4-byte engine response into a move.
///
/// The leading version byte is ignored.
pub fn decode_move(bytes: &[u8]) -> Result<Move, DecodingError> {
    match *bytes {
        [_version, from, to, piece_id] => Ok(Move::new(from, to, piece_id)),
        _ => Err(DecodingError::Length(bytes.len())),
    }
}
