//! Core game types and the engine wire format.
//!
//! Everything here is pure: no I/O, no shared state.

pub mod codec;
pub mod state;

pub use codec::{decode_move, encode_state, DecodingError, EncodingError, MOVE_LEN, STATE_LEN};
pub use state::{GameState, Move, BOARD_CELLS, PROG_SLOTS};
