//! Game State and Move Types
//!
//! JSON-facing snapshot sent by the web client, and the move triple
//! returned to it.

use serde::{Serialize, Deserialize};

/// Number of cells on the 5x5 board.
pub const BOARD_CELLS: usize = 25;

/// Number of program slots.
pub const PROG_SLOTS: usize = 5;

/// Snapshot of a game as sent by the web client.
///
/// Values are kept as wide integers so that range and length problems are
/// reported by the codec with the offending field, rather than as a generic
/// JSON parse failure. Unknown JSON fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Whose turn it is.
    pub current_player: i64,
    /// Row-major 5x5 grid of piece/terrain codes.
    pub board: Vec<i64>,
    /// Per-slot program identifiers.
    pub progs: Vec<i64>,
}

impl GameState {
    /// Create a state with an empty board and empty program slots.
    pub fn empty(current_player: u8) -> Self {
        Self {
            current_player: current_player as i64,
            board: vec![0; BOARD_CELLS],
            progs: vec![0; PROG_SLOTS],
        }
    }

    /// Parse a state from a JSON body.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A move chosen by the engine.
///
/// Opaque pass-through: nothing checks that the move is legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    /// Source cell index.
    pub from: u8,
    /// Destination cell index.
    pub to: u8,
    /// Program performing the move.
    pub piece_id: u8,
}

impl Move {
    /// Create a new move.
    pub const fn new(from: u8, to: u8, piece_id: u8) -> Self {
        Self { from, to, piece_id }
    }

    /// As the `[from, to, pieceId]` array the client expects.
    pub const fn to_array(self) -> [u8; 3] {
        [self.from, self.to, self.piece_id]
    }
}

impl From<[u8; 3]> for Move {
    fn from([from, to, piece_id]: [u8; 3]) -> Self {
        Self { from, to, piece_id }
    }
}

// The client protocol carries moves as bare arrays, not objects.
impl Serialize for Move {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[u8; 3]>::deserialize(deserializer).map(Move::from)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}({})", self.from, self.to, self.piece_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_state() {
        let body = br#"{"currentPlayer":1,"board":[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,9],"progs":[1,2,3,4,5]}"#;
        let state = GameState::from_json(body).unwrap();

        assert_eq!(state.current_player, 1);
        assert_eq!(state.board.len(), BOARD_CELLS);
        assert_eq!(state.progs, vec![1, 2, 3, 4, 5]);
        assert_eq!(state.board[24], 9);
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let body = br#"{"currentPlayer":0,"board":[],"progs":[],"uid":7}"#;
        let state = GameState::from_json(body).unwrap();
        assert!(state.board.is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(GameState::from_json(br#"{"currentPlayer":0,"board":[]}"#).is_err());
        assert!(GameState::from_json(b"not json").is_err());
    }

    #[test]
    fn test_move_serializes_as_array() {
        let mv = Move::new(3, 7, 2);
        assert_eq!(serde_json::to_string(&mv).unwrap(), "[3,7,2]");
        assert_eq!(serde_json::to_string(&Some(mv)).unwrap(), "[3,7,2]");
        assert_eq!(serde_json::to_string(&None::<Move>).unwrap(), "null");

        let parsed: Move = serde_json::from_str("[255,0,4]").unwrap();
        assert_eq!(parsed, Move::new(255, 0, 4));
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(3, 17, 2).to_string(), "03-17(2)");
    }
}
