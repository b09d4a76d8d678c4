//! Protocol-level types shared between the server and room observers.

use serde::{Deserialize, Serialize};

/// Integer room identifier, as used by map files and exits.
pub type RoomId = i32;

/// Sentinel for "no prior room". Never a valid room id.
pub const NO_ROOM: RoomId = 0;

/// Driver tick rate in Hz
pub const SERVER_TICK_RATE: u32 = 4;

/// Default action period for NPCs without an explicit one
pub const DEFAULT_NPC_PERIOD_SECS: i64 = 30;

/// A line of narration delivered to everyone observing a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMessage {
    pub room_id: RoomId,
    pub text: String,
}

impl RoomMessage {
    pub fn new(room_id: RoomId, text: impl Into<String>) -> Self {
        Self {
            room_id,
            text: text.into(),
        }
    }
}
