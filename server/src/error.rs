//! Error types for the NPC core and the in-memory world.

use mud_shared::RoomId;
use thiserror::Error;

/// Result type alias for NPC operations.
pub type Result<T, E = NpcError> = std::result::Result<T, E>;

/// Failures reported by a world implementation.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Lookup for a room id that the map does not contain.
    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),

    /// An exit points at a room the map does not contain.
    #[error("exit from room {from} leads to unknown room {to}")]
    UnknownExitTarget { from: RoomId, to: RoomId },

    /// A room was registered under the "no room" sentinel.
    #[error("room id {0} is reserved")]
    ReservedRoomId(RoomId),

    /// Room was registered twice.
    #[error("room {0} is defined more than once")]
    DuplicateRoom(RoomId),

    /// Broadcast delivery failed.
    #[error("broadcast to room {0} failed")]
    Broadcast(RoomId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by NPC construction and behavior cycles.
#[derive(Debug, Error)]
pub enum NpcError {
    /// Action period below zero.
    #[error("action period must not be negative (got {0}s)")]
    InvalidPeriod(i64),

    /// Blank display name.
    #[error("NPC name must not be empty")]
    InvalidName,

    /// The NPC's room could not be resolved during a cycle.
    #[error("room {0} could not be resolved")]
    RoomNotFound(RoomId),

    /// A world call failed.
    #[error(transparent)]
    World(#[from] WorldError),
}
