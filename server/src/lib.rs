//! Roaming NPC core for a room-based MUD.
//!
//! NPCs act on their own once their action period has elapsed: by default
//! they wander the room graph at random, never stepping straight back into
//! the room they just left. The process that decides *when* to tick lives in
//! the binary; everything here is synchronous and safe to tick from any number
//! of threads.

pub mod clock;
pub mod config;
pub mod entities;
pub mod error;
pub mod world;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::{Behavior, Cycle, Npc, NpcState, RandomWalk, Roamer, Spirit};
pub use error::{NpcError, Result, WorldError};
pub use world::{GameMap, GameWorld, Room, TickSummary, WorldContext};
