//! Server-side NPC entity and its AI trigger.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mud_shared::{NpcSnapshot, RoomId, NO_ROOM};

use crate::clock::Clock;
use crate::error::{NpcError, Result};
use crate::world::{Room, WorldContext};

use super::behavior::{Behavior, RandomWalk};

/// Location and timing data guarded by the NPC's lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpcState {
    pub current_room_id: RoomId,
    /// Room held before the last location change, `NO_ROOM` until the first move
    pub past_room_id: RoomId,
    /// Seconds timestamp of the last completed behavior cycle
    pub last_action_time: u64,
}

/// An NPC that acts on its own once its action period has elapsed.
///
/// Every `tick` holds the NPC's lock for the whole cycle, so ticks on one NPC
/// are serialized while different NPCs never contend.
pub struct Npc {
    name: String,
    action_period_secs: u64,
    world: Arc<dyn WorldContext>,
    clock: Arc<dyn Clock>,
    behavior: Box<dyn Behavior>,
    state: Mutex<NpcState>,
}

impl fmt::Debug for Npc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Npc")
            .field("name", &self.name)
            .field("action_period_secs", &self.action_period_secs)
            .field("state", &*self.lock_state())
            .finish()
    }
}

impl Npc {
    /// Create an NPC that roams with the default random walk
    pub fn new(
        world: Arc<dyn WorldContext>,
        clock: Arc<dyn Clock>,
        name: impl Into<String>,
        room_id: RoomId,
        action_period_secs: i64,
    ) -> Result<Self> {
        Self::with_behavior(world, clock, name, room_id, action_period_secs, Box::new(RandomWalk))
    }

    /// Create an NPC driven by a custom behavior
    pub fn with_behavior(
        world: Arc<dyn WorldContext>,
        clock: Arc<dyn Clock>,
        name: impl Into<String>,
        room_id: RoomId,
        action_period_secs: i64,
        behavior: Box<dyn Behavior>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(NpcError::InvalidName);
        }
        let action_period_secs = u64::try_from(action_period_secs)
            .map_err(|_| NpcError::InvalidPeriod(action_period_secs))?;

        let last_action_time = clock.now_secs();
        Ok(Self {
            name,
            action_period_secs,
            world,
            clock,
            behavior,
            state: Mutex::new(NpcState {
                current_room_id: room_id,
                past_room_id: NO_ROOM,
                last_action_time,
            }),
        })
    }

    /// Run one behavior cycle if the action period has elapsed.
    ///
    /// Returns `Ok(false)` without touching any state while the NPC is still
    /// dwelling. A failing behavior leaves the state exactly as it was, so the
    /// next eligible tick retries the cycle.
    pub fn tick(&self) -> Result<bool> {
        let mut state = self.lock_state();

        let elapsed = self.clock.now_secs().saturating_sub(state.last_action_time);
        if elapsed <= self.action_period_secs {
            return Ok(false);
        }

        let mut cycle = Cycle {
            name: &self.name,
            world: self.world.as_ref(),
            state: *state,
        };
        self.behavior.perform(&mut cycle)?;

        *state = NpcState {
            last_action_time: self.clock.now_secs(),
            ..cycle.state
        };
        Ok(true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_room_id(&self) -> RoomId {
        self.lock_state().current_room_id
    }

    /// The last room this NPC was in, `NO_ROOM` if it has never moved
    pub fn past_room_id(&self) -> RoomId {
        self.lock_state().past_room_id
    }

    /// Resolve the current room through the world
    pub fn current_room(&self) -> Option<&dyn Room> {
        self.world.find_room(self.current_room_id())
    }

    pub fn last_action_time(&self) -> u64 {
        self.lock_state().last_action_time
    }

    pub fn action_period_secs(&self) -> u64 {
        self.action_period_secs
    }

    /// Consistent copy of the guarded state
    pub fn state(&self) -> NpcState {
        *self.lock_state()
    }

    pub fn snapshot(&self) -> NpcSnapshot {
        let state = self.state();
        NpcSnapshot {
            name: self.name.clone(),
            current_room_id: state.current_room_id,
            past_room_id: state.past_room_id,
            last_action_time: state.last_action_time,
            action_period_secs: self.action_period_secs,
            spirit_kind: None,
        }
    }

    // State is only ever replaced whole, so a poisoned lock still holds a valid triple.
    fn lock_state(&self) -> MutexGuard<'_, NpcState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Npc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One behavior cycle in progress.
///
/// Behaviors read and move the NPC through this handle while the NPC's lock is
/// held. Changes are committed only if the behavior returns `Ok`.
pub struct Cycle<'a> {
    name: &'a str,
    world: &'a dyn WorldContext,
    state: NpcState,
}

impl<'a> Cycle<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn current_room_id(&self) -> RoomId {
        self.state.current_room_id
    }

    pub fn past_room_id(&self) -> RoomId {
        self.state.past_room_id
    }

    /// Resolve the room the NPC is currently in
    pub fn current_room(&self) -> Result<&'a dyn Room> {
        self.room(self.state.current_room_id)
    }

    /// Resolve any room through the world
    pub fn room(&self, room_id: RoomId) -> Result<&'a dyn Room> {
        self.world
            .find_room(room_id)
            .ok_or(NpcError::RoomNotFound(room_id))
    }

    /// Move the NPC, remembering where it came from
    pub fn set_location(&mut self, room_id: RoomId) {
        self.state.past_room_id = self.state.current_room_id;
        self.state.current_room_id = room_id;
    }
}
