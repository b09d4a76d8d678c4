//! NPC behaviors.
//!
//! A behavior produces one behavior cycle for an NPC. The NPC's trigger decides
//! when a cycle runs; the behavior decides what happens in it.

use log::{debug, warn};

use crate::error::Result;

use super::npc::Cycle;

/// Capability to run one behavior cycle
pub trait Behavior: Send + Sync {
    fn perform(&self, cycle: &mut Cycle<'_>) -> Result<()>;
}

/// Uninformed random walk that never steps straight back into the room it
/// just left.
///
/// When every exit leads back (or there are none) the NPC is put back into its
/// previous room instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomWalk;

impl Behavior for RandomWalk {
    fn perform(&self, cycle: &mut Cycle<'_>) -> Result<()> {
        let name = cycle.name();
        let room = cycle.current_room()?;
        let past_room_id = cycle.past_room_id();

        let (target_id, leaving) = match room.random_valid_exit(past_room_id) {
            None => {
                warn!("Resetting {} to its previous room {}", name, past_room_id);
                (past_room_id, vanished(name))
            }
            Some(exit) => {
                debug!("{} leaving room {} to the {}", name, room.id(), exit.direction());
                (exit.destination(), departed(name, exit.direction()))
            }
        };

        // Nothing is narrated unless the NPC has somewhere to land
        let target = cycle.room(target_id)?;
        room.broadcast(&leaving)?;
        cycle.set_location(target_id);
        target.broadcast(&arrived(name))?;
        Ok(())
    }
}

fn vanished(name: &str) -> String {
    format!("{} teleported away using hax", name)
}

fn departed(name: &str, direction: &str) -> String {
    format!("{} walked off to the {}", name, direction)
}

fn arrived(name: &str) -> String {
    format!("{} walked into the area", name)
}
