//! MUD NPC server
//!
//! Loads a map, populates it with roaming NPCs and ticks them at a fixed rate.
//! Room narration is written to the log.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use mud_server::config::ServerConfig;
use mud_server::{GameMap, GameWorld, SystemClock};

/// Log a population summary this often
const STATUS_INTERVAL_SECS: u64 = 60;

fn load_map(config: &ServerConfig) -> GameMap {
    let Some(path) = &config.map_path else {
        return GameMap::with_defaults();
    };

    match GameMap::load_from_json(path) {
        Ok(map) => map,
        Err(e) => {
            error!("Failed to load map {:?}: {}", path, e);
            error!("Using built-in map");
            GameMap::with_defaults()
        }
    }
}

/// Forward each room's narration to the log
fn spawn_room_observers(map: &GameMap) -> Vec<JoinHandle<()>> {
    map.room_ids()
        .into_iter()
        .filter_map(|id| {
            let name = map.room(id)?.name.clone();
            let mut rx = map.subscribe(id)?;
            Some(tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(msg) => info!("[{}] {}", name, msg.text),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Observer for {} skipped {} messages", name, skipped)
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }))
        })
        .collect()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    info!("Starting MUD NPC server...");
    info!("Tick interval: {}ms", config.tick_ms);

    let map = Arc::new(load_map(&config));
    let observers = spawn_room_observers(&map);

    let mut world = GameWorld::new(map, Arc::new(SystemClock));
    if let Err(e) = world.spawn_from_map() {
        error!("Failed to populate world: {}", e);
        return;
    }
    let world = Arc::new(world);

    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut status = tokio::time::interval(Duration::from_secs(STATUS_INTERVAL_SECS));

    info!("Server started with {} NPCs", world.len());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // Main loop
    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Ticking is synchronous; keep it off the async workers
                let pass = world.clone();
                match tokio::task::spawn_blocking(move || pass.tick_all()).await {
                    Ok(summary) if summary.acted > 0 || summary.failed > 0 => {
                        debug!("Tick: {} acted, {} idle, {} failed", summary.acted, summary.idle, summary.failed);
                    }
                    Ok(_) => {}
                    Err(e) => error!("Tick pass panicked: {}", e),
                }
            }
            _ = status.tick() => {
                for snapshot in world.snapshots() {
                    info!("{} is in room {} (came from {})", snapshot.name, snapshot.current_room_id, snapshot.past_room_id);
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    for observer in &observers {
        observer.abort();
    }
    futures::future::join_all(observers).await;
    info!("Server stopped");
}
