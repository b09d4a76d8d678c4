//! Server configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use mud_shared::SERVER_TICK_RATE;

/// Lowest driver period accepted from the environment
const MIN_TICK_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// JSON map to load. `None` uses the built-in map.
    pub map_path: Option<PathBuf>,
    /// How often the driver ticks the NPC population
    pub tick_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            map_path: None,
            tick_ms: 1000 / SERVER_TICK_RATE as u64,
        }
    }
}

impl ServerConfig {
    /// Read `MUD_MAP_PATH` and `MUD_TICK_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("MUD_MAP_PATH").filter(|p| !p.trim().is_empty()) {
            config.map_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("MUD_TICK_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.tick_ms = ms.max(MIN_TICK_MS),
                Err(_) => warn!("Ignoring invalid MUD_TICK_MS={:?}, using {}ms", raw, config.tick_ms),
            }
        }

        config
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.tick_ms, 250);
    }

    #[test]
    fn test_reads_map_path_and_tick() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("MUD_MAP_PATH", "maps/campus.json"),
            ("MUD_TICK_MS", "500"),
        ]));
        assert_eq!(config.map_path, Some(PathBuf::from("maps/campus.json")));
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_tick_is_clamped_and_garbage_ignored() {
        let config = ServerConfig::from_lookup(lookup_from(&[("MUD_TICK_MS", "1")]));
        assert_eq!(config.tick_ms, MIN_TICK_MS);

        let config = ServerConfig::from_lookup(lookup_from(&[("MUD_TICK_MS", "soon")]));
        assert_eq!(config.tick_ms, ServerConfig::default().tick_ms);
    }
}
