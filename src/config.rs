use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::log;

// ----------------------------------------------
// HotQueueConfig
// ----------------------------------------------

// Tuning for HotPriorityQueue. The defaults perform well on boards in
// the hundreds-of-cells-per-side range; platforms with very different
// cache sizes may want to benchmark their own values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotQueueConfig {
    // Right-shift applied to keys when grouping them into bands.
    pub preference_width: u32,

    // Starting capacity of the binary heap.
    pub initial_capacity: usize,

    // Fraction of the capacity the heap may fill before higher bands
    // spill into the overflow lists.
    pub pool_fraction_num: usize,
    pub pool_fraction_den: usize,
}

impl HotQueueConfig {
    #[inline]
    pub fn pool_size(&self) -> usize {
        debug_assert!(self.pool_fraction_den != 0);
        ((self.initial_capacity * self.pool_fraction_num) / self.pool_fraction_den).max(1)
    }
}

impl Default for HotQueueConfig {
    fn default() -> Self {
        Self {
            preference_width: 3,
            initial_capacity: 2048,
            pool_fraction_num: 7,
            pool_fraction_den: 8,
        }
    }
}

// ----------------------------------------------
// PathfinderConfig
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathfinderConfig {
    // Hex distance above which FindPath switches from the
    // unidirectional search to the bidirectional ALT search.
    pub range_cutoff: i32,

    pub hot_queue: HotQueueConfig,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            range_cutoff: 16,
            hot_queue: HotQueueConfig::default(),
        }
    }
}

impl PathfinderConfig {
    // Either succeeds loading the config file or returns the defaults.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to read config file {path:?}: {err}");
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to parse config file {path:?}: {err}");
                Self::default()
            }
        }
    }

    // Saves current configs to file.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();

        let text = match serde_json::to_string_pretty(self) {
            Ok(text) => text,
            Err(err) => {
                log::error!(log::channel!("config"), "Failed to serialize config: {err}");
                return false;
            }
        };

        if let Err(err) = std::fs::write(path, text) {
            log::error!(log::channel!("config"), "Failed to write config file {path:?}: {err}");
            return false;
        }

        true
    }
}

// ----------------------------------------------
// Tests
// ----------------------------------------------
