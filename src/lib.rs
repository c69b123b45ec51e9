// NOTE: Allow these for the whole project.
#![allow(dead_code)]
#![allow(clippy::collapsible_if)]

pub mod log;
pub mod board;
pub mod config;
pub mod coords;
pub mod landmark;
pub mod path;
pub mod pathfind;
pub mod queue;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testboard;

pub use board::HexBoard;
pub use config::{HotQueueConfig, PathfinderConfig};
pub use coords::{Coords, Hexside};
pub use landmark::{Landmark, LandmarkCollection};
pub use path::{DirectedPath, PathStep};
pub use pathfind::{Pathfinder, SearchFlags};
pub use utils::Size;
