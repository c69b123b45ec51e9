use arrayvec::ArrayVec;
use strum::{EnumCount, IntoEnumIterator};

use crate::coords::{Coords, Hexside};
use crate::utils::Size;

// ----------------------------------------------
// HexBoard
// ----------------------------------------------

// Terrain model the searches run over. Implementations only have to
// supply the board extent and the per-hexside movement costs; the
// adjacency helpers are derived.
pub trait HexBoard {
    fn extent(&self) -> Size;

    // Cost of leaving `coords` through `hexside_exit`. Zero or
    // negative marks the crossing as impassable. Off-board cells must
    // report impassable for every hexside.
    fn step_cost(&self, coords: Coords, hexside_exit: Hexside) -> i32;

    // Lower bound on the cost of covering `range` hexes. Used as the
    // fallback heuristic when no landmark gives a tighter bound. Must
    // be zero at zero range, monotonic, and never grow per hex by more
    // than the cheapest step cost anywhere on the board.
    #[inline]
    fn range_heuristic(&self, range: i32) -> i32 {
        debug_assert!(range >= 0);
        range
    }

    #[inline]
    fn is_onboard(&self, coords: Coords) -> bool {
        let extent = self.extent();
        coords.x >= 0 && coords.x < extent.width &&
        coords.y >= 0 && coords.y < extent.height
    }

    // Adjacent cell across `hexside`, or None when it falls off the board.
    #[inline]
    fn neighbour(&self, coords: Coords, hexside: Hexside) -> Option<Coords> {
        let neighbour = coords.neighbour(hexside);
        if self.is_onboard(neighbour) {
            Some(neighbour)
        } else {
            None
        }
    }

    // True if at least one hexside can be exited from `coords`.
    fn is_passable(&self, coords: Coords) -> bool {
        Hexside::iter().any(|hexside| self.step_cost(coords, hexside) > 0)
    }

    // All on-board neighbours of `coords` with the hexside leading to each.
    fn neighbours(&self, coords: Coords) -> ArrayVec<(Hexside, Coords), { Hexside::COUNT }> {
        let mut result = ArrayVec::new();
        for hexside in Hexside::iter() {
            if let Some(neighbour) = self.neighbour(coords, hexside) {
                result.push((hexside, neighbour));
            }
        }
        result
    }
}

// ----------------------------------------------
// Validation
// ----------------------------------------------


// Checks the contract between a board's step costs and its range
// heuristic. An overestimating heuristic silently breaks search
// optimality, so anything building search acceleration structures
// on top of a board should run this first.
pub fn validate(board: &impl HexBoard) -> Result<(), String> {
    let extent = board.extent();
    if !extent.is_valid() {
        return Err(format!("Board extent {extent} is not valid!"));
    }

    if board.range_heuristic(0) != 0 {
        return Err("Range heuristic must be zero at zero range!".to_string());
    }

    // Cheapest positive step cost anywhere on the board.
    let mut min_step_cost = i32::MAX;
    for y in 0..extent.height {
        for x in 0..extent.width {
            let coords = Coords::new(x, y);
            for hexside in Hexside::iter() {
                let cost = board.step_cost(coords, hexside);
                if cost > 0 {
                    min_step_cost = min_step_cost.min(cost);
                }
            }
        }
    }

    if min_step_cost == i32::MAX {
        // Fully impassable board. No path will ever be found but the
        // heuristic cannot overestimate one either.
        return Ok(());
    }

    let max_range = extent.width + extent.height;
    let mut previous = 0;
    for range in 1..=max_range {
        let estimate = board.range_heuristic(range);
        if estimate < previous {
            return Err(format!(
                "Range heuristic is not monotonic: h({range}) = {estimate} < h({}) = {previous}!",
                range - 1));
        }
        if estimate - previous > min_step_cost {
            return Err(format!(
                "Range heuristic rises by {} at range {range}, above the cheapest step cost {min_step_cost}!",
                estimate - previous));
        }
        previous = estimate;
    }

    Ok(())
}
