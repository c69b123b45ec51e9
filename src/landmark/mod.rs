use std::cmp::Reverse;
use std::time::Instant;

use priority_queue::PriorityQueue;
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::{
    board::{self, HexBoard},
    coords::Coords,
    log,
    storage::{BlockedBoardStorage, BoardStorage},
    utils::Size
};


// Distance table entry for a cell the flood-fill never reached.
pub const DISTANCE_UNREACHED: i32 = -1;

// ----------------------------------------------
// Landmark
// ----------------------------------------------

// Which of the two distance tables a flood-fill produces. Edge costs
// are asymmetric, so reaching the anchor and leaving it are distinct
// problems over reversed edge sets.
#[derive(Copy, Clone, PartialEq, Eq)]
enum CostDirection {
    Toward, // Cost of travel from each cell to the anchor.
    Away,   // Cost of travel from the anchor to each cell.
}

// One anchor cell with its two exact distance tables. Differencing a
// table at two cells bounds the distance between them from below
// (triangle inequality), which is what turns plain A* into ALT.
pub struct Landmark {
    anchor: Coords,
    distance_to: BlockedBoardStorage<i32>,
    distance_from: BlockedBoardStorage<i32>,
}

impl Landmark {
    pub fn new(board: &impl HexBoard, anchor: Coords) -> Result<Self, String> {
        if !board.is_onboard(anchor) {
            return Err(format!("Landmark anchor {anchor} is outside the board {}!", board.extent()));
        }

        Ok(Self {
            anchor,
            distance_to: Self::dijkstra_fill(board, anchor, CostDirection::Toward),
            distance_from: Self::dijkstra_fill(board, anchor, CostDirection::Away),
        })
    }

    #[inline]
    pub fn anchor(&self) -> Coords {
        self.anchor
    }

    // Exact cost of `cell` -> anchor, or DISTANCE_UNREACHED.
    #[inline]
    pub fn distance_to_anchor(&self, cell: Coords) -> i32 {
        self.distance_to.try_get(cell).copied().unwrap_or(DISTANCE_UNREACHED)
    }

    // Exact cost of anchor -> `cell`, or DISTANCE_UNREACHED.
    #[inline]
    pub fn distance_from_anchor(&self, cell: Coords) -> i32 {
        self.distance_from.try_get(cell).copied().unwrap_or(DISTANCE_UNREACHED)
    }

    // Single-source Dijkstra over the whole board. `Toward` walks the
    // reversed edge set so the table ends up holding cell->anchor
    // costs even though the fill expands outward from the anchor.
    fn dijkstra_fill(board: &impl HexBoard, anchor: Coords, direction: CostDirection) -> BlockedBoardStorage<i32> {
        let mut distances = BlockedBoardStorage::new(board.extent(), |_| DISTANCE_UNREACHED);

        let mut frontier: PriorityQueue<Coords, Reverse<i32>> = PriorityQueue::new();
        frontier.push(anchor, Reverse(0));

        while let Some((cell, Reverse(distance))) = frontier.pop() {
            if distances.get(cell) >= 0 {
                continue; // Already finalized.
            }
            distances.set(cell, distance);

            for (hexside, neighbour) in board.neighbours(cell) {
                if distances.get(neighbour) >= 0 {
                    continue;
                }

                let cost = match direction {
                    CostDirection::Toward => board.step_cost(neighbour, hexside.reversed()),
                    CostDirection::Away   => board.step_cost(cell, hexside),
                };
                if cost <= 0 {
                    continue; // Impassable crossing.
                }

                // Keeps whichever of the queued and the new priority is
                // better, so the frontier holds one entry per cell.
                frontier.push_increase(neighbour, Reverse(distance + cost));
            }
        }

        distances
    }
}

// ----------------------------------------------
// LandmarkCollection
// ----------------------------------------------

pub struct LandmarkCollection {
    landmarks: Vec<Landmark>,
}

impl LandmarkCollection {
    // Builds every landmark table, one rayon task per anchor. Fails if
    // the board contract is broken or any anchor is off the board.
    pub fn new(board: &(impl HexBoard + Sync), anchors: &[Coords]) -> Result<Self, String> {
        board::validate(board)?;

        let start_time = Instant::now();

        let landmarks = anchors
            .par_iter()
            .map(|&anchor| Landmark::new(board, anchor))
            .collect::<Result<Vec<_>, String>>()?;

        log::info!(log::channel!("landmark"),
                   "Built {} landmark tables for board {} in {:?}.",
                   landmarks.len(), board.extent(), start_time.elapsed());

        Ok(Self { landmarks })
    }

    // Recomputes every table after board costs changed. Takes `&mut`
    // so in-flight queries holding `&self` must finish first.
    pub fn reset(&mut self, board: &(impl HexBoard + Sync)) -> Result<(), String> {
        board::validate(board)?;

        let start_time = Instant::now();

        let anchors: Vec<Coords> = self.landmarks.iter().map(|landmark| landmark.anchor).collect();
        self.landmarks = anchors
            .par_iter()
            .map(|&anchor| Landmark::new(board, anchor))
            .collect::<Result<Vec<_>, String>>()?;

        log::info!(log::channel!("landmark"),
                   "Rebuilt {} landmark tables in {:?}.",
                   self.landmarks.len(), start_time.elapsed());

        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    // Lower bound on the cost of `cell` -> `target`, from the best
    // landmark. Zero when no landmark reaches both cells.
    pub fn heuristic_toward(&self, cell: Coords, target: Coords) -> i32 {
        let mut best = 0;
        for landmark in &self.landmarks {
            let at_target = landmark.distance_from_anchor(target);
            let at_cell = landmark.distance_from_anchor(cell);
            if at_target >= 0 && at_cell >= 0 {
                best = best.max(at_target - at_cell);
            }
        }
        best
    }

    // Lower bound on the cost of `source` -> `cell`.
    pub fn heuristic_from(&self, source: Coords, cell: Coords) -> i32 {
        let mut best = 0;
        for landmark in &self.landmarks {
            let at_source = landmark.distance_to_anchor(source);
            let at_cell = landmark.distance_to_anchor(cell);
            if at_source >= 0 && at_cell >= 0 {
                best = best.max(at_source - at_cell);
            }
        }
        best
    }
}

// Corner and edge-midpoint anchors. A decent default for open boards;
// maps with large impassable regions benefit from hand-picked anchors
// instead.
pub fn default_anchors(extent: Size) -> SmallVec<[Coords; 8]> {
    debug_assert!(extent.is_valid());

    let max_x = extent.width - 1;
    let max_y = extent.height - 1;
    let mid_x = extent.width / 2;
    let mid_y = extent.height / 2;

    let candidates = [
        Coords::new(0, 0),
        Coords::new(max_x, 0),
        Coords::new(0, max_y),
        Coords::new(max_x, max_y),
        Coords::new(mid_x, 0),
        Coords::new(mid_x, max_y),
        Coords::new(0, mid_y),
        Coords::new(max_x, mid_y),
    ];

    let mut anchors = SmallVec::new();
    for candidate in candidates {
        if !anchors.contains(&candidate) {
            anchors.push(candidate);
        }
    }
    anchors
}
