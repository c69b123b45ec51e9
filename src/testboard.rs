// Shared test fixtures for the search and landmark tests.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::{
    board::HexBoard,
    coords::{Coords, Hexside},
    storage::{BoardStorage, FlatBoardStorage},
    utils::Size
};

// Board with one uniform exit cost per cell; zero marks the whole cell
// impassable. Off-board cells read as zero, so the HexBoard off-board
// contract holds for free.
pub struct TestBoard {
    extent: Size,
    costs: FlatBoardStorage<i32>,
}

impl TestBoard {
    pub fn uniform(extent: Size, cost: i32) -> Self {
        Self {
            extent,
            costs: FlatBoardStorage::new(extent, |_| cost),
        }
    }

    pub fn from_fn<F>(extent: Size, init: F) -> Self
        where F: FnMut(Coords) -> i32
    {
        Self {
            extent,
            costs: FlatBoardStorage::new(extent, init),
        }
    }

    // Builds a board from row literals, top row first.
    pub fn from_rows(rows: &[&[i32]]) -> Self {
        let extent = Size::new(rows[0].len() as i32, rows.len() as i32);
        Self::from_fn(extent, |coords| rows[coords.y as usize][coords.x as usize])
    }

    pub fn set_cost(&mut self, coords: Coords, cost: i32) {
        self.costs.set(coords, cost);
    }
}

impl HexBoard for TestBoard {
    fn extent(&self) -> Size {
        self.extent
    }

    fn step_cost(&self, coords: Coords, _hexside_exit: Hexside) -> i32 {
        self.costs.get(coords)
    }
}

// Straightforward Dijkstra used as the ground truth the searches are
// checked against. Returns the optimal start -> goal cost.
pub fn reference_dijkstra(board: &impl HexBoard, start: Coords, goal: Coords) -> Option<i32> {
    if !board.is_onboard(start) || !board.is_onboard(goal) {
        return None;
    }

    let mut best = FlatBoardStorage::new(board.extent(), |_| i32::MAX);
    let mut frontier = BinaryHeap::new();

    best.set(start, 0);
    frontier.push((Reverse(0), start));

    while let Some((Reverse(cost), cell)) = frontier.pop() {
        if cell == goal {
            return Some(cost);
        }
        if cost > best.get(cell) {
            continue; // Stale entry.
        }

        for (hexside, neighbour) in board.neighbours(cell) {
            let step = board.step_cost(cell, hexside);
            if step <= 0 {
                continue;
            }
            let next = cost + step;
            if next < best.get(neighbour) {
                best.set(neighbour, next);
                frontier.push((Reverse(next), neighbour));
            }
        }
    }

    None
}
