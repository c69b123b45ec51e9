use std::fmt;
use std::rc::Rc;

use crate::coords::{Coords, Hexside};


// ----------------------------------------------
// PathStep
// ----------------------------------------------

// The move that produced a path node: the hexside crossed when leaving
// the previous cell and the cost charged for that crossing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub hexside: Hexside,
    pub cost: i32,
}

// ----------------------------------------------
// DirectedPath
// ----------------------------------------------

struct PathNode {
    coords: Coords,
    step: Option<PathStep>, // None only for the origin node.
    total_cost: i32,
    total_steps: u32,
    link: Option<Rc<PathNode>>,
}

// Immutable path through the board, stored newest-cell-first as a
// shared singly-linked list. Extending a path never touches the nodes
// it shares with other paths, so a search can keep thousands of
// partial paths alive at once.
#[derive(Clone)]
pub struct DirectedPath {
    head: Rc<PathNode>,
}

impl DirectedPath {
    // Zero-length path sitting on `origin`.
    pub fn new(origin: Coords) -> Self {
        Self {
            head: Rc::new(PathNode {
                coords: origin,
                step: None,
                total_cost: 0,
                total_steps: 0,
                link: None,
            }),
        }
    }

    // New path that is `self` plus one move onto `coords`.
    pub fn add_step(&self, coords: Coords, hexside: Hexside, cost: i32) -> Self {
        debug_assert!(cost > 0, "Path steps must have a positive cost!");
        Self {
            head: Rc::new(PathNode {
                coords,
                step: Some(PathStep { hexside, cost }),
                total_cost: self.head.total_cost + cost,
                total_steps: self.head.total_steps + 1,
                link: Some(Rc::clone(&self.head)),
            }),
        }
    }

    #[inline]
    pub fn head_coords(&self) -> Coords {
        self.head.coords
    }

    #[inline]
    pub fn total_cost(&self) -> i32 {
        self.head.total_cost
    }

    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.head.total_steps
    }

    // Walks the path head-first, newest cell to origin.
    pub fn iter(&self) -> PathIter<'_> {
        PathIter { node: Some(&self.head) }
    }

    // Cells in iteration order, head first. For a merged or
    // backward-built path this is the walk order across the board.
    pub fn cells(&self) -> Vec<Coords> {
        self.iter().map(|(coords, _)| coords).collect()
    }

    // Joins the two halves of a bidirectional search at their meeting
    // cell. `forward` runs origin->meeting and records for each node
    // the hexside it was entered through; `reverse` runs
    // destination->meeting recording exit hexsides. The forward nodes
    // are re-pushed onto the reverse half with their hexsides flipped,
    // yielding a single exit-hexside path from the forward origin to
    // the reverse origin.
    pub fn merge_halves(forward: &Self, reverse: &Self) -> Self {
        debug_assert!(forward.head.coords == reverse.head.coords,
                      "Halves must meet on the same cell to merge!");

        let mut merged = reverse.clone();
        let mut node = &forward.head;

        while let (Some(step), Some(link)) = (node.step, node.link.as_ref()) {
            merged = merged.add_step(link.coords, step.hexside.reversed(), step.cost);
            node = link;
        }

        merged
    }
}

pub struct PathIter<'a> {
    node: Option<&'a PathNode>,
}

impl Iterator for PathIter<'_> {
    type Item = (Coords, Option<PathStep>);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.link.as_deref();
        Some((node.coords, node.step))
    }
}

impl fmt::Display for DirectedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectedPath{{ head: {}, cost: {}, steps: {} }}",
               self.head.coords, self.head.total_cost, self.head.total_steps)
    }
}
