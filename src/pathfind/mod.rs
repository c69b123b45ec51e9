use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    bitflags_with_display,
    board::HexBoard,
    config::PathfinderConfig,
    coords::Coords,
    landmark::LandmarkCollection,
    log,
    path::DirectedPath,
    queue::{DictionaryPriorityQueue, HotPriorityQueue, PriorityQueue},
    storage::{BoardStorage, FlatBoardStorage},
    utils::Size
};

#[cfg(test)]
mod tests;

pub const COST_INFINITE: i32 = i32::MAX;

// ----------------------------------------------
// SearchKey
// ----------------------------------------------

// Frontier ordering for the unidirectional search. Candidates order by
// cost estimate first; among equal estimates the one deviating least
// from the direct line wins, which keeps equal-cost paths straight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchKey {
    pub estimate: i32,
    pub preference: i32,
}

// ----------------------------------------------
// SearchFlags
// ----------------------------------------------

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct SearchFlags: u32 {
        // Overrides the range cutoff and always runs the plain search.
        const FORCE_UNIDIRECTIONAL = 1 << 0;

        // Overrides the range cutoff and always runs both halves.
        const FORCE_BIDIRECTIONAL  = 1 << 1;
    }
}

// ----------------------------------------------
// Pathfinder
// ----------------------------------------------

pub struct Pathfinder<'a, B: HexBoard> {
    board: &'a B,
    landmarks: &'a LandmarkCollection,
    config: PathfinderConfig,
    flags: SearchFlags,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, B: HexBoard> Pathfinder<'a, B> {
    pub fn new(board: &'a B, landmarks: &'a LandmarkCollection, config: PathfinderConfig) -> Self {
        Self {
            board,
            landmarks,
            config,
            flags: SearchFlags::empty(),
            cancel: None,
        }
    }

    pub fn with_flags(mut self, flags: SearchFlags) -> Self {
        self.flags = flags;
        self
    }

    // The search polls `cancel` and gives up once it is raised.
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    // Cheapest path from `start` to `goal`, or None when no path
    // exists. Short queries run a plain A*; anything past the
    // configured range cutoff runs the bidirectional landmark search.
    pub fn find_path(&self, start: Coords, goal: Coords) -> Option<DirectedPath> {
        if !self.board.is_onboard(start) || !self.board.is_onboard(goal) {
            log::warn!(log::channel!("pathfind"),
                       "Path endpoints {start} -> {goal} must be on the board {}!",
                       self.board.extent());
            return None;
        }

        if start == goal {
            return Some(DirectedPath::new(start));
        }

        // Endpoints that cannot be exited fail without a search; "no
        // path" is the result, not an error.
        if !self.board.is_passable(start) || !self.board.is_passable(goal) {
            return None;
        }

        let bidirectional = if self.flags.contains(SearchFlags::FORCE_UNIDIRECTIONAL) {
            false
        } else if self.flags.contains(SearchFlags::FORCE_BIDIRECTIONAL) {
            true
        } else {
            start.range(goal) > self.config.range_cutoff
        };

        if bidirectional {
            self.find_path_bidirectional(start, goal)
        } else {
            self.find_path_unidirectional(start, goal)
        }
    }

    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|cancel| cancel.load(Ordering::Relaxed))
    }

    // Bound on the remaining cost of walking `cell` -> `goal`.
    #[inline]
    fn forward_heuristic(&self, cell: Coords, goal: Coords) -> i32 {
        self.landmarks
            .heuristic_toward(cell, goal)
            .max(self.board.range_heuristic(cell.range(goal)))
    }

    // Bound on the cost already needed to walk `start` -> `cell`.
    #[inline]
    fn reverse_heuristic(&self, start: Coords, cell: Coords) -> i32 {
        self.landmarks
            .heuristic_from(start, cell)
            .max(self.board.range_heuristic(cell.range(start)))
    }

    // ----------------------------------------------
    // Unidirectional search
    // ----------------------------------------------

    // A* from the goal toward the start over the reversed edge set.
    // Growing paths backwards means the finished path already reads
    // start-first with exit hexsides, with no reversal step.
    fn find_path_unidirectional(&self, start: Coords, goal: Coords) -> Option<DirectedPath> {
        let extent = self.board.extent();

        let mut frontier: DictionaryPriorityQueue<SearchKey, DirectedPath> = DictionaryPriorityQueue::new();
        let mut closed = FlatBoardStorage::new(extent, |_| false);
        let mut best_cost = FlatBoardStorage::new(extent, |_| COST_INFINITE);
        let mut expanded: usize = 0;

        best_cost.set(goal, 0);
        frontier.enqueue(
            SearchKey { estimate: self.reverse_heuristic(start, goal), preference: 0 },
            DirectedPath::new(goal));

        while let Some((_, path)) = frontier.try_dequeue() {
            if self.is_cancelled() {
                log::verbose!(log::channel!("pathfind"),
                              "Search {start} -> {goal} cancelled after {expanded} expansions.");
                return None;
            }

            let cell = path.head_coords();
            if closed.get(cell) {
                continue; // Stale frontier entry.
            }
            closed.set(cell, true);
            expanded += 1;

            if cell == start {
                log::verbose!(log::channel!("pathfind"),
                              "Unidirectional {start} -> {goal}: cost {}, {} steps, {expanded} expansions.",
                              path.total_cost(), path.total_steps());
                return Some(path);
            }

            for (hexside, neighbour) in self.board.neighbours(cell) {
                if closed.get(neighbour) {
                    continue;
                }

                // Walking neighbour -> cell exits the neighbour through
                // the opposite hexside.
                let step_cost = self.board.step_cost(neighbour, hexside.reversed());
                if step_cost <= 0 {
                    continue;
                }

                let next_cost = path.total_cost() + step_cost;
                if next_cost >= best_cost.get(neighbour) {
                    continue;
                }
                best_cost.set(neighbour, next_cost);

                let key = SearchKey {
                    estimate: next_cost + self.reverse_heuristic(start, neighbour),
                    preference: neighbour.cross_deviation(goal, start),
                };
                frontier.enqueue(key, path.add_step(neighbour, hexside.reversed(), step_cost));
            }
        }

        log::verbose!(log::channel!("pathfind"),
                      "Unidirectional {start} -> {goal}: no path, {expanded} expansions.");
        None
    }

    // ----------------------------------------------
    // Bidirectional search
    // ----------------------------------------------

    fn hot_key(&self, estimate: i32, preference: i32) -> i32 {
        let width = self.config.hot_queue.preference_width;
        let mask = (1 << width) - 1;
        (estimate.min(COST_INFINITE >> width) << width) | preference.min(mask)
    }

    #[inline]
    fn hot_key_estimate(&self, key: i32) -> i32 {
        key >> self.config.hot_queue.preference_width
    }

    fn half_heuristic(&self, half: &HalfSearch, cell: Coords) -> i32 {
        match half.direction {
            Direction::Forward => self.forward_heuristic(cell, half.target),
            Direction::Reverse => self.reverse_heuristic(half.target, cell),
        }
    }

    // Two A* halves expanded in strict alternation over a shared
    // closed set. Whenever a relaxation lands on a cell the other half
    // has reached, the joined cost is a complete path; the cheapest
    // such meeting is provably optimal once the frontiers drain under
    // the pruning bounds below.
    fn find_path_bidirectional(&self, start: Coords, goal: Coords) -> Option<DirectedPath> {
        let extent = self.board.extent();
        let mut closed = FlatBoardStorage::new(extent, |_| false);
        let mut meeting: Option<Meeting> = None;

        let mut forward = HalfSearch::new(Direction::Forward, start, goal, extent, &self.config);
        let mut reverse = HalfSearch::new(Direction::Reverse, goal, start, extent, &self.config);

        for half in [&mut forward, &mut reverse] {
            let estimate = self.half_heuristic(half, half.origin);
            half.reached.set(half.origin, Some(OpenEntry { cost: 0, path: DirectedPath::new(half.origin) }));
            half.frontier.enqueue(self.hot_key(estimate, 0), DirectedPath::new(half.origin));
        }

        loop {
            if self.is_cancelled() {
                log::verbose!(log::channel!("pathfind"),
                              "Search {start} -> {goal} cancelled after {} expansions.",
                              forward.expanded + reverse.expanded);
                return None;
            }

            // Once either frontier drains, every surviving candidate
            // on the other side is already bounded by the best meeting.
            if !self.step_half(&mut forward, &reverse, &mut closed, &mut meeting) {
                break;
            }
            if !self.step_half(&mut reverse, &forward, &mut closed, &mut meeting) {
                break;
            }
        }

        match meeting {
            Some(meeting) => {
                let path = DirectedPath::merge_halves(&meeting.forward, &meeting.reverse);
                log::verbose!(log::channel!("pathfind"),
                              "Bidirectional {start} -> {goal}: cost {}, {} steps, {}+{} expansions.",
                              path.total_cost(), path.total_steps(),
                              forward.expanded, reverse.expanded);
                Some(path)
            }
            None => {
                log::verbose!(log::channel!("pathfind"),
                              "Bidirectional {start} -> {goal}: no path, {}+{} expansions.",
                              forward.expanded, reverse.expanded);
                None
            }
        }
    }

    // Expands one cell of `active`. Returns false once its frontier is
    // exhausted.
    fn step_half(&self,
                 active: &mut HalfSearch,
                 partner: &HalfSearch,
                 closed: &mut FlatBoardStorage<bool>,
                 meeting: &mut Option<Meeting>) -> bool {
        let Some((key, path)) = active.frontier.try_dequeue() else {
            return false;
        };

        let cell = path.head_coords();
        if closed.get(cell) {
            return true; // Settled by either half already.
        }

        let best = meeting.as_ref().map_or(COST_INFINITE, |meeting| meeting.cost);
        let cost = path.total_cost();

        // A candidate whose own estimate cannot beat the best meeting
        // is dead weight.
        if self.hot_key_estimate(key) >= best {
            return true;
        }

        // So is one that cannot beat it even when finished by the best
        // remaining candidate of the other half.
        if let Some((&partner_key, _)) = partner.frontier.try_peek() {
            let partner_min = self.hot_key_estimate(partner_key);
            if cost + partner_min - self.half_heuristic(partner, cell) >= best {
                return true;
            }
        }

        closed.set(cell, true);
        active.expanded += 1;

        for (hexside, neighbour) in self.board.neighbours(cell) {
            if closed.get(neighbour) {
                continue;
            }

            let step_cost = match active.direction {
                Direction::Forward => self.board.step_cost(cell, hexside),
                Direction::Reverse => self.board.step_cost(neighbour, hexside.reversed()),
            };
            if step_cost <= 0 {
                continue;
            }

            let next_cost = cost + step_cost;
            let reached_cost = active.reached
                .try_get(neighbour)
                .and_then(|entry| entry.as_ref())
                .map_or(COST_INFINITE, |entry| entry.cost);
            if next_cost >= reached_cost {
                continue;
            }

            let next_path = path.add_step(neighbour, hexside.reversed(), step_cost);
            active.reached.set(neighbour, Some(OpenEntry { cost: next_cost, path: next_path.clone() }));

            // Joined with whatever the other half knows about this
            // cell, do the two halves now form a cheaper full path?
            if let Some(Some(partner_entry)) = partner.reached.try_get(neighbour) {
                let total = next_cost + partner_entry.cost;
                let best_now = meeting.as_ref().map_or(COST_INFINITE, |meeting| meeting.cost);
                if total < best_now {
                    *meeting = Some(match active.direction {
                        Direction::Forward => Meeting {
                            cost: total,
                            forward: next_path.clone(),
                            reverse: partner_entry.path.clone(),
                        },
                        Direction::Reverse => Meeting {
                            cost: total,
                            forward: partner_entry.path.clone(),
                            reverse: next_path.clone(),
                        },
                    });
                }
            }

            let estimate = next_cost + self.half_heuristic(active, neighbour);
            let best_now = meeting.as_ref().map_or(COST_INFINITE, |meeting| meeting.cost);
            if estimate < best_now {
                let preference = neighbour.cross_deviation(active.origin, active.target);
                active.frontier.enqueue(self.hot_key(estimate, preference), next_path);
            }
        }

        true
    }
}

// ----------------------------------------------
// HalfSearch
// ----------------------------------------------

#[derive(Copy, Clone, PartialEq, Eq)]
enum Direction {
    Forward, // Expands exits away from the start.
    Reverse, // Expands the reversed edges back from the goal.
}

struct OpenEntry {
    cost: i32,
    path: DirectedPath,
}

// Cheapest complete path seen so far, split where the two halves met.
struct Meeting {
    cost: i32,
    forward: DirectedPath,
    reverse: DirectedPath,
}

struct HalfSearch {
    direction: Direction,
    origin: Coords,
    target: Coords,
    frontier: HotPriorityQueue<DirectedPath>,
    // Best known cost and path per cell for this half. Entries persist
    // for the whole search; the partner half reads them to detect
    // meetings.
    reached: FlatBoardStorage<Option<OpenEntry>>,
    expanded: usize,
}

impl HalfSearch {
    fn new(direction: Direction, origin: Coords, target: Coords,
           extent: Size, config: &PathfinderConfig) -> Self {
        Self {
            direction,
            origin,
            target,
            frontier: HotPriorityQueue::new(config.hot_queue),
            reached: FlatBoardStorage::new(extent, |_| None),
            expanded: 0,
        }
    }
}
