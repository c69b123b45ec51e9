use std::sync::atomic::AtomicBool;

use super::*;
use crate::{
    board::HexBoard,
    landmark::{self, LandmarkCollection},
    path::PathStep,
    testboard::{TestBoard, reference_dijkstra}
};

use rand::Rng;
use rand_pcg::Pcg32;

fn random_board(extent: Size, seed: u64) -> TestBoard {
    let mut rng = Pcg32::new(seed, 0xa02bdbf7bb3c0a7);
    TestBoard::from_fn(extent, |_| {
        if rng.random_range(0..6) == 0 { 0 } else { rng.random_range(1..=5) }
    })
}

fn build_landmarks(board: &TestBoard) -> LandmarkCollection {
    let anchors = landmark::default_anchors(board.extent());
    LandmarkCollection::new(board, &anchors).unwrap()
}

fn solve(board: &TestBoard, landmarks: &LandmarkCollection,
         flags: SearchFlags, start: Coords, goal: Coords) -> Option<DirectedPath> {
    Pathfinder::new(board, landmarks, PathfinderConfig::default())
        .with_flags(flags)
        .find_path(start, goal)
}

// Checks the path is a contiguous walk from start to goal whose steps
// agree with the board's costs.
fn assert_valid_walk(board: &TestBoard, path: &DirectedPath, start: Coords, goal: Coords) {
    let nodes: Vec<(Coords, Option<PathStep>)> = path.iter().collect();

    assert_eq!(nodes.first().map(|(coords, _)| *coords), Some(start));
    assert_eq!(nodes.last().map(|(coords, _)| *coords), Some(goal));
    assert!(nodes.last().and_then(|(_, step)| *step).is_none());

    let mut total_cost = 0;
    for window in nodes.windows(2) {
        let (cell, step) = window[0];
        let (next, _) = window[1];
        let step = step.expect("every non-terminal cell carries its exit step");

        assert_eq!(cell.neighbour(step.hexside), next);
        assert_eq!(step.cost, board.step_cost(cell, step.hexside));
        total_cost += step.cost;
    }
    assert_eq!(total_cost, path.total_cost());
    assert_eq!(nodes.len() as u32, path.total_steps() + 1);
}

#[test]
fn test_zero_length_path() {
    let board = TestBoard::uniform(Size::new(6, 6), 1);
    let landmarks = build_landmarks(&board);

    let cell = Coords::new(3, 3);
    let path = solve(&board, &landmarks, SearchFlags::empty(), cell, cell).unwrap();

    assert_eq!(path.total_cost(), 0);
    assert_eq!(path.total_steps(), 0);
    assert_eq!(path.head_coords(), cell);
}

#[test]
fn test_offboard_endpoints_fail() {
    let board = TestBoard::uniform(Size::new(6, 6), 1);
    let landmarks = build_landmarks(&board);

    assert!(solve(&board, &landmarks, SearchFlags::empty(), Coords::new(-1, 0), Coords::new(3, 3)).is_none());
    assert!(solve(&board, &landmarks, SearchFlags::empty(), Coords::new(0, 0), Coords::new(6, 3)).is_none());
}

#[test]
fn test_corner_to_corner_uniform() {
    // (0,0) and (9,9) are 14 hexes apart; every step costs 1.
    let board = TestBoard::uniform(Size::new(10, 10), 1);
    let landmarks = build_landmarks(&board);

    let start = Coords::new(0, 0);
    let goal = Coords::new(9, 9);

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        let path = solve(&board, &landmarks, flags, start, goal).unwrap();
        assert_eq!(path.total_cost(), 14, "with {flags}");
        assert_eq!(path.total_steps(), 14, "with {flags}");
        assert_valid_walk(&board, &path, start, goal);
    }
}

#[test]
fn test_straight_row_is_found_exactly() {
    let board = TestBoard::uniform(Size::new(20, 5), 1);
    let landmarks = build_landmarks(&board);

    let start = Coords::new(2, 2);
    let goal = Coords::new(17, 2);

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        let path = solve(&board, &landmarks, flags, start, goal).unwrap();
        assert_eq!(path.total_cost(), 15, "with {flags}");

        // The row itself is the unique cheapest walk.
        assert!(path.cells().iter().all(|cell| cell.y == 2), "with {flags}");
        assert_valid_walk(&board, &path, start, goal);
    }
}

#[test]
fn test_wall_with_gap() {
    // Column x == 7 is impassable except for the gap at (7,5).
    let board = TestBoard::from_fn(Size::new(14, 11), |coords| {
        if coords.x == 7 && coords.y != 5 { 0 } else { 1 }
    });
    let landmarks = build_landmarks(&board);

    let start = Coords::new(2, 5);
    let goal = Coords::new(12, 5);
    let expected = reference_dijkstra(&board, start, goal).unwrap();

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        let path = solve(&board, &landmarks, flags, start, goal).unwrap();
        assert_eq!(path.total_cost(), expected, "with {flags}");
        assert!(path.cells().contains(&Coords::new(7, 5)), "with {flags}");
        assert_valid_walk(&board, &path, start, goal);
    }
}

#[test]
fn test_unreachable_goal() {
    // Solid wall, no gap.
    let board = TestBoard::from_fn(Size::new(14, 11), |coords| {
        if coords.x == 7 { 0 } else { 1 }
    });
    let landmarks = build_landmarks(&board);

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        assert!(solve(&board, &landmarks, flags, Coords::new(2, 5), Coords::new(12, 5)).is_none(),
                "with {flags}");
    }
}

#[test]
fn test_impassable_start_fails() {
    let mut board = TestBoard::uniform(Size::new(8, 8), 1);
    board.set_cost(Coords::new(1, 1), 0);
    let landmarks = build_landmarks(&board);

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        assert!(solve(&board, &landmarks, flags, Coords::new(1, 1), Coords::new(6, 6)).is_none(),
                "with {flags}");
    }
}

#[test]
fn test_impassable_goal_fails() {
    let mut board = TestBoard::uniform(Size::new(8, 8), 1);
    board.set_cost(Coords::new(6, 6), 0);
    let landmarks = build_landmarks(&board);

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        assert!(solve(&board, &landmarks, flags, Coords::new(1, 1), Coords::new(6, 6)).is_none(),
                "with {flags}");
    }
}

#[test]
fn test_swapped_endpoints_cost_the_same_on_uniform_boards() {
    // Uniform costs make the board symmetric, so the two directions
    // must agree on the optimal cost.
    let board = TestBoard::uniform(Size::new(18, 14), 2);
    let landmarks = build_landmarks(&board);

    let a = Coords::new(1, 2);
    let b = Coords::new(16, 11);

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        let there = solve(&board, &landmarks, flags, a, b).unwrap();
        let back = solve(&board, &landmarks, flags, b, a).unwrap();
        assert_eq!(there.total_cost(), back.total_cost(), "with {flags}");
        assert_eq!(there.total_steps(), back.total_steps(), "with {flags}");
    }
}

#[test]
fn test_matches_reference_on_varied_terrain() {
    let board = TestBoard::from_rows(&[
        &[1, 1, 3, 3, 3, 1, 1, 1],
        &[1, 0, 0, 3, 0, 0, 5, 1],
        &[1, 2, 0, 3, 0, 2, 5, 1],
        &[1, 2, 0, 0, 0, 2, 5, 1],
        &[1, 2, 2, 2, 2, 2, 1, 1],
        &[1, 1, 1, 4, 4, 1, 1, 1],
    ]);
    let landmarks = build_landmarks(&board);

    let start = Coords::new(0, 0);
    let goal = Coords::new(7, 5);
    let expected = reference_dijkstra(&board, start, goal).unwrap();

    for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
        let path = solve(&board, &landmarks, flags, start, goal).unwrap();
        assert_eq!(path.total_cost(), expected, "with {flags}");
        assert_valid_walk(&board, &path, start, goal);
    }
}

#[test]
fn test_matches_reference_on_random_boards() {
    for seed in [0x1111u64, 0x2222, 0x3333] {
        let board = random_board(Size::new(20, 16), seed);
        let landmarks = build_landmarks(&board);

        let mut rng = Pcg32::new(seed ^ 0xabcd, 0xa02bdbf7bb3c0a7);
        for _ in 0..25 {
            let start = Coords::new(rng.random_range(0..20), rng.random_range(0..16));
            let goal = Coords::new(rng.random_range(0..20), rng.random_range(0..16));

            // Impassable endpoints short-circuit to "no path" even when
            // the goal cell could still be entered.
            let expected = if start == goal {
                Some(0)
            } else if board.is_passable(start) && board.is_passable(goal) {
                reference_dijkstra(&board, start, goal)
            } else {
                None
            };

            for flags in [SearchFlags::FORCE_UNIDIRECTIONAL, SearchFlags::FORCE_BIDIRECTIONAL] {
                let found = solve(&board, &landmarks, flags, start, goal);
                assert_eq!(found.as_ref().map(|path| path.total_cost()), expected,
                           "seed {seed:#x} {start} -> {goal} with {flags}");
                if let Some(path) = found {
                    if start != goal {
                        assert_valid_walk(&board, &path, start, goal);
                    }
                }
            }
        }
    }
}

#[test]
fn test_strategies_agree_on_long_paths() {
    // Past the range cutoff the default strategy goes bidirectional;
    // both strategies must still report the same optimal cost.
    let board = random_board(Size::new(40, 30), 0x7777);
    let landmarks = build_landmarks(&board);

    let start = Coords::new(1, 1);
    let goal = Coords::new(38, 28);
    assert!(start.range(goal) > PathfinderConfig::default().range_cutoff);

    let expected = if board.is_passable(start) && board.is_passable(goal) {
        reference_dijkstra(&board, start, goal)
    } else {
        None
    };
    let by_default = solve(&board, &landmarks, SearchFlags::empty(), start, goal);
    let forced_uni = solve(&board, &landmarks, SearchFlags::FORCE_UNIDIRECTIONAL, start, goal);

    assert_eq!(by_default.as_ref().map(|path| path.total_cost()), expected);
    assert_eq!(forced_uni.as_ref().map(|path| path.total_cost()), expected);
}

#[test]
fn test_cancellation_is_honored() {
    let board = TestBoard::uniform(Size::new(30, 30), 1);
    let landmarks = build_landmarks(&board);

    let cancel = AtomicBool::new(true);
    let finder = Pathfinder::new(&board, &landmarks, PathfinderConfig::default())
        .with_cancel(&cancel);

    assert!(finder.find_path(Coords::new(0, 0), Coords::new(29, 29)).is_none());
}

#[test]
fn test_search_key_ordering() {
    let a = SearchKey { estimate: 3, preference: 9 };
    let b = SearchKey { estimate: 4, preference: 0 };
    let c = SearchKey { estimate: 4, preference: 2 };

    assert!(a < b);
    assert!(b < c);
}

#[test]
fn test_search_flags_display() {
    let flags = SearchFlags::FORCE_UNIDIRECTIONAL | SearchFlags::FORCE_BIDIRECTIONAL;
    assert_eq!(flags.to_string(), "FORCE_UNIDIRECTIONAL|FORCE_BIDIRECTIONAL");
    assert_eq!(SearchFlags::empty().to_string(), "<none>");
}
