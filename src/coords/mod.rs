use serde::{Deserialize, Serialize};
use strum::EnumCount;
use strum_macros::{Display, EnumCount, EnumIter};


// Useful references and reading material:
//  https://www.redblobgames.com/grids/hexagons/
//  https://www.redblobgames.com/grids/hexagons/implementation.html

// ----------------------------------------------
// Hexside
// ----------------------------------------------

// The six directions connecting a hex cell to its neighbours,
// for pointy-top hexes laid out in offset rows.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, Serialize, Deserialize)]
pub enum Hexside {
    NorthEast,
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
}

pub const HEXSIDE_COUNT: usize = Hexside::COUNT;

impl Hexside {
    // The opposite side; an involution (reversed(reversed(h)) == h).
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Self::NorthEast => Self::SouthWest,
            Self::East      => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::SouthWest => Self::NorthEast,
            Self::West      => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    // Unit step in the canonical (oblique) basis.
    #[inline]
    pub const fn canon_delta(self) -> (i32, i32) {
        match self {
            Self::NorthEast => ( 1, -1),
            Self::East      => ( 1,  0),
            Self::SouthEast => ( 0,  1),
            Self::SouthWest => (-1,  1),
            Self::West      => (-1,  0),
            Self::NorthWest => ( 0, -1),
        }
    }
}

// ----------------------------------------------
// CanonCoords
// ----------------------------------------------

// Coordinates in the canonical basis: two axes at 120 degrees, which makes
// neighbour steps uniform across rows and gives an O(1) hex distance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonCoords {
    pub q: i32,
    pub r: i32,
}

impl CanonCoords {
    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
}

impl std::fmt::Display for CanonCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "<{},{}>", self.q, self.r)
    }
}

// ----------------------------------------------
// Coords
// ----------------------------------------------

// X,Y position in the rectangular (user) basis of the board grid.
// Equality and hashing are defined on this basis; the canonical basis
// is an exact integer transform of it, so the two always agree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    // Rectangular -> canonical. Odd rows are shifted half a cell right,
    // which the oblique q axis absorbs exactly.
    #[inline]
    pub const fn canonical(self) -> CanonCoords {
        CanonCoords::new(self.x - (self.y - (self.y & 1)) / 2, self.y)
    }

    // Canonical -> rectangular; exact inverse of canonical().
    #[inline]
    pub const fn from_canonical(canon: CanonCoords) -> Self {
        Self::new(canon.q + (canon.r - (canon.r & 1)) / 2, canon.r)
    }

    // The adjacent cell through the given hexside. Unbounded; board
    // layers decide whether the result is on the board.
    #[inline]
    pub fn neighbour(self, hexside: Hexside) -> Self {
        let canon = self.canonical();
        let (dq, dr) = hexside.canon_delta();
        Self::from_canonical(CanonCoords::new(canon.q + dq, canon.r + dr))
    }

    // Hex distance: the minimum number of hexside steps between two cells.
    #[inline]
    pub fn range(self, other: Self) -> i32 {
        let a = self.canonical();
        let b = other.canonical();
        let dq = a.q - b.q;
        let dr = a.r - b.r;
        (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
    }

    // Absolute cross product of (origin -> target) with (origin -> self)
    // in the canonical basis. Zero for cells on the direct line, growing
    // with sideways deviation; used as a low-order search tie-break so
    // equal-cost candidates prefer the straightest path.
    #[inline]
    pub fn cross_deviation(self, origin: Self, target: Self) -> i32 {
        let o = origin.canonical();
        let t = target.canonical();
        let s = self.canonical();
        let direct = (t.q - o.q, t.r - o.r);
        let walked = (s.q - o.q, s.r - o.r);
        let cross = (direct.0 as i64) * (walked.1 as i64) - (direct.1 as i64) * (walked.0 as i64);
        cross.unsigned_abs().min(i32::MAX as u64) as i32
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}
