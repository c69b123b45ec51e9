use rayon::prelude::*;

use crate::{
    coords::Coords,
    utils::Size
};


// ----------------------------------------------
// BoardStorage
// ----------------------------------------------

// Dense container mapping a board coordinate to a cell value.
// `is_onboard()` is the sole gate for all accesses: off-board reads
// yield the default value and off-board writes are no-ops.
pub trait BoardStorage<T> {
    fn extent(&self) -> Size;

    fn try_get(&self, coords: Coords) -> Option<&T>;
    fn try_get_mut(&mut self, coords: Coords) -> Option<&mut T>;

    #[inline]
    fn is_onboard(&self, coords: Coords) -> bool {
        let extent = self.extent();
        coords.x >= 0 && coords.x < extent.width &&
        coords.y >= 0 && coords.y < extent.height
    }

    #[inline]
    fn get(&self, coords: Coords) -> T
        where T: Clone + Default
    {
        self.try_get(coords).cloned().unwrap_or_default()
    }

    #[inline]
    fn set(&mut self, coords: Coords, value: T) {
        if let Some(cell) = self.try_get_mut(coords) {
            *cell = value;
        }
    }

    // Visits every on-board cell exactly once. Traversal order is
    // layout-specific (row-major for flat storage, tile-major for
    // blocked storage).
    fn for_each<F>(&self, action: F)
        where F: FnMut(Coords, &T);

    fn for_each_filtered<P, F>(&self, predicate: P, action: F)
        where P: Fn(Coords, &T) -> bool,
              F: FnMut(Coords, &T)
    {
        let mut action = action;
        self.for_each(|coords, value| {
            if predicate(coords, value) {
                action(coords, value);
            }
        });
    }

    fn par_for_each<F>(&self, action: F)
        where T: Sync,
              F: Fn(Coords, &T) + Sync;

    fn par_for_each_filtered<P, F>(&self, predicate: P, action: F)
        where T: Sync,
              P: Fn(Coords, &T) -> bool + Sync,
              F: Fn(Coords, &T) + Sync
    {
        self.par_for_each(|coords, value| {
            if predicate(coords, value) {
                action(coords, value);
            }
        });
    }
}

// ----------------------------------------------
// FlatBoardStorage
// ----------------------------------------------

// Row-major single-allocation layout. Simplest and fastest for boards
// whose whole row set stays cache-resident.
pub struct FlatBoardStorage<T> {
    extent: Size,
    cells: Vec<T>, // WxH cells.
}

impl<T> FlatBoardStorage<T> {
    pub fn new<F>(extent: Size, mut init: F) -> Self
        where F: FnMut(Coords) -> T
    {
        debug_assert!(extent.is_valid());
        let mut cells = Vec::with_capacity(extent.cell_count());
        for y in 0..extent.height {
            for x in 0..extent.width {
                cells.push(init(Coords::new(x, y)));
            }
        }
        Self { extent, cells }
    }

    // Builds one row per rayon task; rows are disjoint, so the
    // initializer only needs to be reentrant, never synchronized.
    pub fn new_parallel<F>(extent: Size, init: F) -> Self
        where T: Send,
              F: Fn(Coords) -> T + Sync
    {
        debug_assert!(extent.is_valid());
        let init = &init;
        let cells = (0..extent.height)
            .into_par_iter()
            .flat_map_iter(move |y: i32| {
                (0..extent.width).map(move |x| init(Coords::new(x, y)))
            })
            .collect();
        Self { extent, cells }
    }

    #[inline]
    fn cell_index(&self, coords: Coords) -> usize {
        (coords.y * self.extent.width + coords.x) as usize
    }
}

impl<T> BoardStorage<T> for FlatBoardStorage<T> {
    #[inline]
    fn extent(&self) -> Size {
        self.extent
    }

    #[inline]
    fn try_get(&self, coords: Coords) -> Option<&T> {
        if !self.is_onboard(coords) {
            return None;
        }
        Some(&self.cells[self.cell_index(coords)])
    }

    #[inline]
    fn try_get_mut(&mut self, coords: Coords) -> Option<&mut T> {
        if !self.is_onboard(coords) {
            return None;
        }
        let index = self.cell_index(coords);
        Some(&mut self.cells[index])
    }

    fn for_each<F>(&self, mut action: F)
        where F: FnMut(Coords, &T)
    {
        for (index, value) in self.cells.iter().enumerate() {
            let coords = Coords::new(index as i32 % self.extent.width,
                                     index as i32 / self.extent.width);
            action(coords, value);
        }
    }

    fn par_for_each<F>(&self, action: F)
        where T: Sync,
              F: Fn(Coords, &T) + Sync
    {
        self.cells
            .par_chunks(self.extent.width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, value) in row.iter().enumerate() {
                    action(Coords::new(x as i32, y as i32), value);
                }
            });
    }
}

// ----------------------------------------------
// BlockedBoardStorage
// ----------------------------------------------

pub const BLOCK_DIM: i32 = 32;
pub const BLOCK_CELLS: usize = (BLOCK_DIM * BLOCK_DIM) as usize;

// 32x32-tiled layout. Searches and landmark flood-fills touch tight
// neighbourhoods, so keeping a tile contiguous keeps the working set
// within a handful of cache lines on large boards.
//
// Boards that are not a multiple of 32 get padding cells inside the
// border tiles; padding holds `T::default()` and the initializer is
// never invoked for it.
pub struct BlockedBoardStorage<T> {
    extent: Size,
    blocks_per_row: i32,
    blocks: Vec<Vec<T>>, // Each BLOCK_CELLS cells.
}

impl<T: Default> BlockedBoardStorage<T> {
    pub fn new<F>(extent: Size, mut init: F) -> Self
        where F: FnMut(Coords) -> T
    {
        debug_assert!(extent.is_valid());
        let (blocks_per_row, block_count) = Self::block_layout(extent);

        let mut blocks = Vec::with_capacity(block_count);
        for block_index in 0..block_count {
            blocks.push(Self::build_block(extent, blocks_per_row, block_index, &mut init));
        }

        Self { extent, blocks_per_row, blocks }
    }

    // One rayon task per tile; tiles are disjoint.
    pub fn new_parallel<F>(extent: Size, init: F) -> Self
        where T: Send,
              F: Fn(Coords) -> T + Sync
    {
        debug_assert!(extent.is_valid());
        let (blocks_per_row, block_count) = Self::block_layout(extent);

        let init = &init;
        let blocks = (0..block_count)
            .into_par_iter()
            .map(move |block_index| {
                let mut init = init;
                Self::build_block(extent, blocks_per_row, block_index, &mut init)
            })
            .collect();

        Self { extent, blocks_per_row, blocks }
    }

    #[inline]
    fn block_layout(extent: Size) -> (i32, usize) {
        let blocks_per_row = (extent.width + BLOCK_DIM - 1) / BLOCK_DIM;
        let block_rows = (extent.height + BLOCK_DIM - 1) / BLOCK_DIM;
        (blocks_per_row, (blocks_per_row * block_rows) as usize)
    }

    fn build_block<F>(extent: Size, blocks_per_row: i32, block_index: usize, init: &mut F) -> Vec<T>
        where F: FnMut(Coords) -> T
    {
        let base_x = (block_index as i32 % blocks_per_row) * BLOCK_DIM;
        let base_y = (block_index as i32 / blocks_per_row) * BLOCK_DIM;

        let mut cells = Vec::with_capacity(BLOCK_CELLS);
        for row in 0..BLOCK_DIM {
            for col in 0..BLOCK_DIM {
                let coords = Coords::new(base_x + col, base_y + row);
                if coords.x < extent.width && coords.y < extent.height {
                    cells.push(init(coords));
                } else {
                    cells.push(T::default()); // tile padding
                }
            }
        }
        cells
    }

    #[inline]
    fn cell_address(&self, coords: Coords) -> (usize, usize) {
        let block = (coords.y / BLOCK_DIM) * self.blocks_per_row + (coords.x / BLOCK_DIM);
        let offset = (coords.y % BLOCK_DIM) * BLOCK_DIM + (coords.x % BLOCK_DIM);
        (block as usize, offset as usize)
    }

    #[inline]
    fn block_base(&self, block_index: usize) -> Coords {
        Coords::new((block_index as i32 % self.blocks_per_row) * BLOCK_DIM,
                    (block_index as i32 / self.blocks_per_row) * BLOCK_DIM)
    }
}

impl<T: Default> BoardStorage<T> for BlockedBoardStorage<T> {
    #[inline]
    fn extent(&self) -> Size {
        self.extent
    }

    #[inline]
    fn try_get(&self, coords: Coords) -> Option<&T> {
        if !self.is_onboard(coords) {
            return None;
        }
        let (block, offset) = self.cell_address(coords);
        Some(&self.blocks[block][offset])
    }

    #[inline]
    fn try_get_mut(&mut self, coords: Coords) -> Option<&mut T> {
        if !self.is_onboard(coords) {
            return None;
        }
        let (block, offset) = self.cell_address(coords);
        Some(&mut self.blocks[block][offset])
    }

    fn for_each<F>(&self, mut action: F)
        where F: FnMut(Coords, &T)
    {
        for (block_index, block) in self.blocks.iter().enumerate() {
            let base = self.block_base(block_index);
            for (offset, value) in block.iter().enumerate() {
                let coords = Coords::new(base.x + offset as i32 % BLOCK_DIM,
                                         base.y + offset as i32 / BLOCK_DIM);
                if self.is_onboard(coords) {
                    action(coords, value);
                }
            }
        }
    }

    fn par_for_each<F>(&self, action: F)
        where T: Sync,
              F: Fn(Coords, &T) + Sync
    {
        self.blocks
            .par_iter()
            .enumerate()
            .for_each(|(block_index, block)| {
                let base = self.block_base(block_index);
                for (offset, value) in block.iter().enumerate() {
                    let coords = Coords::new(base.x + offset as i32 % BLOCK_DIM,
                                             base.y + offset as i32 / BLOCK_DIM);
                    if self.is_onboard(coords) {
                        action(coords, value);
                    }
                }
            });
    }
}
