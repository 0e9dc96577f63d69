//! Spatial hash grid for neighborhood queries on the field
//!
//! Divides the field into square cells and stores entries in each cell.
//! Radius queries only visit the cells that can contain a match. On a toroidal
//! field cell coordinates wrap, so a query near one edge also visits the cells
//! along the opposite edge.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::game::topology::Topology;
use crate::util::vec2::Vec2;

/// Initial capacity for grid cells (number of expected non-empty cells)
const GRID_INITIAL_CAPACITY: usize = 256;

/// Initial capacity for entry vectors within cells
const CELL_INITIAL_CAPACITY: usize = 8;

/// Grid cell key - (x, y) cell coordinates
pub type CellKey = (i32, i32);

/// Entry stored in the grid: an entity handle and its (wrapped) position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEntry<T> {
    pub id: T,
    pub position: Vec2,
}

/// Spatial hash grid keyed by cell, generic over the stored handle type
#[derive(Debug, Clone)]
pub struct SpatialGrid<T> {
    /// Inverse cell size for fast position-to-cell conversion
    inv_cell_size: f32,
    topology: Topology,
    /// Number of cell columns/rows covering the field
    columns: i32,
    rows: i32,
    cells: HashMap<CellKey, Vec<GridEntry<T>>>,
    len: usize,
}

impl<T: Copy + PartialEq> SpatialGrid<T> {
    pub fn new(cell_size: f32, topology: Topology) -> Self {
        let size = topology.size();
        Self {
            inv_cell_size: 1.0 / cell_size,
            topology,
            columns: ((size.x / cell_size).ceil() as i32).max(1),
            rows: ((size.y / cell_size).ceil() as i32).max(1),
            cells: HashMap::with_capacity(GRID_INITIAL_CAPACITY),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Convert world position to cell key
    #[inline]
    fn position_to_cell(&self, position: Vec2) -> CellKey {
        let position = self.topology.wrap(position);
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }

    #[inline]
    fn normalize_cell(&self, (cx, cy): CellKey) -> CellKey {
        if self.topology.wraps() {
            (cx.rem_euclid(self.columns), cy.rem_euclid(self.rows))
        } else {
            (cx, cy)
        }
    }

    /// Insert an entry into the grid
    #[inline]
    pub fn insert(&mut self, id: T, position: Vec2) {
        let cell_key = self.position_to_cell(position);
        self.cells
            .entry(cell_key)
            .or_insert_with(|| Vec::with_capacity(CELL_INITIAL_CAPACITY))
            .push(GridEntry { id, position });
        self.len += 1;
    }

    /// Remove one entry matching both handle and position
    /// Returns true if the entry was found and removed
    pub fn remove(&mut self, id: T, position: Vec2) -> bool {
        let cell_key = self.position_to_cell(position);
        if let Some(cell) = self.cells.get_mut(&cell_key) {
            if let Some(idx) = cell
                .iter()
                .position(|entry| entry.id == id && entry.position == position)
            {
                cell.swap_remove(idx);
                self.len -= 1;
                return true;
            }
        }
        false
    }

    /// Inclusive cell span along one axis, `reach` cells either side of `center`
    ///
    /// Wrapped axes never list a cell twice: once the span covers the whole
    /// axis every column (row) is returned exactly once. Bounded axes are cut
    /// to the grid extent. Large or infinite `reach` stays in f32 until clamped.
    #[inline]
    fn axis_span(&self, center: i32, reach: f32, count: i32) -> (i32, i32) {
        if self.topology.wraps() {
            if reach * 2.0 + 1.0 >= count as f32 {
                (0, count - 1)
            } else {
                let reach = reach as i32;
                (center - reach, center + reach)
            }
        } else {
            let low = (center as f32 - reach).max(0.0) as i32;
            let high = (center as f32 + reach).min(count as f32) as i32;
            (low, high)
        }
    }

    /// Cells that may hold entries within `radius` of `position`, each listed once
    fn cells_in_radius(&self, position: Vec2, radius: f32) -> SmallVec<[CellKey; 16]> {
        let (cx, cy) = self.position_to_cell(position);
        // One extra ring covers the narrower last column/row of a wrapped field
        let reach = (radius * self.inv_cell_size).ceil() + 1.0;
        let (x_low, x_high) = self.axis_span(cx, reach, self.columns);
        let (y_low, y_high) = self.axis_span(cy, reach, self.rows);

        let mut keys: SmallVec<[CellKey; 16]> = SmallVec::new();
        for x in x_low..=x_high {
            for y in y_low..=y_high {
                keys.push(self.normalize_cell((x, y)));
            }
        }
        keys
    }

    /// Query entries that may lie within `radius` of `position`
    ///
    /// Candidates are a superset of the true matches: callers filter by exact
    /// distance. Every entry is yielded at most once.
    pub fn query_radius(&self, position: Vec2, radius: f32) -> impl Iterator<Item = &GridEntry<T>> + '_ {
        self.cells_in_radius(position, radius)
            .into_iter()
            .flat_map(move |cell_key| self.cells.get(&cell_key).into_iter().flat_map(|cell| cell.iter()))
    }

    /// Get statistics about the grid
    pub fn stats(&self) -> SpatialGridStats {
        let non_empty_cells = self.cells.values().filter(|c| !c.is_empty()).count();
        let max_per_cell = self.cells.values().map(|c| c.len()).max().unwrap_or(0);

        SpatialGridStats {
            non_empty_cells,
            total_entries: self.len,
            max_per_cell,
        }
    }
}

/// Statistics about the spatial grid
#[derive(Debug, Clone)]
pub struct SpatialGridStats {
    pub non_empty_cells: usize,
    pub total_entries: usize,
    pub max_per_cell: usize,
}
