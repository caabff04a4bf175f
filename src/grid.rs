// Regular grid generation
//
// Used when no explicit area file is supplied: the areas are synthesized as
// an n-by-n grid of equal rectangular cells covering the bounding box of all
// input points (base and test combined).

use crate::area::Area;
use geo::{LineString, Point, Polygon};

// ============================================================================
// GRID CELLS
// ============================================================================

/// An axis-aligned rectangular cell in a regular grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Cell {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Build the polygon boundary for this cell.
    ///
    /// The ring runs LL -> UL -> UR -> LR and closes back on LL.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.min_x, self.min_y),
                (self.min_x, self.max_y),
                (self.max_x, self.max_y),
                (self.max_x, self.min_y),
                (self.min_x, self.min_y),
            ]),
            vec![],
        )
    }
}

// ============================================================================
// BOUNDING BOX & GRID CONSTRUCTION
// ============================================================================

/// Axis-aligned bounding box of a set of points.
///
/// An empty input yields a degenerate zero-extent box at the origin. A set
/// of identical points yields a zero-extent box at that point; grid cells
/// built over it are legitimately zero-area.
pub fn bounding_box(points: &[Point<f64>]) -> Cell {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Cell::new(0.0, 0.0, 0.0, 0.0);
    };
    let (mut min_x, mut min_y) = (first.x(), first.y());
    let (mut max_x, mut max_y) = (first.x(), first.y());
    for p in iter {
        min_x = min_x.min(p.x());
        max_x = max_x.max(p.x());
        min_y = min_y.min(p.y());
        max_y = max_y.max(p.y());
    }
    Cell::new(min_x, min_y, max_x, max_y)
}

/// Partition the bounding box of `points` into a `size` x `size` grid of
/// equal cells, each becoming an `Area` with an empty attribute record.
///
/// Cell ids come from a counter owned by this invocation; cells are built
/// column by column (x index outer, y index inner), so id = x * size + y.
pub fn regular_grid(size: usize, points: &[Point<f64>]) -> Vec<Area> {
    let bbox = bounding_box(points);
    let cell_width = bbox.width() / size as f64;
    let cell_height = bbox.height() / size as f64;

    let mut next_id: u64 = 0;
    let mut areas = Vec::with_capacity(size * size);
    for i in 0..size {
        for j in 0..size {
            let min_x = bbox.min_x + i as f64 * cell_width;
            let min_y = bbox.min_y + j as f64 * cell_height;
            let cell = Cell::new(min_x, min_y, min_x + cell_width, min_y + cell_height);
            let mut area = Area::new(cell.to_polygon());
            area.id = Some(next_id);
            next_id += 1;
            areas.push(area);
        }
    }
    areas
}
