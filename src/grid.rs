//! Cost grid sink: a 2D array of per-cell traversal costs.
//!
//! The grid is owned by the hosting navigation stack; this layer only writes
//! values into it and asks it to convert world coordinates to cell indices.

use serde::{Deserialize, Serialize};

/// Cost values shared with the rest of the navigation stack.
pub mod costs {
    /// Safe to traverse, no penalty
    pub const FREE: u8 = 0;
    /// Within robot radius, should avoid
    pub const INSCRIBED: u8 = 253;
    /// Obstacle, blocked
    pub const LETHAL: u8 = 254;
    /// Never observed
    pub const NO_INFORMATION: u8 = 255;
}

/// Integer cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    /// Cell X index
    pub x: i32,
    /// Cell Y index
    pub y: i32,
}

impl GridCoord {
    /// Create a new coordinate.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A 2D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
}

impl WorldPoint {
    /// Origin point.
    pub const ZERO: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D cost grid with a resolution and an origin mapping world coordinates to
/// cell indices.
///
/// Row-major storage: `index = y * width + x`. Cell (0, 0) spans
/// `[origin, origin + resolution)` on both axes.
#[derive(Debug, Clone)]
pub struct CostGrid {
    width: usize,
    height: usize,
    resolution: f32,
    origin: WorldPoint,
    default_value: u8,
    cells: Vec<u8>,
}

impl CostGrid {
    /// Create a grid of `width` x `height` cells filled with
    /// [`costs::NO_INFORMATION`].
    pub fn new(width: usize, height: usize, resolution: f32, origin: WorldPoint) -> Self {
        Self {
            width,
            height,
            resolution,
            origin,
            default_value: costs::NO_INFORMATION,
            cells: vec![costs::NO_INFORMATION; width * height],
        }
    }

    /// Grid dimensions in cells.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Resolution in meters per cell.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// World coordinate of cell (0, 0)'s lower-left corner.
    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Set the value used by [`reset_to_default`](Self::reset_to_default) and
    /// [`resize_to_match`](Self::resize_to_match).
    pub fn set_default_value(&mut self, value: u8) {
        self.default_value = value;
    }

    /// Fill every cell with the default value.
    pub fn reset_to_default(&mut self) {
        self.cells.fill(self.default_value);
    }

    /// Adopt another grid's dimensions, resolution, and origin, refilling
    /// with the default value.
    pub fn resize_to_match(&mut self, other: &CostGrid) {
        self.width = other.width;
        self.height = other.height;
        self.resolution = other.resolution;
        self.origin = other.origin;
        self.cells = vec![self.default_value; self.width * self.height];
    }

    /// Convert a world coordinate to a cell coordinate.
    ///
    /// Returns `None` when the coordinate lies outside the grid.
    #[inline]
    pub fn world_to_cell(&self, wx: f32, wy: f32) -> Option<GridCoord> {
        let dx = wx - self.origin.x;
        let dy = wy - self.origin.y;
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        let x = (dx / self.resolution) as i32;
        let y = (dy / self.resolution) as i32;
        if x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(GridCoord::new(x, y))
    }

    /// World coordinate of a cell's center.
    #[inline]
    pub fn cell_to_world(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f32 + 0.5) * self.resolution,
        )
    }

    /// Linear index of a cell.
    ///
    /// The coordinate must come from a successful
    /// [`world_to_cell`](Self::world_to_cell) conversion.
    #[inline]
    pub fn cell_index(&self, coord: GridCoord) -> usize {
        coord.y as usize * self.width + coord.x as usize
    }

    /// Cost at a cell. Returns the default value outside the grid.
    #[inline]
    pub fn cost(&self, coord: GridCoord) -> u8 {
        if coord.x < 0
            || coord.y < 0
            || coord.x >= self.width as i32
            || coord.y >= self.height as i32
        {
            return self.default_value;
        }
        self.cells[self.cell_index(coord)]
    }

    /// Set the cost at a cell. Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn set_cost(&mut self, coord: GridCoord, cost: u8) {
        if coord.x >= 0
            && coord.y >= 0
            && coord.x < self.width as i32
            && coord.y < self.height as i32
        {
            let index = self.cell_index(coord);
            self.cells[index] = cost;
        }
    }

    /// Raw per-cell cost buffer.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Writable per-cell cost buffer.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }
}
