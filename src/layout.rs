//! Marker grid layout.
//!
//! Markers are placed on the smallest square-ish grid that holds them:
//! `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`, filled row-major.
//! Columns span the world width minus a border margin on each side and are
//! evenly spaced; a single column (or row) sits on the centre line.
//! Unused trailing cells stay empty.

use crate::types::{SceneConfig, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    /// Distance between adjacent columns (0 with a single column).
    pub spacing_x: f32,
    /// Distance between adjacent rows (0 with a single row).
    pub spacing_y: f32,
    /// One position per marker, in input order.
    pub positions: Vec<Vec2>,
}

impl GridLayout {
    /// Smallest distance between two adjacent occupied cells.
    pub fn min_spacing(&self) -> Option<f32> {
        match (self.cols > 1, self.rows > 1) {
            (true, true) => Some(self.spacing_x.min(self.spacing_y)),
            (true, false) => Some(self.spacing_x),
            (false, true) => Some(self.spacing_y),
            (false, false) => None,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

/// Grid dimensions `(cols, rows)` for `count` markers.
pub fn grid_dims(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    (cols, rows)
}

/// Compute marker positions for `count` markers. Pure and deterministic.
pub fn compute(count: usize, config: &SceneConfig) -> GridLayout {
    let (cols, rows) = grid_dims(count);
    let spacing_x = axis_spacing(cols, config.width, config.margin);
    let spacing_y = axis_spacing(rows, config.height, config.margin);

    let positions = (0..count)
        .map(|i| {
            let col = i % cols;
            let row = i / cols;
            Vec2::new(
                axis_position(col, cols, spacing_x, config.width, config.margin),
                axis_position(row, rows, spacing_y, config.height, config.margin),
            )
        })
        .collect();

    GridLayout {
        cols,
        rows,
        spacing_x,
        spacing_y,
        positions,
    }
}

fn axis_spacing(cells: usize, extent: f32, margin: f32) -> f32 {
    if cells <= 1 {
        0.0
    } else {
        (extent - 2.0 * margin).max(0.0) / (cells - 1) as f32
    }
}

fn axis_position(index: usize, cells: usize, spacing: f32, extent: f32, margin: f32) -> f32 {
    if cells <= 1 {
        extent / 2.0
    } else {
        margin + index as f32 * spacing
    }
}
