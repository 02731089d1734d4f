//! Hex grid coordinate math.
//!
//! # Responsibility
//! - Convert between axial cell coordinates and pixel positions.
//! - Resolve a pixel point to the nearest cell with deterministic ties.
//! - Expose neighbor and distance queries used for adjacency hints.
//!
//! # Invariants
//! - `pixel_to_cell(cell_center(p)) == p` for every position `p`.
//! - Points on a shared cell boundary resolve to the lexicographically smallest
//!   `(q, r)` among the tied cells, on every call.
//! - Pure functions of the grid config; no interior state changes after `new`.
//! - Centers are computed in `f64`, so the round trip holds across the whole
//!   `i32` coordinate range.
//! - Neighbor and ring queries skip cells whose coordinates leave `i32`.

use crate::config::{GridConfig, GridOrientation};
use crate::model::placement::HexPosition;
use hexx::{Hex, HexLayout, HexOrientation};
use serde::{Deserialize, Serialize};

/// Relative width of the band (in squared hex sizes) treated as a boundary tie.
const TIE_TOLERANCE: f64 = 1e-4;

/// Pixel coordinate on the drop surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy)]
struct Axis {
    x: f64,
    y: f64,
}

/// Layout-bound hex geometry for one map session.
#[derive(Debug, Clone)]
pub struct HexGeometry {
    origin: Axis,
    q_axis: Axis,
    r_axis: Axis,
    determinant: f64,
    tie_tolerance: f64,
}

impl HexGeometry {
    /// Builds geometry from a grid config.
    ///
    /// The config is expected to be validated (`GridConfig::validate`).
    pub fn new(config: &GridConfig) -> Self {
        let mut layout = HexLayout::default();
        layout.orientation = match config.orientation {
            GridOrientation::Pointy => HexOrientation::Pointy,
            GridOrientation::Flat => HexOrientation::Flat,
        };
        layout.scale *= config.hex_size;

        let zero = layout.hex_to_world_pos(Hex::ZERO);
        let unit_q = layout.hex_to_world_pos(Hex::new(1, 0));
        let unit_r = layout.hex_to_world_pos(Hex::new(0, 1));
        let q_axis = Axis {
            x: f64::from(unit_q.x - zero.x),
            y: f64::from(unit_q.y - zero.y),
        };
        let r_axis = Axis {
            x: f64::from(unit_r.x - zero.x),
            y: f64::from(unit_r.y - zero.y),
        };
        let size = f64::from(config.hex_size);

        Self {
            origin: Axis {
                x: f64::from(config.origin_x) + f64::from(zero.x),
                y: f64::from(config.origin_y) + f64::from(zero.y),
            },
            q_axis,
            r_axis,
            determinant: q_axis.x * r_axis.y - r_axis.x * q_axis.y,
            tie_tolerance: TIE_TOLERANCE * size * size,
        }
    }

    /// Pixel center of a cell.
    pub fn cell_center(&self, position: HexPosition) -> PixelPoint {
        let q = f64::from(position.q);
        let r = f64::from(position.r);
        PixelPoint {
            x: self.origin.x + q * self.q_axis.x + r * self.r_axis.x,
            y: self.origin.y + q * self.q_axis.y + r * self.r_axis.y,
        }
    }

    /// Resolves a pixel point to the cell whose center is nearest.
    ///
    /// Uses cube rounding, then settles exact boundary ties in favor of the
    /// lexicographically smallest `(q, r)`.
    pub fn pixel_to_cell(&self, point: PixelPoint) -> HexPosition {
        debug_assert!(point.is_finite(), "pixel point must be finite");
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        let fq = (dx * self.r_axis.y - dy * self.r_axis.x) / self.determinant;
        let fr = (self.q_axis.x * dy - self.q_axis.y * dx) / self.determinant;

        let rounded = cube_round(fq, fr);
        self.settle_tie(rounded, dx, dy)
    }

    /// Axial neighbors of `position`, in hexx direction order.
    ///
    /// Six cells, fewer at the edge of the `i32` coordinate range.
    pub fn neighbors(position: HexPosition) -> Vec<HexPosition> {
        Hex::NEIGHBORS_COORDS
            .iter()
            .filter_map(|step| position.checked_offset(i64::from(step.x), i64::from(step.y)))
            .collect()
    }

    /// Number of cell steps between two positions.
    pub fn distance(a: HexPosition, b: HexPosition) -> u64 {
        let dq = i64::from(b.q) - i64::from(a.q);
        let dr = i64::from(b.r) - i64::from(a.r);
        (dq.unsigned_abs() + dr.unsigned_abs() + (dq + dr).unsigned_abs()) / 2
    }

    /// Cells exactly `radius` steps from `center`, in `(q, r)` order.
    pub fn ring(center: HexPosition, radius: u32) -> Vec<HexPosition> {
        if radius == 0 {
            return vec![center];
        }
        let span = i64::from(radius);
        let mut cells = Vec::with_capacity(6 * radius as usize);
        for dq in -span..=span {
            for dr in -span..=span {
                let Some(cell) = center.checked_offset(dq, dr) else {
                    continue;
                };
                if Self::distance(center, cell) == span.unsigned_abs() {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    fn settle_tie(&self, rounded: HexPosition, dx: f64, dy: f64) -> HexPosition {
        let best_distance = self.squared_distance(rounded, dx, dy);
        let mut best = rounded;
        for candidate in Self::neighbors(rounded) {
            let distance = self.squared_distance(candidate, dx, dy);
            if (distance - best_distance).abs() <= self.tie_tolerance && candidate < best {
                best = candidate;
            }
        }
        best
    }

    fn squared_distance(&self, cell: HexPosition, dx: f64, dy: f64) -> f64 {
        let q = f64::from(cell.q);
        let r = f64::from(cell.r);
        let cx = q * self.q_axis.x + r * self.r_axis.x;
        let cy = q * self.q_axis.y + r * self.r_axis.y;
        (dx - cx).powi(2) + (dy - cy).powi(2)
    }
}

/// Standard cube rounding over fractional axial coordinates.
fn cube_round(fq: f64, fr: f64) -> HexPosition {
    let fs = -fq - fr;
    let mut q = fq.round();
    let mut r = fr.round();
    let s = fs.round();

    let q_diff = (q - fq).abs();
    let r_diff = (r - fr).abs();
    let s_diff = (s - fs).abs();

    if q_diff > r_diff && q_diff > s_diff {
        q = -r - s;
    } else if r_diff > s_diff {
        r = -q - s;
    }

    // Saturates outside the i32 range.
    HexPosition::new(q as i32, r as i32)
}
