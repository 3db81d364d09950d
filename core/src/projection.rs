//! Isometric coordinate transform between grid indices and the projected plane.
//!
//! Grid points are first laid out on a standard plane, where a cell at
//! `(row, column)` sits at `(-column * tile_height, row * tile_width)`, and are
//! then rotated onto the isometric basis. The basis is the 3×3 matrix that
//! sends the three named axes to their on-screen directions:
//!
//! ```text
//!                 vertical
//!                    |
//!                    x
//!                  /   \
//!              left     right
//! ```

use std::f32::consts::FRAC_PI_6;

use glam::{Mat2, Mat3, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Continuous position on the level grid, measured in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Row coordinate; whole values address row indices.
    pub row: f32,
    /// Column coordinate; whole values address column indices.
    pub column: f32,
}

impl GridPoint {
    /// Creates a grid point from row and column coordinates.
    #[must_use]
    pub const fn new(row: f32, column: f32) -> Self {
        Self { row, column }
    }

    /// Rounds both coordinates to the nearest whole cell.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self::new(self.row.round(), self.column.round())
    }

    /// Point shifted by the provided offset.
    #[must_use]
    pub fn offset_by(self, offset: GridPoint) -> Self {
        Self::new(self.row + offset.row, self.column + offset.column)
    }

    /// Point shifted against the provided offset.
    #[must_use]
    pub fn offset_against(self, offset: GridPoint) -> Self {
        Self::new(self.row - offset.row, self.column - offset.column)
    }

    /// Nearest cell with non-negative indices, if any.
    #[must_use]
    pub fn to_cell(self) -> Option<CellCoord> {
        let rounded = self.rounded();
        if !rounded.row.is_finite() || !rounded.column.is_finite() {
            return None;
        }
        if rounded.row < 0.0 || rounded.column < 0.0 {
            return None;
        }
        if rounded.row > u32::MAX as f32 || rounded.column > u32::MAX as f32 {
            return None;
        }
        Some(CellCoord::new(rounded.row as u32, rounded.column as u32))
    }
}

/// The three named axes of the isometric world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IsometricAxis {
    /// Points straight up the screen.
    Vertical,
    /// Points down and to the left.
    Left,
    /// Points down and to the right.
    Right,
}

impl IsometricAxis {
    /// Unit vector of the axis on the projected plane.
    #[must_use]
    pub fn vector(self) -> Vec2 {
        let axis = match self {
            Self::Vertical => Vec3::Z,
            Self::Right => Vec3::Y,
            Self::Left => Vec3::X,
        };
        isometric_basis().mul_vec3(axis).truncate()
    }
}

/// Matrix that carries standard-space vectors onto the isometric plane.
fn isometric_basis() -> Mat3 {
    let cos30 = FRAC_PI_6.cos();
    let cos60 = 0.5;
    Mat3::from_cols(
        Vec3::new(-cos30, -cos60, 0.0),
        Vec3::new(cos30, -cos60, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    )
}

/// Stateless mapping between grid points and projected plane positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsometricProjection {
    tile_width: f32,
    tile_height: f32,
    forward: Mat2,
    inverse: Mat2,
}

impl IsometricProjection {
    /// Tile edge length used by the shipped levels.
    pub const STANDARD_TILE_LENGTH: f32 = 80.0;

    /// Creates a projection for tiles of the provided dimensions.
    #[must_use]
    pub fn new(tile_width: f32, tile_height: f32) -> Self {
        let forward = Mat2::from_mat3(isometric_basis());
        Self {
            tile_width,
            tile_height,
            forward,
            inverse: forward.inverse(),
        }
    }

    /// Width of a single tile before projection.
    #[must_use]
    pub const fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Height of a single tile before projection.
    #[must_use]
    pub const fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Projects a grid point onto the isometric plane.
    #[must_use]
    pub fn project(&self, point: GridPoint) -> Vec2 {
        let standard = Vec2::new(
            -point.column * self.tile_height,
            point.row * self.tile_width,
        );
        self.forward.mul_vec2(standard)
    }

    /// Projects the cell onto the isometric plane.
    #[must_use]
    pub fn project_cell(&self, cell: CellCoord) -> Vec2 {
        self.project(cell.to_point())
    }

    /// Maps a plane position back onto the grid.
    ///
    /// With `rasterize` set the result is snapped to the nearest whole cell,
    /// which is what hit-testing needs. Without it the continuous value is
    /// returned.
    #[must_use]
    pub fn unproject(&self, position: Vec2, rasterize: bool) -> GridPoint {
        let standard = self.inverse.mul_vec2(position);
        let point = GridPoint::new(
            standard.y / self.tile_width,
            -standard.x / self.tile_height,
        );
        if rasterize {
            point.rounded()
        } else {
            point
        }
    }

    /// On-screen width of a projected tile.
    ///
    /// Measured as twice the horizontal reach of a tile edge laid along the
    /// left axis.
    #[must_use]
    pub fn projected_tile_width(&self) -> f32 {
        let left = IsometricAxis::Left.vector();
        let angle = Vec2::NEG_X.angle_between(left);
        2.0 * angle.cos() * self.tile_width
    }
}

impl Default for IsometricProjection {
    fn default() -> Self {
        Self::new(Self::STANDARD_TILE_LENGTH, Self::STANDARD_TILE_LENGTH)
    }
}

/// Axis-aligned rectangle on the projected plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRect {
    min: Vec2,
    max: Vec2,
}

impl ViewRect {
    /// Creates a rectangle from its lower-left origin and size.
    #[must_use]
    pub fn from_origin_and_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Creates a rectangle of the provided size centred on a point.
    #[must_use]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::from_origin_and_size(center - size * 0.5, size)
    }

    /// Lower-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner of the rectangle.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Rectangle shrunk by `margin` on every side.
    ///
    /// Insetting past the centre collapses the rectangle to its midpoint.
    #[must_use]
    pub fn inset(&self, margin: f32) -> Self {
        let center = (self.min + self.max) * 0.5;
        Self {
            min: (self.min + Vec2::splat(margin)).min(center),
            max: (self.max - Vec2::splat(margin)).max(center),
        }
    }

    /// Reports whether the two rectangles overlap with a positive area.
    #[must_use]
    pub fn intersects(&self, other: &ViewRect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}
