#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative, immutable level model for Isometric Dimension.
//!
//! Raw level maps are decoded by [`decode`] into a [`LoadedLevel`]. A loaded
//! level never changes after construction, so the simulation and rendering
//! collaborators may share it freely for the lifetime of a run.

pub mod config;
mod decode;

use std::collections::BTreeMap;

use iso_dimension_core::{BlockKind, BlockStyle, CellCoord, FacingDirection, GridPoint};

pub use decode::{decode, decode_map};

/// Dimensions of a decoded tile grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    rows: u32,
    columns: u32,
}

impl GridSize {
    /// Creates a new size descriptor.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid, i.e. the longest decoded row.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() < self.rows && cell.column() < self.columns {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Dense mapping from grid cells to the blocks placed on them.
///
/// Empty cells and cells past the end of a short row hold no block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    size: GridSize,
    cells: Vec<Option<BlockKind>>,
}

impl TileGrid {
    pub(crate) fn from_rows(rows: Vec<Vec<BlockKind>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let size = GridSize::new(
            u32::try_from(rows.len()).unwrap_or(u32::MAX),
            u32::try_from(columns).unwrap_or(u32::MAX),
        );
        let mut cells = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            let padding = columns - row.len();
            cells.extend(
                row.into_iter()
                    .map(|kind| if kind.is_solid() { Some(kind) } else { None }),
            );
            cells.extend(std::iter::repeat(None).take(padding));
        }
        Self { size, cells }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Block placed at the provided cell, if any.
    #[must_use]
    pub fn block_at(&self, cell: CellCoord) -> Option<BlockKind> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Iterates every placed block in row-major order.
    pub fn blocks(&self) -> impl Iterator<Item = (CellCoord, BlockKind)> + '_ {
        let columns = self.size.columns.max(1);
        self.cells.iter().enumerate().filter_map(move |(index, kind)| {
            let kind = (*kind)?;
            let index = u32::try_from(index).ok()?;
            Some((CellCoord::new(index / columns, index % columns), kind))
        })
    }
}

/// Pair of portal locations that teleport onto each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TeleportLink {
    first: CellCoord,
    second: CellCoord,
}

impl TeleportLink {
    /// Links two portal locations.
    #[must_use]
    pub const fn new(first: CellCoord, second: CellCoord) -> Self {
        Self { first, second }
    }

    /// Both linked locations in discovery order.
    #[must_use]
    pub const fn locations(&self) -> [CellCoord; 2] {
        [self.first, self.second]
    }

    /// Location paired with the provided one, or `None` when the location is
    /// not part of the link.
    #[must_use]
    pub fn paired(&self, location: CellCoord) -> Option<CellCoord> {
        if location == self.first {
            Some(self.second)
        } else if location == self.second {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Validated, immutable level produced by the decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedLevel {
    grid: TileGrid,
    start: CellCoord,
    finish: CellCoord,
    teleports: BTreeMap<BlockStyle, TeleportLink>,
    initial_direction: FacingDirection,
}

impl LoadedLevel {
    pub(crate) fn new(
        grid: TileGrid,
        start: CellCoord,
        finish: CellCoord,
        teleports: BTreeMap<BlockStyle, TeleportLink>,
        initial_direction: FacingDirection,
    ) -> Self {
        Self {
            grid,
            start,
            finish,
            teleports,
            initial_direction,
        }
    }

    /// Tile grid holding every decoded block.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Bounding size of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.grid.size()
    }

    /// The single entry point of the level.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// The single exit of the level.
    #[must_use]
    pub const fn finish(&self) -> CellCoord {
        self.finish
    }

    /// Direction the actor faces when spawned.
    #[must_use]
    pub const fn initial_direction(&self) -> FacingDirection {
        self.initial_direction
    }

    /// Block under a continuous grid position, rounded to the nearest cell.
    ///
    /// Positions that round outside the grid resolve to `None`.
    #[must_use]
    pub fn block_at_position(&self, position: GridPoint) -> Option<BlockKind> {
        position
            .to_cell()
            .and_then(|cell| self.grid.block_at(cell))
    }

    /// Link connecting the two portals of the provided style.
    #[must_use]
    pub fn teleport(&self, style: BlockStyle) -> Option<&TeleportLink> {
        self.teleports.get(&style)
    }

    /// Iterates every teleport link ordered by style.
    pub fn teleports(&self) -> impl Iterator<Item = (BlockStyle, &TeleportLink)> {
        self.teleports.iter().map(|(style, link)| (*style, link))
    }
}

/// Query functions that provide read-only access to a loaded level.
pub mod query {
    use iso_dimension_core::{BlockKind, BlockStyle, CellCoord, GridPoint};

    use super::LoadedLevel;

    /// Block placed at the provided cell, if any.
    #[must_use]
    pub fn block_at(level: &LoadedLevel, cell: CellCoord) -> Option<BlockKind> {
        level.grid.block_at(cell)
    }

    /// Block under a continuous grid point, rounded to the nearest cell.
    ///
    /// Points outside the grid and empty cells both resolve to
    /// [`BlockKind::Empty`].
    #[must_use]
    pub fn block_under(level: &LoadedLevel, point: GridPoint) -> BlockKind {
        level
            .block_at_position(point)
            .unwrap_or(BlockKind::Empty)
    }

    /// Portal paired with the provided portal of the given style.
    #[must_use]
    pub fn teleport_destination(
        level: &LoadedLevel,
        style: BlockStyle,
        from: CellCoord,
    ) -> Option<CellCoord> {
        level.teleport(style).and_then(|link| link.paired(from))
    }

    /// Iterates every placed block in row-major order.
    pub fn tiles(level: &LoadedLevel) -> impl Iterator<Item = (CellCoord, BlockKind)> + '_ {
        level.grid.blocks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teleport_link_pairs_both_directions() {
        let a = CellCoord::new(0, 1);
        let b = CellCoord::new(4, 2);
        let link = TeleportLink::new(a, b);

        assert_eq!(link.paired(a), Some(b));
        assert_eq!(link.paired(b), Some(a));
        assert_eq!(link.paired(CellCoord::new(1, 1)), None);
    }

    #[test]
    fn short_rows_are_padded_with_empty_cells() {
        let grid = TileGrid::from_rows(vec![
            vec![BlockKind::Start, BlockKind::Standard, BlockKind::Finish],
            vec![BlockKind::Standard],
        ]);

        assert_eq!(grid.size(), GridSize::new(2, 3));
        assert_eq!(grid.block_at(CellCoord::new(1, 0)), Some(BlockKind::Standard));
        assert_eq!(grid.block_at(CellCoord::new(1, 2)), None);
        assert_eq!(grid.block_at(CellCoord::new(5, 0)), None);
    }

    #[test]
    fn empty_blocks_are_stored_as_absent() {
        let grid = TileGrid::from_rows(vec![vec![BlockKind::Empty, BlockKind::Standard]]);

        assert_eq!(grid.block_at(CellCoord::new(0, 0)), None);
        let blocks: Vec<_> = grid.blocks().collect();
        assert_eq!(blocks, vec![(CellCoord::new(0, 1), BlockKind::Standard)]);
    }
}
