//! Decoder that turns raw level map text into a validated [`LoadedLevel`].

use std::collections::BTreeMap;

use iso_dimension_core::{
    BlockKind, BlockStyle, CellCoord, FacingDirection, LevelConfig, LoadError,
};

use crate::{LoadedLevel, TeleportLink, TileGrid};

/// Decodes a raw level map using the parameters of its level configuration.
///
/// Decoding is atomic: either the complete level is returned or the first
/// violated rule is reported and nothing is constructed.
pub fn decode(raw_map: &str, config: &LevelConfig) -> Result<LoadedLevel, LoadError> {
    let level = decode_rows(raw_map.lines(), config.initial_direction()).map_err(|error| {
        log::warn!("rejected level {:?}: {error}", config.raw_map_file());
        error
    })?;
    log::debug!(
        "decoded level {:?}: {}x{} cells, {} teleport links",
        config.raw_map_file(),
        level.size().rows(),
        level.size().columns(),
        level.teleports().count()
    );
    Ok(level)
}

/// Decodes raw map rows with the default initial direction.
///
/// Useful for validating maps that have no configuration yet.
pub fn decode_map<I, S>(rows: I) -> Result<LoadedLevel, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    decode_rows(rows, FacingDirection::default())
}

fn decode_rows<I, S>(rows: I, initial_direction: FacingDirection) -> Result<LoadedLevel, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoded_rows: Vec<Vec<BlockKind>> = Vec::new();
    let mut starts: Vec<CellCoord> = Vec::new();
    let mut finishes: Vec<CellCoord> = Vec::new();
    let mut portals: BTreeMap<BlockStyle, Vec<CellCoord>> = BTreeMap::new();

    for (row_index, raw_row) in rows.into_iter().enumerate() {
        let raw_row = raw_row.as_ref();
        if raw_row.is_empty() {
            break;
        }

        let row = index_to_u32(row_index);
        let mut decoded = Vec::with_capacity(raw_row.len());
        for (column_index, identifier) in raw_row.chars().enumerate() {
            let column = index_to_u32(column_index);
            let kind = BlockKind::from_identifier(identifier).ok_or(LoadError::UnknownBlock {
                row,
                column,
                identifier,
            })?;

            let cell = CellCoord::new(row, column);
            match kind {
                BlockKind::Start => starts.push(cell),
                BlockKind::Finish => finishes.push(cell),
                BlockKind::TeleportPortal(style) => portals.entry(style).or_default().push(cell),
                _ => {}
            }
            decoded.push(kind);
        }
        decoded_rows.push(decoded);
    }

    let start = single(&starts).ok_or(LoadError::InvalidEntryPoints {
        count: starts.len(),
    })?;
    let finish = single(&finishes).ok_or(LoadError::InvalidFinishPoints {
        count: finishes.len(),
    })?;

    let mut teleports = BTreeMap::new();
    for (style, locations) in portals {
        let &[first, second] = locations.as_slice() else {
            return Err(LoadError::InvalidTeleportPoints {
                style,
                count: locations.len(),
            });
        };
        let _ = teleports.insert(style, TeleportLink::new(first, second));
    }

    Ok(LoadedLevel::new(
        TileGrid::from_rows(decoded_rows),
        start,
        finish,
        teleports,
        initial_direction,
    ))
}

fn single(cells: &[CellCoord]) -> Option<CellCoord> {
    match cells {
        [cell] => Some(*cell),
        _ => None,
    }
}

fn index_to_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
