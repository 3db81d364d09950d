use iso_dimension_core::{
    BlockKind, BlockStyle, CellCoord, FacingDirection, GridPoint, LevelConfig, LevelGoals,
    LoadError,
};
use iso_dimension_world::{decode, decode_map, query, GridSize};

fn config() -> LevelConfig {
    let goals = LevelGoals::new(30.0, 20.0, 10.0).expect("valid goals");
    LevelConfig::new("Levels/Level_1/Level_1_Map", FacingDirection::DownLeft, goals)
}

#[test]
fn minimal_map_decodes() {
    let level = decode("SF\n__", &config()).expect("minimal map should decode");

    assert_eq!(level.start(), CellCoord::new(0, 0));
    assert_eq!(level.finish(), CellCoord::new(0, 1));
    assert_eq!(level.size(), GridSize::new(2, 2));
    assert_eq!(level.initial_direction(), FacingDirection::DownLeft);
    assert_eq!(query::block_at(&level, CellCoord::new(1, 0)), None);
    assert_eq!(level.teleports().count(), 0);
}

#[test]
fn missing_start_is_rejected() {
    let error = decode_map(["XF", "XX"]).expect_err("no start block");
    assert_eq!(error, LoadError::InvalidEntryPoints { count: 0 });
}

#[test]
fn duplicate_start_is_rejected() {
    let error = decode_map(["SSF"]).expect_err("two start blocks");
    assert_eq!(error, LoadError::InvalidEntryPoints { count: 2 });
}

#[test]
fn missing_finish_is_rejected() {
    let error = decode_map(["SXX", "XXX"]).expect_err("no finish block");
    assert_eq!(error, LoadError::InvalidFinishPoints { count: 0 });
}

#[test]
fn only_ascii_alphanumerics_decode_to_standard_blocks() {
    for identifier in ['.', ' ', '#', 'é'] {
        let row = format!("S{identifier}F");
        let error = decode_map([row.as_str()]).expect_err("identifier has no block meaning");
        assert_eq!(
            error,
            LoadError::UnknownBlock {
                row: 0,
                column: 1,
                identifier,
            }
        );
    }
    assert!(decode_map(["S7aF"]).is_ok());
}

#[test]
fn finish_must_be_unique() {
    let error = decode_map(["SFF"]).expect_err("two finish blocks");
    assert_eq!(error, LoadError::InvalidFinishPoints { count: 2 });
}

#[test]
fn teleport_style_must_appear_twice() {
    let error = decode_map(["SRRR", "XXXF"]).expect_err("three red portals");
    assert_eq!(
        error,
        LoadError::InvalidTeleportPoints {
            style: BlockStyle::Red,
            count: 3,
        }
    );

    let error = decode_map(["SB", "XF"]).expect_err("lonely blue portal");
    assert_eq!(
        error,
        LoadError::InvalidTeleportPoints {
            style: BlockStyle::Blue,
            count: 1,
        }
    );
}

#[test]
fn unmapped_identifier_is_rejected() {
    let error = decode_map(["S?F"]).expect_err("question mark is unmapped");
    assert_eq!(
        error,
        LoadError::UnknownBlock {
            row: 0,
            column: 1,
            identifier: '?',
        }
    );
}

#[test]
fn portals_are_paired_by_style() {
    let level = decode_map(["SGXX", "XXXG", "FYXY"]).expect("paired portals decode");

    let link = level.teleport(BlockStyle::Green).expect("green link");
    assert_eq!(link.locations(), [CellCoord::new(0, 1), CellCoord::new(1, 3)]);
    assert_eq!(
        query::teleport_destination(&level, BlockStyle::Yellow, CellCoord::new(2, 1)),
        Some(CellCoord::new(2, 3))
    );
    assert!(level.teleport(BlockStyle::Red).is_none());
}

#[test]
fn hazard_markers_are_walkable_blocks() {
    let level = decode_map(["SrF"]).expect("hazard marker decodes");
    assert_eq!(
        query::block_at(&level, CellCoord::new(0, 1)),
        Some(BlockKind::HazardMarker(BlockStyle::Red))
    );
}

#[test]
fn decoding_stops_at_the_first_empty_row() {
    let level = decode("SXX\nXF\n\nS?S\n", &config()).expect("rows after the gap are ignored");

    assert_eq!(level.size(), GridSize::new(2, 3));
    assert_eq!(query::block_at(&level, CellCoord::new(1, 2)), None);
}

#[test]
fn windows_line_endings_are_accepted() {
    let level = decode("SX\r\nXF\r\n", &config()).expect("crlf map decodes");
    assert_eq!(level.finish(), CellCoord::new(1, 1));
}

#[test]
fn continuous_positions_round_to_cells() {
    let level = decode_map(["SX", "XF"]).expect("map decodes");

    assert_eq!(
        level.block_at_position(GridPoint::new(0.6, 1.4)),
        Some(BlockKind::Finish)
    );
    assert_eq!(level.block_at_position(GridPoint::new(2.6, 0.0)), None);
    assert_eq!(
        query::block_under(&level, GridPoint::new(-1.0, 0.0)),
        BlockKind::Empty
    );
}

#[test]
fn decoding_is_deterministic() {
    let raw = "SBX\nXXB\nXFX";
    assert_eq!(decode(raw, &config()), decode(raw, &config()));
}
