#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Isometric Dimension engine.
//!
//! This crate defines the vocabulary that connects the level decoder, the
//! authoritative world model, the per-tick systems and the adapters. Levels
//! are described by [`LevelConfig`] values and decoded into immutable worlds;
//! systems report what happened through [`TileEvent`] values, and adapters
//! drive the game by submitting [`Intent`] values to the flow coordinator.

pub mod projection;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use projection::{GridPoint, IsometricAxis, IsometricProjection, ViewRect};

/// Identifier that marks an empty, off-map cell in a level map.
pub const EMPTY_IDENTIFIER: char = '_';

/// Identifier that marks the actor's entry point in a level map.
pub const START_IDENTIFIER: char = 'S';

/// Identifier that marks the level's exit in a level map.
pub const FINISH_IDENTIFIER: char = 'F';

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Continuous grid point located exactly on this cell.
    #[must_use]
    pub fn to_point(self) -> GridPoint {
        GridPoint::new(self.row as f32, self.column as f32)
    }
}

/// Visual style shared by hazard markers and teleport portals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockStyle {
    /// Red styled block.
    Red,
    /// Blue styled block.
    Blue,
    /// Green styled block.
    Green,
    /// Yellow styled block.
    Yellow,
}

impl BlockStyle {
    /// Resource name used by renderers to pick the style's textures.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Yellow => "Yellow",
        }
    }

    /// Resolves the style addressed by a case-insensitive map letter.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'r' => Some(Self::Red),
            'b' => Some(Self::Blue),
            'g' => Some(Self::Green),
            'y' => Some(Self::Yellow),
            _ => None,
        }
    }
}

/// Decoded meaning of a single level map identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Off-map air. Standing on it loses the level.
    Empty,
    /// Plain walkable block.
    Standard,
    /// Entry point of the level.
    Start,
    /// Exit of the level.
    Finish,
    /// Portal that teleports the actor to its paired portal of the same style.
    TeleportPortal(BlockStyle),
    /// Styled hazard marker. Walkable; only rendered differently.
    HazardMarker(BlockStyle),
}

impl BlockKind {
    /// Resolves the block kind encoded by a level map identifier.
    ///
    /// Any ASCII alphanumeric character without a dedicated meaning decodes to
    /// [`BlockKind::Standard`]. Every other character is unknown and yields
    /// `None`.
    #[must_use]
    pub fn from_identifier(identifier: char) -> Option<Self> {
        match identifier {
            START_IDENTIFIER => Some(Self::Start),
            FINISH_IDENTIFIER => Some(Self::Finish),
            EMPTY_IDENTIFIER => Some(Self::Empty),
            'r' | 'g' | 'b' | 'y' => BlockStyle::from_letter(identifier).map(Self::HazardMarker),
            'R' | 'G' | 'B' | 'Y' => BlockStyle::from_letter(identifier).map(Self::TeleportPortal),
            other if other.is_ascii_alphanumeric() => Some(Self::Standard),
            _ => None,
        }
    }

    /// Reports whether the kind is backed by a physical block.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Style attached to hazard markers and portals.
    #[must_use]
    pub const fn style(self) -> Option<BlockStyle> {
        match self {
            Self::TeleportPortal(style) | Self::HazardMarker(style) => Some(style),
            _ => None,
        }
    }
}

/// Isometric movement directions available to the actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacingDirection {
    /// Travel along the left isometric axis.
    DownLeft,
    /// Travel along the right isometric axis.
    DownRight,
    /// Travel against the right isometric axis.
    UpLeft,
    /// Travel against the left isometric axis.
    #[default]
    UpRight,
}

impl FacingDirection {
    /// Every direction in declaration order.
    pub const ALL: [FacingDirection; 4] =
        [Self::DownLeft, Self::DownRight, Self::UpLeft, Self::UpRight];

    /// Unit vector of the direction on the projected plane.
    #[must_use]
    pub fn unit_vector(self) -> Vec2 {
        match self {
            Self::DownLeft => IsometricAxis::Left.vector(),
            Self::DownRight => IsometricAxis::Right.vector(),
            Self::UpLeft => -IsometricAxis::Right.vector(),
            Self::UpRight => -IsometricAxis::Left.vector(),
        }
    }

    /// Direction pointing the opposite way along the same diagonal.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::DownLeft => Self::UpRight,
            Self::DownRight => Self::UpLeft,
            Self::UpLeft => Self::DownRight,
            Self::UpRight => Self::DownLeft,
        }
    }

    /// Parses the camel-case name used in level configs and scripts.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "downLeft" => Some(Self::DownLeft),
            "downRight" => Some(Self::DownRight),
            "upLeft" => Some(Self::UpLeft),
            "upRight" => Some(Self::UpRight),
            _ => None,
        }
    }
}

/// Completion rating, ordered by the number of stars earned.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Rating {
    /// Completed slower than every goal.
    #[default]
    NoStar,
    /// Completed within the one star goal.
    OneStar,
    /// Completed within the two star goal.
    TwoStars,
    /// Completed within the three star goal.
    ThreeStars,
}

impl Rating {
    /// Number of stars the rating awards.
    #[must_use]
    pub const fn stars(self) -> u8 {
        match self {
            Self::NoStar => 0,
            Self::OneStar => 1,
            Self::TwoStars => 2,
            Self::ThreeStars => 3,
        }
    }
}

/// Time thresholds, in seconds, that bound each rating tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelGoals {
    one_star: f64,
    two_stars: f64,
    three_stars: f64,
}

impl LevelGoals {
    /// Creates a validated set of goals.
    pub fn new(one_star: f64, two_stars: f64, three_stars: f64) -> Result<Self, GoalsError> {
        let goals = Self {
            one_star,
            two_stars,
            three_stars,
        };
        goals.validate()?;
        Ok(goals)
    }

    /// Upper bound of the one star tier.
    #[must_use]
    pub const fn one_star(&self) -> f64 {
        self.one_star
    }

    /// Upper bound of the two star tier.
    #[must_use]
    pub const fn two_stars(&self) -> f64 {
        self.two_stars
    }

    /// Upper bound of the three star tier.
    #[must_use]
    pub const fn three_stars(&self) -> f64 {
        self.three_stars
    }

    /// Checks that every threshold is a finite, non-negative number and that
    /// the thresholds ascend from the best tier to the worst.
    pub fn validate(&self) -> Result<(), GoalsError> {
        for value in [self.three_stars, self.two_stars, self.one_star] {
            if !value.is_finite() || value < 0.0 {
                return Err(GoalsError::InvalidThreshold { value });
            }
        }

        if self.three_stars > self.two_stars || self.two_stars > self.one_star {
            return Err(GoalsError::Misordered {
                one_star: self.one_star,
                two_stars: self.two_stars,
                three_stars: self.three_stars,
            });
        }

        Ok(())
    }

    /// Resolves the rating earned after the provided elapsed time.
    ///
    /// Tiers are half-open: `[0, three)` earns three stars, `[three, two)`
    /// earns two, `[two, one)` earns one and anything slower earns none.
    #[must_use]
    pub fn rating_for(&self, elapsed: Duration) -> Rating {
        let seconds = elapsed.as_secs_f64();
        if seconds < self.three_stars {
            Rating::ThreeStars
        } else if seconds < self.two_stars {
            Rating::TwoStars
        } else if seconds < self.one_star {
            Rating::OneStar
        } else {
            Rating::NoStar
        }
    }
}

/// Reasons a set of level goals is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GoalsError {
    /// A threshold was negative, infinite or not a number.
    #[error("goal threshold {value} must be a finite, non-negative number of seconds")]
    InvalidThreshold {
        /// Offending threshold.
        value: f64,
    },
    /// Thresholds do not ascend from three stars to one star.
    #[error(
        "goal thresholds must ascend from three stars to one star \
         (three stars {three_stars}, two stars {two_stars}, one star {one_star})"
    )]
    Misordered {
        /// Upper bound of the one star tier.
        one_star: f64,
        /// Upper bound of the two star tier.
        two_stars: f64,
        /// Upper bound of the three star tier.
        three_stars: f64,
    },
}

/// Declarative per-level parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    #[serde(default)]
    raw_map_file: String,
    #[serde(default)]
    initial_direction: FacingDirection,
    goals: LevelGoals,
}

impl LevelConfig {
    /// Creates a new level configuration.
    #[must_use]
    pub fn new(
        raw_map_file: impl Into<String>,
        initial_direction: FacingDirection,
        goals: LevelGoals,
    ) -> Self {
        Self {
            raw_map_file: raw_map_file.into(),
            initial_direction,
            goals,
        }
    }

    /// Reference to the raw map resource, without extension.
    #[must_use]
    pub fn raw_map_file(&self) -> &str {
        &self.raw_map_file
    }

    /// Direction the actor faces when the level starts.
    #[must_use]
    pub const fn initial_direction(&self) -> FacingDirection {
        self.initial_direction
    }

    /// Goals that define the rating tiers.
    #[must_use]
    pub const fn goals(&self) -> &LevelGoals {
        &self.goals
    }
}

/// Outcome of a completed run, shown on the completion screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletionSummary {
    /// Rating earned for the run.
    pub rating: Rating,
    /// Goals the run was measured against.
    pub goals: LevelGoals,
    /// Time spent solving the level.
    pub elapsed: Duration,
}

/// Identifies an entity that participates in visibility and depth sorting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    /// Static tile located at the provided cell.
    Tile(CellCoord),
    /// The player-controlled actor.
    Actor,
}

/// Painter's-algorithm sort key. Larger keys draw over smaller keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaintOrder(i64);

impl PaintOrder {
    /// Bias that lifts the actor above the tile it stands on.
    pub const ACTOR_BIAS: i64 = 1;

    /// Creates a key from a raw value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Key of a static tile located at the provided cell.
    #[must_use]
    pub const fn for_tile(cell: CellCoord) -> Self {
        Self(cell.row() as i64 - cell.column() as i64)
    }

    /// Key of the actor standing at the provided rasterized grid point.
    #[must_use]
    pub fn for_actor(point: GridPoint) -> Self {
        let rounded = point.rounded();
        Self(rounded.row as i64 - rounded.column as i64 + Self::ACTOR_BIAS)
    }

    /// Retrieves the raw key value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

/// Level-defining signals raised by the world simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TileEvent {
    /// The actor left the map; the level is lost.
    Fail,
    /// The actor reached the finish; the level is won.
    Complete(CompletionSummary),
    /// The actor entered a portal and must be moved to its partner.
    Teleport {
        /// Style shared by both portals.
        style: BlockStyle,
        /// Portal the actor entered.
        from: CellCoord,
        /// Paired portal the actor is sent to.
        to: CellCoord,
        /// World position the actor must be placed at.
        target: Vec2,
    },
}

/// Requests submitted to the flow coordinator by adapters.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Starts the provided level from the menu.
    SelectLevel {
        /// Configuration of the selected level.
        config: LevelConfig,
        /// Raw map text referenced by the configuration.
        raw_map: String,
    },
    /// Suspends the rating clock and steering of the active run.
    Pause,
    /// Continues a paused run.
    Resume,
    /// Starts moving the actor in the provided direction.
    Steer(FacingDirection),
    /// Stops re-issuing movement impulses.
    ReleaseSteering,
    /// Abandons the current state and returns to the menu.
    ReturnToMenu,
}

/// Reasons a raw level map is rejected by the decoder.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The map contained an identifier without a block meaning.
    #[error("unknown block identifier {identifier:?} at row {row}, column {column}")]
    UnknownBlock {
        /// Row containing the identifier.
        row: u32,
        /// Column containing the identifier.
        column: u32,
        /// Offending identifier.
        identifier: char,
    },
    /// The map did not contain exactly one start block.
    #[error("expected exactly one start block, found {count}")]
    InvalidEntryPoints {
        /// Number of start blocks found.
        count: usize,
    },
    /// The map did not contain exactly one finish block.
    #[error("expected exactly one finish block, found {count}")]
    InvalidFinishPoints {
        /// Number of finish blocks found.
        count: usize,
    },
    /// A portal style did not appear exactly twice.
    #[error("teleport style {style:?} must appear exactly twice, found {count}")]
    InvalidTeleportPoints {
        /// Style with an invalid number of portals.
        style: BlockStyle,
        /// Number of portals found for the style.
        count: usize,
    },
}
