#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Isometric Dimension adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use iso_dimension_core::{
    BlockKind, EntityId, FacingDirection, IsometricProjection, PaintOrder, ViewRect,
};
use iso_dimension_world::{query, LoadedLevel};
use std::{collections::BTreeMap, error::Error, fmt, time::Duration};

/// Side length of the square view presented by default.
pub const DEFAULT_VIEW_SIZE: f32 = 700.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction pressed on the keypad this frame.
    pub steer: Option<FacingDirection>,
    /// Whether the keypad was released this frame.
    pub release: bool,
    /// Whether the pause button was pressed this frame.
    pub pause_toggle: bool,
}

/// What a scene entry depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Static level block.
    Block(BlockKind),
    /// The droid, drawn facing the provided direction.
    Actor(FacingDirection),
}

/// Single drawable entity of the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEntry {
    /// Identifier shared with the simulation reports.
    pub entity: EntityId,
    /// What the entry depicts.
    pub kind: EntryKind,
    /// Projected position of the entry's anchor.
    pub position: Vec2,
    /// Painter's-algorithm key reported by the simulation.
    pub paint_order: PaintOrder,
    /// Whether the entry is within the view.
    pub visible: bool,
}

/// Scene description combining the level blocks and the actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    entries: BTreeMap<EntityId, SceneEntry>,
    actor_model: String,
    view_size: Vec2,
    camera: Vec2,
}

impl Scene {
    /// Builds the scene of a freshly loaded level with the actor at `spawn`.
    pub fn from_level(
        level: &LoadedLevel,
        projection: &IsometricProjection,
        spawn: Vec2,
        actor_model: impl Into<String>,
        view_size: Vec2,
    ) -> Result<Self, RenderingError> {
        if view_size.x <= 0.0 || view_size.y <= 0.0 || !view_size.is_finite() {
            return Err(RenderingError::InvalidViewSize { view_size });
        }

        let mut entries: BTreeMap<_, _> = query::tiles(level)
            .map(|(cell, kind)| {
                let entity = EntityId::Tile(cell);
                let entry = SceneEntry {
                    entity,
                    kind: EntryKind::Block(kind),
                    position: projection.project_cell(cell),
                    paint_order: PaintOrder::for_tile(cell),
                    visible: false,
                };
                (entity, entry)
            })
            .collect();
        let _ = entries.insert(
            EntityId::Actor,
            SceneEntry {
                entity: EntityId::Actor,
                kind: EntryKind::Actor(level.initial_direction()),
                position: spawn,
                paint_order: PaintOrder::new(0),
                visible: false,
            },
        );

        Ok(Self {
            entries,
            actor_model: actor_model.into(),
            view_size,
            camera: spawn,
        })
    }

    /// Entry of the provided entity, if it exists.
    #[must_use]
    pub fn entry(&self, entity: EntityId) -> Option<&SceneEntry> {
        self.entries.get(&entity)
    }

    /// Camera position; the camera follows the actor.
    #[must_use]
    pub const fn camera(&self) -> Vec2 {
        self.camera
    }

    /// Rectangle of the plane currently in view.
    #[must_use]
    pub fn view(&self) -> ViewRect {
        ViewRect::centered(self.camera, self.view_size)
    }

    /// Moves the actor and the camera following it.
    pub fn set_actor(&mut self, position: Vec2, facing: FacingDirection) {
        self.camera = position;
        if let Some(actor) = self.entries.get_mut(&EntityId::Actor) {
            actor.position = position;
            actor.kind = EntryKind::Actor(facing);
        }
    }

    /// Applies visibility flips reported by the simulation.
    pub fn apply_visibility(&mut self, changes: &[(EntityId, bool)]) {
        for (entity, visible) in changes {
            if let Some(entry) = self.entries.get_mut(entity) {
                entry.visible = *visible;
            }
        }
    }

    /// Applies paint-order keys reported by the simulation.
    pub fn apply_paint_order(&mut self, updates: &[(EntityId, PaintOrder)]) {
        for (entity, key) in updates {
            if let Some(entry) = self.entries.get_mut(entity) {
                entry.paint_order = *key;
            }
        }
    }

    /// Visible entries ordered back to front.
    ///
    /// Entries with equal keys keep their identifier order.
    #[must_use]
    pub fn draw_list(&self) -> Vec<&SceneEntry> {
        let mut visible: Vec<_> = self.entries.values().filter(|entry| entry.visible).collect();
        visible.sort_by_key(|entry| entry.paint_order);
        visible
    }

    /// Resource name of the sprite drawn for an entry.
    #[must_use]
    pub fn sprite_name(&self, entry: &SceneEntry) -> String {
        match entry.kind {
            EntryKind::Block(kind) => block_sprite(kind),
            EntryKind::Actor(facing) => {
                let pose = match facing {
                    FacingDirection::DownLeft => "Left-Front",
                    FacingDirection::DownRight => "Right-Front",
                    FacingDirection::UpLeft => "Right-Back",
                    FacingDirection::UpRight => "Left-Back",
                };
                format!("Images/Actor/{0}/{0}-{pose}", self.actor_model)
            }
        }
    }
}

fn block_sprite(kind: BlockKind) -> String {
    match kind {
        BlockKind::Empty | BlockKind::Standard => "Images/Blocks/Standard/Block".to_owned(),
        BlockKind::Start => "Images/Blocks/Standard/Start_Block".to_owned(),
        BlockKind::Finish => "Images/Blocks/Standard/Finish_Block".to_owned(),
        BlockKind::TeleportPortal(style) => {
            format!("Images/Blocks/{0}/{0}_Block", style.name())
        }
        BlockKind::HazardMarker(style) => format!("Images/Blocks/{0}/{0}_Tesla", style.name()),
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Isometric Dimension scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and mutates the scene before it is
    /// presented. An error returned by the closure stops the backend.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The view must have a positive, finite size.
    InvalidViewSize {
        /// Provided size that failed validation.
        view_size: Vec2,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewSize { view_size } => {
                write!(
                    f,
                    "view size must be positive and finite (received {view_size})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
