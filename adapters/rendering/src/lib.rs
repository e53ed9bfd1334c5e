#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Dengue Patrol adapters.
//!
//! Backends never read the world directly. They draw a [`Scene`] that the
//! caller rebuilds from world snapshots each frame, plus a [`Hud`] fed only by
//! bus notifications.

mod hud;

use anyhow::Result as AnyResult;
use dengue_patrol_core::{
    MosquitoSnapshot, MosquitoState, MosquitoView, MovementIntent, PlayerSnapshot, Point, Rules,
    SiteKind, SiteSnapshot, SiteState, SiteView,
};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

pub use hud::{format_clock, GameOverBanner, Hud, SprayEffect, URGENT_SECONDS};

/// Interval at which a flashing player toggles visibility.
pub const FLASH_BLINK_INTERVAL: Duration = Duration::from_millis(100);

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

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction keys held during the frame.
    pub movement: MovementIntent,
    /// Whether the spray key is held during the frame.
    pub spray_held: bool,
    /// Whether the adapter detected a restart request on this frame.
    pub restart: bool,
}

/// Bounded play area drawn beneath every entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaPresentation {
    /// Total width including the border walls.
    pub width: f32,
    /// Total height including the border walls.
    pub height: f32,
    /// Thickness of the wall along each edge.
    pub border: f32,
    /// Fill of the walkable floor.
    pub floor: Color,
    /// Fill of the border walls.
    pub wall: Color,
}

impl ArenaPresentation {
    /// Creates an arena descriptor.
    ///
    /// Returns an error when the arena has no area.
    pub fn new(
        width: f32,
        height: f32,
        border: f32,
        floor: Color,
        wall: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(RenderingError::EmptyArena { width, height });
        }

        Ok(Self {
            width,
            height,
            border,
            floor,
            wall,
        })
    }

    /// Arena descriptor matching the configured rules.
    pub fn from_rules(rules: &Rules) -> std::result::Result<Self, RenderingError> {
        Self::new(
            rules.arena_width,
            rules.arena_height,
            rules.arena_border,
            Color::from_rgb_u8(118, 164, 92),
            Color::from_rgb_u8(72, 98, 60),
        )
    }
}

/// Player avatar drawn as a filled square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Centre of the avatar in world units.
    pub position: Vec2,
    /// Half the side length of the avatar.
    pub half_extent: f32,
    /// Fill color.
    pub color: Color,
    /// Whether the avatar is drawn this frame; false during a blink.
    pub visible: bool,
}

/// Mosquito drawn as a filled circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MosquitoPresentation {
    /// Centre of the body in world units, including any dying descent.
    pub position: Vec2,
    /// Body radius.
    pub radius: f32,
    /// Tinted body color.
    pub color: Color,
}

/// Breeding site drawn as a square with a caption.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SitePresentation {
    /// Centre of the site in world units.
    pub position: Vec2,
    /// Half the side length of the site.
    pub half_extent: f32,
    /// Fill color.
    pub color: Color,
    /// Caption drawn beneath the site, hidden once cleared.
    pub label: Option<&'static str>,
    /// Whether the player is currently clearing this site.
    pub clearing: bool,
}

/// Scene description combining the arena, its inhabitants and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Arena drawn underneath everything else.
    pub arena: ArenaPresentation,
    /// Player avatar.
    pub player: PlayerPresentation,
    /// Live mosquitoes in identifier order.
    pub mosquitoes: Vec<MosquitoPresentation>,
    /// Breeding sites in identifier order.
    pub sites: Vec<SitePresentation>,
    /// Heads-up display fed by notifications.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene for the provided arena.
    #[must_use]
    pub fn new(arena: ArenaPresentation, hud: Hud) -> Self {
        Self {
            arena,
            player: PlayerPresentation {
                position: Vec2::new(arena.width * 0.5, arena.height * 0.5),
                half_extent: 0.0,
                color: PLAYER_COLOR,
                visible: true,
            },
            mosquitoes: Vec::new(),
            sites: Vec::new(),
            hud,
        }
    }

    /// Rebuilds every entity from world snapshots taken at simulated time `now`.
    pub fn refresh(
        &mut self,
        rules: &Rules,
        player: &PlayerSnapshot,
        mosquitoes: &MosquitoView,
        sites: &SiteView,
        now: Duration,
    ) {
        let blink = (now.as_millis() / FLASH_BLINK_INTERVAL.as_millis()) % 2 == 1;
        self.player = PlayerPresentation {
            position: to_vec2(player.position),
            half_extent: rules.player_half_extent,
            color: PLAYER_COLOR,
            visible: !(player.flashing && blink),
        };
        self.mosquitoes = mosquitoes
            .iter()
            .map(|snapshot| mosquito_presentation(snapshot, rules))
            .collect();
        self.sites = sites
            .iter()
            .map(|snapshot| site_presentation(snapshot, rules))
            .collect();
    }
}

const PLAYER_COLOR: Color = Color::from_rgb_u8(40, 92, 196);
const MOSQUITO_COLOR: Color = Color::from_rgb_u8(34, 34, 34);
const BITING_COLOR: Color = Color::from_rgb_u8(255, 0, 255);
const DYING_COLOR: Color = Color::from_rgb_u8(136, 136, 136);
const CLEARED_SITE_COLOR: Color = Color::from_rgb_u8(102, 102, 102);

/// Body tint for a mosquito in the given state.
#[must_use]
pub fn mosquito_tint(state: MosquitoState) -> Color {
    match state {
        MosquitoState::Wandering => MOSQUITO_COLOR,
        MosquitoState::Chasing => MOSQUITO_COLOR.lighten(0.1),
        MosquitoState::Biting => BITING_COLOR,
        MosquitoState::Fled => MOSQUITO_COLOR.lighten(0.3),
        MosquitoState::Dying => DYING_COLOR,
    }
}

/// Maps a mosquito snapshot to its drawable form.
///
/// Dying mosquitoes sink by `dying_sink_distance` and fade out over
/// `dying_duration_ms`, both derived from the time spent in that state.
#[must_use]
pub fn mosquito_presentation(snapshot: &MosquitoSnapshot, rules: &Rules) -> MosquitoPresentation {
    let mut position = to_vec2(snapshot.position);
    let mut color = mosquito_tint(snapshot.state);

    if snapshot.state == MosquitoState::Dying {
        let total = rules.dying_duration().as_secs_f32();
        let progress = if total <= f32::EPSILON {
            1.0
        } else {
            (snapshot.state_elapsed.as_secs_f32() / total).clamp(0.0, 1.0)
        };
        position.y += rules.dying_sink_distance * progress;
        color = color.with_alpha(1.0 - progress);
    }

    MosquitoPresentation {
        position,
        radius: rules.mosquito_half_extent,
        color,
    }
}

/// Maps a breeding site snapshot to its drawable form.
#[must_use]
pub fn site_presentation(snapshot: &SiteSnapshot, rules: &Rules) -> SitePresentation {
    let base = site_color(snapshot.kind);
    let (color, label, half_extent) = match snapshot.state {
        SiteState::Active => (base, Some(snapshot.kind.label()), rules.site_half_extent),
        SiteState::Clearing => (
            base.lighten(0.35),
            Some(snapshot.kind.label()),
            rules.site_half_extent,
        ),
        SiteState::Cleared => (
            CLEARED_SITE_COLOR.with_alpha(0.3),
            None,
            rules.site_half_extent * 0.7,
        ),
    };

    SitePresentation {
        position: to_vec2(snapshot.position),
        half_extent,
        color,
        label,
        clearing: snapshot.state == SiteState::Clearing,
    }
}

fn site_color(kind: SiteKind) -> Color {
    match kind {
        SiteKind::Tire => Color::from_rgb_u8(58, 58, 64),
        SiteKind::WaterContainer => Color::from_rgb_u8(52, 120, 200),
        SiteKind::Plant => Color::from_rgb_u8(46, 140, 70),
    }
}

/// Converts a world position into the rendering vector type.
#[must_use]
pub fn to_vec2(point: Point) -> Vec2 {
    Vec2::new(point.x, point.y)
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

/// Rendering backend capable of presenting Dengue Patrol scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and mutates the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The arena must have a positive area.
    EmptyArena {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyArena { width, height } => {
                write!(f, "arena must have a positive area (received {width}x{height})")
            }
        }
    }
}

impl Error for RenderingError {}
