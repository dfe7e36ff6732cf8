//! World-to-screen placement of speaker icons.
//!
//! The 3D engine is an external collaborator, reached through the
//! `WorldView` and `ScreenMetrics` traits. Everything here is recomputed on
//! every call: players and the camera move continuously, so nothing is
//! cached between frames.
//!
//! ## Placement law
//!
//! ```text
//! anchor   = head bone + (0, 0, ANCHOR_LIFT)
//! distance = |camera - anchor|
//! size     = base_px * user_scale * (REFERENCE_DISTANCE / distance)
//! ```

use cgmath::{MetricSpace, Point3, Vector3};

use crate::stream::PlayerId;

/// World units the icon floats above the head bone.
pub const ANCHOR_LIFT: f32 = 1.0;

/// Distance at which an icon is drawn at exactly its base size.
pub const REFERENCE_DISTANCE: f32 = 5.0;

/// Base resolution that `ScreenMetrics` base values are expressed in.
pub const BASE_WIDTH: f32 = 640.0;
pub const BASE_HEIGHT: f32 = 480.0;

/// Live game-world queries. Every method may fail for the current frame
/// (player streamed out, camera not ready); callers skip and retry next frame.
pub trait WorldView {
    fn camera_position(&self) -> Option<Point3<f32>>;

    /// Head/neck bone of the player's character, in world space.
    fn anchor_position(&self, player: PlayerId) -> Option<Point3<f32>>;

    /// Project a world point to screen pixels. `None` when behind the camera
    /// or otherwise not projectable.
    fn project_to_screen(&self, point: Point3<f32>) -> Option<(f32, f32)>;

    /// External visibility test (line of sight, interior, etc.).
    fn is_player_visible(&self, player: PlayerId) -> bool;

    /// Display name, `None` when the player is not connected.
    fn player_name(&self, player: PlayerId) -> Option<&str>;
}

/// Screen resolution and base-unit conversion.
pub trait ScreenMetrics {
    fn screen_size(&self) -> Option<(f32, f32)>;

    fn base_to_screen_x(&self, base: f32) -> Option<f32> {
        self.screen_size().map(|(w, _)| base * w / BASE_WIDTH)
    }

    fn base_to_screen_y(&self, base: f32) -> Option<f32> {
        self.screen_size().map(|(_, h)| base * h / BASE_HEIGHT)
    }
}

/// A screen of known, fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScreen {
    pub width: f32,
    pub height: f32,
}

impl FixedScreen {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl ScreenMetrics for FixedScreen {
    fn screen_size(&self) -> Option<(f32, f32)> {
        if self.width > 0.0 && self.height > 0.0 {
            Some((self.width, self.height))
        } else {
            None
        }
    }
}

/// Where a player's icon lands this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub screen_x: f32,
    pub screen_y: f32,
    pub distance: f32,
}

/// Resolves per-player screen geometry against a live `WorldView`.
pub struct SpatialProjector<'w, W: WorldView + ?Sized> {
    world: &'w W,
}

impl<'w, W: WorldView + ?Sized> SpatialProjector<'w, W> {
    pub fn new(world: &'w W) -> Self {
        Self { world }
    }

    /// Camera-to-anchor distance, without projecting.
    pub fn measure(&self, player: PlayerId) -> Option<f32> {
        let camera = self.world.camera_position()?;
        let anchor = self.lifted_anchor(player)?;
        Some(camera.distance(anchor))
    }

    /// Full placement: distance plus screen position of the lifted anchor.
    pub fn resolve(&self, player: PlayerId) -> Option<Projection> {
        let camera = self.world.camera_position()?;
        let anchor = self.lifted_anchor(player)?;
        let (screen_x, screen_y) = self.world.project_to_screen(anchor)?;
        if !screen_x.is_finite() || !screen_y.is_finite() {
            return None;
        }
        Some(Projection {
            screen_x,
            screen_y,
            distance: camera.distance(anchor),
        })
    }

    fn lifted_anchor(&self, player: PlayerId) -> Option<Point3<f32>> {
        self.world
            .anchor_position(player)
            .map(|bone| bone + Vector3::new(0.0, 0.0, ANCHOR_LIFT))
    }
}

/// Inverse-distance factor; `1.0` at `REFERENCE_DISTANCE`.
pub fn distance_scale(distance: f32) -> f32 {
    REFERENCE_DISTANCE / distance.max(f32::EPSILON)
}

/// On-screen icon edge length in pixels.
pub fn icon_size(base_px: f32, user_scale: f32, distance: f32) -> f32 {
    base_px * user_scale * distance_scale(distance)
}
