//! Overlay tunables and persisted icon settings.
//!
//! `OverlayConfig` holds layout constants chosen by the host at startup.
//! `IconSettings` is the user-adjustable part, persisted through a
//! `ConfigStore`. Out-of-range values are clamped, never rejected.

pub mod store;

pub use store::{ConfigStore, JsonConfigStore, MemoryConfigStore};

use serde::{Deserialize, Serialize};

pub const ICON_OFFSET_MIN: i32 = -500;
pub const ICON_OFFSET_MAX: i32 = 500;
pub const ICON_SCALE_MIN: f32 = 0.2;
pub const ICON_SCALE_MAX: f32 = 2.0;

pub const DEFAULT_ICON_OFFSET_X: i32 = 0;
pub const DEFAULT_ICON_OFFSET_Y: i32 = 0;
pub const DEFAULT_ICON_SCALE: f32 = 1.0;

/// Layout configuration for `SpeakerOverlay`. Sizes are in base units
/// (640x480 reference screen) and converted per frame.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Maximum number of speaker rows. Default: 5.
    pub line_count: usize,
    /// Floating icon edge length at `REFERENCE_DISTANCE`. Default: 20.
    pub base_icon_size: f32,
    /// Speaker list font height. Default: 16.
    pub base_font_size: f32,
    /// Left margin of the speaker panel. Default: 20.
    pub base_left_inset: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            line_count: 5,
            base_icon_size: 20.0,
            base_font_size: 16.0,
            base_left_inset: 20.0,
        }
    }
}

/// Persisted, user-adjustable icon placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct IconSettings {
    /// Set once defaults have been written on first initialization.
    pub loaded: bool,
    pub icon_offset_x: i32,
    pub icon_offset_y: i32,
    pub icon_scale: f32,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            loaded: false,
            icon_offset_x: DEFAULT_ICON_OFFSET_X,
            icon_offset_y: DEFAULT_ICON_OFFSET_Y,
            icon_scale: DEFAULT_ICON_SCALE,
        }
    }
}

impl IconSettings {
    pub fn normalize(&mut self) {
        self.icon_offset_x = clamp_offset(self.icon_offset_x);
        self.icon_offset_y = clamp_offset(self.icon_offset_y);
        self.icon_scale = clamp_scale(self.icon_scale);
    }

    /// Restore default placement, keeping the `loaded` marker.
    pub fn reset(&mut self) {
        self.icon_offset_x = DEFAULT_ICON_OFFSET_X;
        self.icon_offset_y = DEFAULT_ICON_OFFSET_Y;
        self.icon_scale = DEFAULT_ICON_SCALE;
    }
}

pub fn clamp_offset(offset: i32) -> i32 {
    offset.clamp(ICON_OFFSET_MIN, ICON_OFFSET_MAX)
}

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return DEFAULT_ICON_SCALE;
    }
    scale.clamp(ICON_SCALE_MIN, ICON_SCALE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_offsets_and_scale() {
        assert_eq!(clamp_offset(-9999), -500);
        assert_eq!(clamp_offset(9999), 500);
        assert_eq!(clamp_offset(42), 42);
        assert_eq!(clamp_scale(5.0), 2.0);
        assert_eq!(clamp_scale(0.0), 0.2);
        assert_eq!(clamp_scale(f32::NAN), 1.0);
    }

    #[test]
    fn normalize_and_reset() {
        let mut s = IconSettings {
            loaded: true,
            icon_offset_x: 800,
            icon_offset_y: -800,
            icon_scale: 0.01,
        };
        s.normalize();
        assert_eq!((s.icon_offset_x, s.icon_offset_y, s.icon_scale), (500, -500, 0.2));

        s.reset();
        assert_eq!(s, IconSettings { loaded: true, ..IconSettings::default() });
    }

    #[test]
    fn settings_use_camel_case_and_fill_missing_fields() {
        let json = serde_json::to_value(IconSettings::default()).expect("serialize settings");
        assert_eq!(json["iconOffsetX"], 0);
        assert_eq!(json["loaded"], false);

        let partial: IconSettings =
            serde_json::from_str(r#"{"iconScale": 1.5}"#).expect("deserialize partial settings");
        assert_eq!(partial.icon_scale, 1.5);
        assert_eq!(partial.icon_offset_x, DEFAULT_ICON_OFFSET_X);
        assert!(!partial.loaded);
    }
}
