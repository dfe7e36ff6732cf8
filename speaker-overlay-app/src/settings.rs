//! Demo host settings (JSON file in the app data directory).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    pub frames: u32,
    pub frame_interval_ms: u64,
    pub simulated_players: u16,
    pub line_count: usize,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Per-tick chance that a silent player starts talking.
    pub talk_probability: f64,
    /// Per-tick chance that a talking player stops.
    pub stop_probability: f64,
    pub seed: u64,
    pub icon_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    /// Where the overlay persists icon offset/scale. `None` = next to this file.
    pub icon_settings_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            frames: 300,
            frame_interval_ms: 16,
            simulated_players: 12,
            line_count: 5,
            screen_width: 1920.0,
            screen_height: 1080.0,
            talk_probability: 0.05,
            stop_probability: 0.03,
            seed: 0x5eed,
            icon_path: None,
            font_path: None,
            icon_settings_path: None,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.frames = self.frames.clamp(1, 1_000_000);
        self.frame_interval_ms = self.frame_interval_ms.min(1_000);
        self.simulated_players = self.simulated_players.clamp(1, 200);
        self.line_count = self.line_count.clamp(1, 32);
        if !(self.screen_width >= 320.0) {
            self.screen_width = 1920.0;
        }
        if !(self.screen_height >= 240.0) {
            self.screen_height = 1080.0;
        }
        self.talk_probability = normalize_probability(self.talk_probability, 0.05);
        self.stop_probability = normalize_probability(self.stop_probability, 0.03);
        self.icon_path = normalize_path(self.icon_path.take());
        self.font_path = normalize_path(self.font_path.take());
        self.icon_settings_path = normalize_path(self.icon_settings_path.take());
    }

    pub fn resolved_icon_settings_path(&self, settings_path: &Path) -> PathBuf {
        self.icon_settings_path.clone().unwrap_or_else(|| {
            settings_path
                .parent()
                .map(|dir| dir.join("speaker_icon.json"))
                .unwrap_or_else(|| PathBuf::from("speaker_icon.json"))
        })
    }
}

fn normalize_probability(raw: f64, fallback: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

fn normalize_path(raw: Option<PathBuf>) -> Option<PathBuf> {
    raw.filter(|p| !p.as_os_str().is_empty())
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Lattice Labs")
            .join("SpeakerOverlay")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("speaker-overlay")
            .join("settings.json")
    }
}

pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_and_repairs() {
        let mut s = AppSettings {
            frames: 0,
            simulated_players: 5000,
            line_count: 0,
            screen_width: f32::NAN,
            talk_probability: 3.0,
            stop_probability: f64::NAN,
            icon_path: Some(PathBuf::new()),
            ..AppSettings::default()
        };
        s.normalize();
        assert_eq!(s.frames, 1);
        assert_eq!(s.simulated_players, 200);
        assert_eq!(s.line_count, 1);
        assert_eq!(s.screen_width, 1920.0);
        assert_eq!(s.talk_probability, 1.0);
        assert_eq!(s.stop_probability, 0.03);
        assert!(s.icon_path.is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let settings = AppSettings {
            frames: 42,
            seed: 7,
            ..AppSettings::default()
        };
        save_settings(&path, &settings).unwrap();

        let loaded = load_settings(&path);
        assert_eq!(loaded.frames, 42);
        assert_eq!(loaded.seed, 7);
        assert_eq!(
            loaded.resolved_icon_settings_path(&path),
            dir.path().join("cfg").join("speaker_icon.json")
        );
    }

    #[test]
    fn missing_file_uses_defaults() {
        let loaded = load_settings(Path::new("/definitely/not/here/settings.json"));
        assert_eq!(loaded.frames, AppSettings::default().frames);
    }
}
