//! Ownership of the speaker icon texture and list font.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──init()──► Initialized ──free()──► Uninitialized
//!       ▲                        │
//!       └──── init() error ──────┘ (nothing acquired survives)
//! ```
//!
//! Handles are owned backend values that release on `Drop`. The icon is
//! held in a local until the font also succeeds, so an early return on any
//! later step drops it.

use tracing::{error, info};

use crate::error::{OverlayError, Result};
use crate::gui::{DeviceHandle, GlyphRange, GuiBackend};
use crate::projector::ScreenMetrics;

/// Glyphs the speaker font is built with.
pub const SPEAKER_GLYPHS: GlyphRange = GlyphRange::Vietnamese;

pub struct LoadedResources<G: GuiBackend> {
    pub icon: G::Texture,
    pub font: G::Font,
}

pub struct OverlayResources<G: GuiBackend> {
    loaded: Option<LoadedResources<G>>,
}

impl<G: GuiBackend> OverlayResources<G> {
    pub fn new() -> Self {
        Self { loaded: None }
    }

    pub fn is_initialized(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn get(&self) -> Option<&LoadedResources<G>> {
        self.loaded.as_ref()
    }

    /// Acquire the icon texture and the font.
    ///
    /// # Errors
    /// - `NullDevice` if `device` is `None`.
    /// - `AlreadyInitialized` if resources are already held.
    /// - `GuiNotReady` if the backend has no live context.
    /// - `FontSizeConversion` when the screen metrics are unavailable.
    /// - Whatever the backend returns from texture or font creation
    ///   (`IconTexture`, `FontBuild`).
    pub fn init(
        &mut self,
        gui: &mut G,
        device: Option<DeviceHandle>,
        icon_bytes: &[u8],
        font_bytes: &[u8],
        base_font_size: f32,
        screen: &dyn ScreenMetrics,
    ) -> Result<()> {
        let device = device.ok_or(OverlayError::NullDevice)?;
        if self.loaded.is_some() {
            return Err(OverlayError::AlreadyInitialized);
        }
        if !gui.is_ready() {
            return Err(OverlayError::GuiNotReady);
        }

        let icon = gui
            .create_texture(device, icon_bytes)
            .inspect_err(|e| error!("speaker icon: {e}"))?;

        let font_px = screen.base_to_screen_y(base_font_size).ok_or_else(|| {
            error!(base_font_size, "failed to convert font size");
            OverlayError::FontSizeConversion {
                base: base_font_size,
            }
        })?;

        let font = gui
            .create_font(font_bytes, font_px, SPEAKER_GLYPHS)
            .inspect_err(|e| error!("speaker font: {e}"))?;

        self.loaded = Some(LoadedResources { icon, font });
        info!(font_px, "speaker resources loaded");
        Ok(())
    }

    /// Release both handles. Returns `false` if nothing was held.
    pub fn free(&mut self) -> bool {
        match self.loaded.take() {
            Some(resources) => {
                drop(resources);
                info!("speaker resources released");
                true
            }
            None => false,
        }
    }
}

impl<G: GuiBackend> Default for OverlayResources<G> {
    fn default() -> Self {
        Self::new()
    }
}
