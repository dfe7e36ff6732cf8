//! Immediate-mode GUI substrate abstraction.
//!
//! The overlay draws through `GuiBackend` only. A backend is expected to
//! wrap an ImGui-style context on the host's render device; the demo host
//! ships a console backend and tests use an in-memory recorder.
//!
//! Textures and fonts are owned values (`GuiBackend::Texture`,
//! `GuiBackend::Font`) that release their device resources on `Drop`.

use std::num::NonZeroUsize;
use std::ops::BitOr;

use crate::error::Result;

pub type Vec2 = cgmath::Vector2<f32>;

/// Raw, non-null handle to the host's render device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle(NonZeroUsize);

impl DeviceHandle {
    /// `None` for a null handle.
    pub fn from_raw(raw: usize) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

/// Glyph set to rasterize when building a font atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphRange {
    Default,
    /// Latin plus Vietnamese diacritics; covers most player names.
    Vietnamese,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleVar {
    FramePadding,
    WindowPadding,
    ItemInnerSpacing,
    ItemSpacing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowFlags(u32);

impl WindowFlags {
    pub const NONE: Self = Self(0);
    pub const NO_COLLAPSE: Self = Self(1 << 0);
    pub const NO_FOCUS_ON_APPEARING: Self = Self(1 << 1);
    pub const NO_TITLE_BAR: Self = Self(1 << 2);
    pub const NO_BACKGROUND: Self = Self(1 << 3);
    pub const NO_SAVED_SETTINGS: Self = Self(1 << 4);
    pub const NO_SCROLLBAR: Self = Self(1 << 5);
    pub const NO_MOVE: Self = Self(1 << 6);
    pub const NO_RESIZE: Self = Self(1 << 7);
    pub const NO_INPUTS: Self = Self(1 << 8);

    /// A passive HUD panel: undecorated, immovable, never takes input or focus.
    pub const PASSIVE_PANEL: Self = Self(
        Self::NO_COLLAPSE.0
            | Self::NO_FOCUS_ON_APPEARING.0
            | Self::NO_TITLE_BAR.0
            | Self::NO_BACKGROUND.0
            | Self::NO_SAVED_SETTINGS.0
            | Self::NO_SCROLLBAR.0
            | Self::NO_MOVE.0
            | Self::NO_RESIZE.0
            | Self::NO_INPUTS.0,
    );

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WindowFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Contract for GUI substrates the overlay can draw with.
///
/// All drawing methods are called from the render thread between
/// `begin_frame` and `end_frame`.
pub trait GuiBackend {
    type Texture;
    type Font;

    /// Whether the GUI context exists and can build fonts/textures.
    fn is_ready(&self) -> bool;

    /// Decode image bytes into a device texture.
    ///
    /// # Errors
    /// `OverlayError::IconTexture` when the bytes cannot be decoded or uploaded.
    fn create_texture(&mut self, device: DeviceHandle, bytes: &[u8]) -> Result<Self::Texture>;

    /// Build a font from TTF bytes at `pixel_size` screen pixels.
    ///
    /// # Errors
    /// `OverlayError::FontBuild` when the atlas cannot be built.
    fn create_font(&mut self, bytes: &[u8], pixel_size: f32, glyphs: GlyphRange) -> Result<Self::Font>;

    fn begin_frame(&mut self);
    fn end_frame(&mut self);

    fn push_font(&mut self, font: &Self::Font);
    fn pop_font(&mut self);

    fn push_style_var(&mut self, var: StyleVar, value: Vec2);
    fn pop_style_var(&mut self, count: usize);

    /// Height of one text line in the current font.
    fn text_line_height(&self) -> f32;

    /// Returns `false` if the window is clipped and its contents should be
    /// skipped. `end_window` must be called either way.
    fn begin_window(&mut self, name: &str, pos: Vec2, size: Vec2, flags: WindowFlags) -> bool;
    fn end_window(&mut self);

    fn columns(&mut self, count: usize);
    fn set_column_width(&mut self, column: usize, width: f32);
    fn set_column_offset(&mut self, column: usize, offset: f32);
    fn next_column(&mut self);

    fn push_id(&mut self, id: u64);
    fn pop_id(&mut self);

    /// `color` is RGBA in `[0, 1]`.
    fn text_colored(&mut self, color: [f32; 4], text: &str);

    /// Inline image at the cursor.
    fn image(&mut self, texture: &Self::Texture, size: Vec2);
    fn same_line(&mut self);

    /// Image at an absolute screen position, outside any window.
    fn draw_world_image(&mut self, texture: &Self::Texture, pos: Vec2, size: Vec2);
}
