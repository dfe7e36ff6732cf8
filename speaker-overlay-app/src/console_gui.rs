//! Headless `GuiBackend`: draw calls go to the log instead of a device.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use speaker_overlay_core::error::Result;
use speaker_overlay_core::{
    DeviceHandle, GlyphRange, GuiBackend, OverlayError, StyleVar, Vec2, WindowFlags,
};
use tracing::{debug, trace};

/// Decrements the owning backend's live-handle counter on drop.
#[derive(Debug)]
struct LiveHandle(Arc<AtomicUsize>);

impl LiveHandle {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(Arc::clone(counter))
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub struct ConsoleTexture {
    _live: LiveHandle,
}

#[derive(Debug)]
pub struct ConsoleFont {
    pub pixel_size: f32,
    _live: LiveHandle,
}

/// Per-frame draw tallies, reset by `begin_frame`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawCounts {
    pub texts: usize,
    pub images: usize,
    pub world_images: usize,
}

#[derive(Debug)]
pub struct ConsoleGui {
    live_textures: Arc<AtomicUsize>,
    live_fonts: Arc<AtomicUsize>,
    font_stack: Vec<f32>,
    frame: u64,
    counts: DrawCounts,
}

impl ConsoleGui {
    pub fn new() -> Self {
        Self {
            live_textures: Arc::new(AtomicUsize::new(0)),
            live_fonts: Arc::new(AtomicUsize::new(0)),
            font_stack: Vec::new(),
            frame: 0,
            counts: DrawCounts::default(),
        }
    }

    pub fn live_handles(&self) -> (usize, usize) {
        (
            self.live_textures.load(Ordering::Relaxed),
            self.live_fonts.load(Ordering::Relaxed),
        )
    }

    pub fn last_frame(&self) -> DrawCounts {
        self.counts
    }
}

impl Default for ConsoleGui {
    fn default() -> Self {
        Self::new()
    }
}

impl GuiBackend for ConsoleGui {
    type Texture = ConsoleTexture;
    type Font = ConsoleFont;

    fn is_ready(&self) -> bool {
        true
    }

    fn create_texture(&mut self, device: DeviceHandle, bytes: &[u8]) -> Result<ConsoleTexture> {
        if bytes.is_empty() {
            return Err(OverlayError::IconTexture("empty image data".into()));
        }
        debug!(device = device.as_raw(), bytes = bytes.len(), "texture created");
        Ok(ConsoleTexture {
            _live: LiveHandle::acquire(&self.live_textures),
        })
    }

    fn create_font(&mut self, bytes: &[u8], pixel_size: f32, glyphs: GlyphRange) -> Result<ConsoleFont> {
        if bytes.is_empty() {
            return Err(OverlayError::FontBuild("empty font data".into()));
        }
        debug!(pixel_size, ?glyphs, "font built");
        Ok(ConsoleFont {
            pixel_size,
            _live: LiveHandle::acquire(&self.live_fonts),
        })
    }

    fn begin_frame(&mut self) {
        self.frame += 1;
        self.counts = DrawCounts::default();
        trace!(frame = self.frame, "begin frame");
    }

    fn end_frame(&mut self) {
        trace!(frame = self.frame, counts = ?self.counts, "end frame");
    }

    fn push_font(&mut self, font: &ConsoleFont) {
        self.font_stack.push(font.pixel_size);
    }

    fn pop_font(&mut self) {
        self.font_stack.pop();
    }

    fn push_style_var(&mut self, _var: StyleVar, _value: Vec2) {}
    fn pop_style_var(&mut self, _count: usize) {}

    fn text_line_height(&self) -> f32 {
        self.font_stack.last().copied().unwrap_or(13.0)
    }

    fn begin_window(&mut self, name: &str, pos: Vec2, size: Vec2, flags: WindowFlags) -> bool {
        trace!(name, x = pos.x, y = pos.y, w = size.x, h = size.y, flags = flags.bits(), "window");
        true
    }

    fn end_window(&mut self) {}
    fn columns(&mut self, _count: usize) {}
    fn set_column_width(&mut self, _column: usize, _width: f32) {}
    fn set_column_offset(&mut self, _column: usize, _offset: f32) {}
    fn next_column(&mut self) {}
    fn push_id(&mut self, _id: u64) {}
    fn pop_id(&mut self) {}

    fn text_colored(&mut self, color: [f32; 4], text: &str) {
        self.counts.texts += 1;
        debug!(frame = self.frame, alpha = color[3], "row: {text}");
    }

    fn image(&mut self, _texture: &ConsoleTexture, size: Vec2) {
        self.counts.images += 1;
        trace!(w = size.x, h = size.y, "token");
    }

    fn same_line(&mut self) {}

    fn draw_world_image(&mut self, _texture: &ConsoleTexture, pos: Vec2, size: Vec2) {
        self.counts.world_images += 1;
        debug!(frame = self.frame, x = pos.x, y = pos.y, size = size.x, "world icon");
    }
}
