//! In-crate test doubles for the world and GUI collaborators.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use cgmath::Point3;

use crate::error::{OverlayError, Result};
use crate::gui::{DeviceHandle, GlyphRange, GuiBackend, StyleVar, Vec2, WindowFlags};
use crate::projector::WorldView;
use crate::stream::PlayerId;

pub(crate) struct MockPlayer {
    pub name: String,
    pub head: Option<Point3<f32>>,
    pub visible: bool,
}

/// Camera at `(0, 0, 1)` looking along `+y`. A player placed at distance
/// `d` has its head at `(0, d, 0)`, so the lifted anchor is exactly `d`
/// away.
pub(crate) struct MockWorld {
    pub camera: Option<Point3<f32>>,
    pub players: HashMap<u16, MockPlayer>,
    pub name_queries: Cell<usize>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self {
            camera: Some(Point3::new(0.0, 0.0, 1.0)),
            players: HashMap::new(),
            name_queries: Cell::new(0),
        }
    }

    pub fn with_player(mut self, raw: u16, name: &str, distance: f32) -> Self {
        self.players.insert(
            raw,
            MockPlayer {
                name: name.to_string(),
                head: Some(Point3::new(0.0, distance, 0.0)),
                visible: true,
            },
        );
        self
    }

    pub fn player_mut(&mut self, raw: u16) -> &mut MockPlayer {
        self.players.get_mut(&raw).expect("player placed in mock world")
    }
}

impl WorldView for MockWorld {
    fn camera_position(&self) -> Option<Point3<f32>> {
        self.camera
    }

    fn anchor_position(&self, player: PlayerId) -> Option<Point3<f32>> {
        self.players.get(&player.get()).and_then(|p| p.head)
    }

    fn project_to_screen(&self, point: Point3<f32>) -> Option<(f32, f32)> {
        let camera = self.camera?;
        if point.y <= camera.y {
            return None;
        }
        Some((320.0 + point.x * 10.0, 240.0 - point.z * 10.0))
    }

    fn is_player_visible(&self, player: PlayerId) -> bool {
        self.players
            .get(&player.get())
            .map(|p| p.visible)
            .unwrap_or(false)
    }

    fn player_name(&self, player: PlayerId) -> Option<&str> {
        self.name_queries.set(self.name_queries.get() + 1);
        self.players.get(&player.get()).map(|p| p.name.as_str())
    }
}

/// Live handle counters shared by every handle a `MockGui` hands out.
#[derive(Debug, Default)]
pub(crate) struct HandleCounts {
    pub textures: Cell<usize>,
    pub fonts: Cell<usize>,
}

pub(crate) struct MockTexture {
    counts: Rc<HandleCounts>,
}

impl Drop for MockTexture {
    fn drop(&mut self) {
        self.counts.textures.set(self.counts.textures.get() - 1);
    }
}

pub(crate) struct MockFont {
    counts: Rc<HandleCounts>,
}

impl Drop for MockFont {
    fn drop(&mut self) {
        self.counts.fonts.set(self.counts.fonts.get() - 1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawCall {
    WorldIcon { pos: Vec2, size: Vec2 },
    Text { alpha: u8, text: String },
    RowIcon { size: Vec2 },
}

pub(crate) struct MockGui {
    pub ready: bool,
    pub fail_texture: bool,
    pub fail_font: bool,
    pub counts: Rc<HandleCounts>,
    pub draws: RefCell<Vec<DrawCall>>,
    pub frames: Cell<usize>,
    pub style_depth: Cell<i32>,
    pub font_depth: Cell<i32>,
    pub id_depth: Cell<i32>,
}

impl MockGui {
    pub fn new() -> Self {
        Self {
            ready: true,
            fail_texture: false,
            fail_font: false,
            counts: Rc::new(HandleCounts::default()),
            draws: RefCell::new(Vec::new()),
            frames: Cell::new(0),
            style_depth: Cell::new(0),
            font_depth: Cell::new(0),
            id_depth: Cell::new(0),
        }
    }

    pub fn live_textures(&self) -> usize {
        self.counts.textures.get()
    }

    pub fn live_fonts(&self) -> usize {
        self.counts.fonts.get()
    }

    pub fn take_draws(&self) -> Vec<DrawCall> {
        std::mem::take(&mut *self.draws.borrow_mut())
    }
}

impl GuiBackend for MockGui {
    type Texture = MockTexture;
    type Font = MockFont;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn create_texture(&mut self, _device: DeviceHandle, bytes: &[u8]) -> Result<MockTexture> {
        if self.fail_texture || bytes.is_empty() {
            return Err(OverlayError::IconTexture("decode failed".into()));
        }
        self.counts.textures.set(self.counts.textures.get() + 1);
        Ok(MockTexture {
            counts: Rc::clone(&self.counts),
        })
    }

    fn create_font(&mut self, bytes: &[u8], _pixel_size: f32, _glyphs: GlyphRange) -> Result<MockFont> {
        if self.fail_font || bytes.is_empty() {
            return Err(OverlayError::FontBuild("glyph range build failed".into()));
        }
        self.counts.fonts.set(self.counts.fonts.get() + 1);
        Ok(MockFont {
            counts: Rc::clone(&self.counts),
        })
    }

    fn begin_frame(&mut self) {
        self.frames.set(self.frames.get() + 1);
    }

    fn end_frame(&mut self) {}

    fn push_font(&mut self, _font: &MockFont) {
        self.font_depth.set(self.font_depth.get() + 1);
    }

    fn pop_font(&mut self) {
        self.font_depth.set(self.font_depth.get() - 1);
    }

    fn push_style_var(&mut self, _var: StyleVar, _value: Vec2) {
        self.style_depth.set(self.style_depth.get() + 1);
    }

    fn pop_style_var(&mut self, count: usize) {
        self.style_depth.set(self.style_depth.get() - count as i32);
    }

    fn text_line_height(&self) -> f32 {
        16.0
    }

    fn begin_window(&mut self, _name: &str, _pos: Vec2, _size: Vec2, _flags: WindowFlags) -> bool {
        true
    }

    fn end_window(&mut self) {}

    fn columns(&mut self, _count: usize) {}

    fn set_column_width(&mut self, _column: usize, _width: f32) {}

    fn set_column_offset(&mut self, _column: usize, _offset: f32) {}

    fn next_column(&mut self) {}

    fn push_id(&mut self, _id: u64) {
        self.id_depth.set(self.id_depth.get() + 1);
    }

    fn pop_id(&mut self) {
        self.id_depth.set(self.id_depth.get() - 1);
    }

    fn text_colored(&mut self, color: [f32; 4], text: &str) {
        self.draws.borrow_mut().push(DrawCall::Text {
            alpha: (color[3] * 255.0).round() as u8,
            text: text.to_string(),
        });
    }

    fn image(&mut self, _texture: &MockTexture, size: Vec2) {
        self.draws.borrow_mut().push(DrawCall::RowIcon { size });
    }

    fn same_line(&mut self) {}

    fn draw_world_image(&mut self, _texture: &MockTexture, pos: Vec2, size: Vec2) {
        self.draws.borrow_mut().push(DrawCall::WorldIcon { pos, size });
    }
}
