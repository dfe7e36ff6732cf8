//! Per-frame composition of the speaker panel and floating icons.
//!
//! ## Frame
//!
//! ```text
//! screen metrics ─► PanelLayout
//! registry + world ─► PresentationRanker ─► DisplaySlot*
//!                                              │
//!                       ┌──────────────────────┼──────────────────────┐
//!                       ▼                      ▼                      ▼
//!               floating world icon     "<name> (<id>)" text    one row icon per token
//! ```
//!
//! The renderer only reads the registry. It owns two reusable buffers
//! (stream scratch and row text) so steady-state frames do not allocate.

use std::fmt::Write as _;

use tracing::trace;

use crate::config::{IconSettings, OverlayConfig};
use crate::gui::{GuiBackend, StyleVar, Vec2, WindowFlags};
use crate::projector::{distance_scale, icon_size, ScreenMetrics, WorldView};
use crate::ranking::{DisplaySlot, PresentationRanker};
use crate::registry::StreamRegistry;
use crate::resources::LoadedResources;
use crate::stream::{StreamDescriptor, StreamId};

pub const WINDOW_NAME: &str = "speakerListWindow";

const WINDOW_PADDING: (f32, f32) = (4.0, 8.0);
const FRAME_PADDING: (f32, f32) = (4.0, 8.0);
const ITEM_PADDING: (f32, f32) = (4.0, 8.0);

/// Panel height reserves this many window paddings around the rows.
const PADDING_ROWS: f32 = 5.0;
/// Vertical placement divisor: the panel sits slightly below centre.
const VERTICAL_BIAS: f32 = 1.4;
const NAME_COLUMN_SHARE: f32 = 0.5;
const ICON_COLUMN_SHARE: f32 = 0.2;

/// Panel geometry, recomputed from the live resolution every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub pos: Vec2,
    pub size: Vec2,
    pub name_width: f32,
    pub icon_width: f32,
    pub name_offset: f32,
    pub icon_offset: f32,
}

impl PanelLayout {
    pub fn compute(
        screen_width: f32,
        screen_height: f32,
        left_inset: f32,
        line_height: f32,
        lines: usize,
    ) -> Self {
        let width = screen_width / 5.0 - left_inset;
        let height =
            PADDING_ROWS * WINDOW_PADDING.1 + lines as f32 * (line_height + FRAME_PADDING.1);
        let name_width = NAME_COLUMN_SHARE * width;

        Self {
            pos: Vec2::new(left_inset, (screen_height - height) / VERTICAL_BIAS),
            size: Vec2::new(width, height),
            name_width,
            icon_width: ICON_COLUMN_SHARE * width,
            name_offset: WINDOW_PADDING.0,
            icon_offset: WINDOW_PADDING.0 + name_width + FRAME_PADDING.0,
        }
    }
}

/// What one frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rows: usize,
    pub world_icons: usize,
    pub tokens: usize,
}

/// Draws the speaker overlay. Holds only reusable per-frame buffers.
pub struct OverlayRenderer {
    scratch: Vec<(StreamId, StreamDescriptor)>,
    row_text: String,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self {
            scratch: Vec::with_capacity(8),
            row_text: String::with_capacity(64),
        }
    }

    /// Draw one frame. Returns `None` without touching the GUI when the
    /// screen metrics are unavailable this frame.
    #[allow(clippy::too_many_arguments)]
    pub fn render<G, W>(
        &mut self,
        gui: &mut G,
        world: &W,
        screen: &dyn ScreenMetrics,
        registry: &StreamRegistry,
        resources: &LoadedResources<G>,
        config: &OverlayConfig,
        icon: &IconSettings,
    ) -> Option<FrameStats>
    where
        G: GuiBackend,
        W: WorldView + ?Sized,
    {
        let left_inset = screen.base_to_screen_x(config.base_left_inset)?;
        let icon_base = screen.base_to_screen_y(config.base_icon_size)?;
        let (screen_width, screen_height) = screen.screen_size()?;

        let mut stats = FrameStats::default();

        gui.begin_frame();
        gui.push_font(&resources.font);

        let line_height = gui.text_line_height();
        let layout = PanelLayout::compute(
            screen_width,
            screen_height,
            left_inset,
            line_height,
            config.line_count,
        );

        gui.push_style_var(StyleVar::FramePadding, pair(FRAME_PADDING));
        gui.push_style_var(StyleVar::WindowPadding, pair(WINDOW_PADDING));
        gui.push_style_var(StyleVar::ItemInnerSpacing, pair(ITEM_PADDING));
        gui.push_style_var(StyleVar::ItemSpacing, pair(ITEM_PADDING));

        if gui.begin_window(WINDOW_NAME, layout.pos, layout.size, WindowFlags::PASSIVE_PANEL) {
            gui.columns(2);
            gui.set_column_width(0, layout.name_width);
            gui.set_column_width(1, layout.icon_width);
            gui.set_column_offset(0, layout.name_offset);
            gui.set_column_offset(1, layout.icon_offset);

            let ranker = PresentationRanker::new(config.line_count);
            for slot in ranker.rank(registry, world, &mut self.scratch) {
                if draw_world_icon(gui, resources, &slot, icon_base, icon) {
                    stats.world_icons += 1;
                }

                gui.push_id(slot.player.get() as u64);

                self.row_text.clear();
                let _ = write!(self.row_text, "{} ({})", slot.name, slot.player);
                gui.text_colored([1.0, 1.0, 1.0, slot.alpha as f32 / 255.0], &self.row_text);
                gui.next_column();

                for token in 0..slot.token_count {
                    gui.push_id(token as u64);
                    gui.image(&resources.icon, Vec2::new(line_height, line_height));
                    gui.same_line();
                    gui.pop_id();
                }
                stats.tokens += slot.token_count;

                gui.next_column();
                gui.pop_id();
                stats.rows += 1;
            }
        }
        gui.end_window();

        gui.pop_style_var(4);
        gui.pop_font();
        gui.end_frame();

        trace!(
            rows = stats.rows,
            world_icons = stats.world_icons,
            tokens = stats.tokens,
            "speaker overlay frame"
        );
        Some(stats)
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_world_icon<G: GuiBackend>(
    gui: &mut G,
    resources: &LoadedResources<G>,
    slot: &DisplaySlot<'_>,
    icon_base: f32,
    icon: &IconSettings,
) -> bool {
    let Some(projection) = slot.projection else {
        return false;
    };
    let size = icon_size(icon_base, icon.icon_scale, projection.distance);
    let scale = distance_scale(projection.distance);
    let x = projection.screen_x - size / 2.0 + icon.icon_offset_x as f32 * scale;
    let y = projection.screen_y - size / 2.0 + icon.icon_offset_y as f32 * scale;
    gui.draw_world_image(&resources.icon, Vec2::new(x, y), Vec2::new(size, size));
    true
}

fn pair((x, y): (f32, f32)) -> Vec2 {
    Vec2::new(x, y)
}
