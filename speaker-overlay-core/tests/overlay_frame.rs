use std::sync::Arc;
use std::thread;

use cgmath::Point3;
use speaker_overlay_core::{
    DeviceHandle, FixedScreen, FrameStats, GlyphRange, GuiBackend, MemoryConfigStore,
    OverlayConfig, PlayerId, SpeakerOverlay, StreamDescriptor, StreamId, StyleVar, Vec2,
    WindowFlags, WorldView,
};

/// Records only what the assertions need.
#[derive(Default)]
struct RecordingGui {
    texts: Vec<String>,
    row_icons: usize,
    world_icons: Vec<(Vec2, Vec2)>,
}

struct Handle;

impl GuiBackend for RecordingGui {
    type Texture = Handle;
    type Font = Handle;

    fn is_ready(&self) -> bool {
        true
    }

    fn create_texture(&mut self, _device: DeviceHandle, _bytes: &[u8]) -> speaker_overlay_core::error::Result<Handle> {
        Ok(Handle)
    }

    fn create_font(&mut self, _bytes: &[u8], _px: f32, _glyphs: GlyphRange) -> speaker_overlay_core::error::Result<Handle> {
        Ok(Handle)
    }

    fn begin_frame(&mut self) {
        self.texts.clear();
        self.row_icons = 0;
        self.world_icons.clear();
    }

    fn end_frame(&mut self) {}
    fn push_font(&mut self, _font: &Handle) {}
    fn pop_font(&mut self) {}
    fn push_style_var(&mut self, _var: StyleVar, _value: Vec2) {}
    fn pop_style_var(&mut self, _count: usize) {}

    fn text_line_height(&self) -> f32 {
        14.0
    }

    fn begin_window(&mut self, _name: &str, _pos: Vec2, _size: Vec2, _flags: WindowFlags) -> bool {
        true
    }

    fn end_window(&mut self) {}
    fn columns(&mut self, _count: usize) {}
    fn set_column_width(&mut self, _column: usize, _width: f32) {}
    fn set_column_offset(&mut self, _column: usize, _offset: f32) {}
    fn next_column(&mut self) {}
    fn push_id(&mut self, _id: u64) {}
    fn pop_id(&mut self) {}

    fn text_colored(&mut self, _color: [f32; 4], text: &str) {
        self.texts.push(text.to_string());
    }

    fn image(&mut self, _texture: &Handle, _size: Vec2) {
        self.row_icons += 1;
    }

    fn same_line(&mut self) {}

    fn draw_world_image(&mut self, _texture: &Handle, pos: Vec2, size: Vec2) {
        self.world_icons.push((pos, size));
    }
}

/// Camera at the origin looking along +y; one player standing on the y axis.
struct Street {
    player_distance: f32,
}

impl WorldView for Street {
    fn camera_position(&self) -> Option<Point3<f32>> {
        Some(Point3::new(0.0, 0.0, 1.0))
    }

    fn anchor_position(&self, player: PlayerId) -> Option<Point3<f32>> {
        (player.get() == 12).then(|| Point3::new(0.0, self.player_distance, 0.0))
    }

    fn project_to_screen(&self, point: Point3<f32>) -> Option<(f32, f32)> {
        (point.y > 0.0).then_some((400.0, 300.0))
    }

    fn is_player_visible(&self, player: PlayerId) -> bool {
        player.get() == 12
    }

    fn player_name(&self, player: PlayerId) -> Option<&str> {
        (player.get() == 12).then_some("Big_Smoke")
    }
}

fn ready_overlay(gui: &mut RecordingGui) -> SpeakerOverlay<RecordingGui, MemoryConfigStore> {
    let mut overlay = SpeakerOverlay::new(OverlayConfig::default(), MemoryConfigStore::default());
    overlay
        .init(
            gui,
            DeviceHandle::from_raw(0xd3d9),
            b"icon",
            b"font",
            &FixedScreen::new(800.0, 600.0),
        )
        .expect("init overlay");
    overlay.show();
    overlay
}

#[test]
fn audible_speaker_gets_row_token_and_floating_icon() {
    let mut gui = RecordingGui::default();
    let mut overlay = ready_overlay(&mut gui);
    overlay.on_stream_start(StreamId(0xabc), 12, StreamDescriptor::at_player(10.0, 0xffff_ffff));

    let world = Street {
        player_distance: 5.0,
    };
    let stats = overlay
        .render(&mut gui, &world, &FixedScreen::new(800.0, 600.0))
        .expect("frame rendered");

    assert_eq!(
        stats,
        FrameStats {
            rows: 1,
            world_icons: 1,
            tokens: 1
        }
    );
    assert_eq!(gui.texts, vec!["Big_Smoke (12)".to_string()]);
    assert_eq!(gui.row_icons, 1);
    assert_eq!(gui.world_icons.len(), 1);
}

#[test]
fn speaker_beyond_range_is_not_drawn_but_stays_registered() {
    let mut gui = RecordingGui::default();
    let mut overlay = ready_overlay(&mut gui);
    overlay.on_stream_start(StreamId(0xabc), 12, StreamDescriptor::at_player(10.0, 0xffff_ffff));

    let world = Street {
        player_distance: 15.0,
    };
    let stats = overlay
        .render(&mut gui, &world, &FixedScreen::new(800.0, 600.0))
        .expect("frame rendered");

    assert_eq!(stats, FrameStats::default());
    assert!(gui.texts.is_empty());
    assert!(gui.world_icons.is_empty());

    let registry = overlay.registry();
    assert!(registry.is_speaking(PlayerId::new(12).unwrap()));
}

#[test]
fn producer_thread_feeds_registry_while_frames_render() {
    let mut gui = RecordingGui::default();
    let mut overlay = ready_overlay(&mut gui);
    let registry = overlay.registry();
    let (tx, rx) = crossbeam_channel::bounded::<(bool, u64)>(64);

    let producer = thread::spawn(move || {
        for i in 0..200u64 {
            tx.send((true, i)).expect("send start");
            tx.send((false, i)).expect("send stop");
        }
    });

    let bridge = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for (start, id) in rx {
                if start {
                    registry.on_stream_start(
                        StreamId(id),
                        12,
                        StreamDescriptor::at_player(10.0, 0xffff_ffff),
                    );
                } else {
                    registry.on_stream_stop(StreamId(id), 12);
                }
            }
        })
    };

    let world = Street {
        player_distance: 5.0,
    };
    let screen = FixedScreen::new(800.0, 600.0);
    for _ in 0..100 {
        let stats = overlay.render(&mut gui, &world, &screen).expect("frame rendered");
        assert!(stats.rows <= 1);
        assert_eq!(stats.tokens, gui.row_icons);
    }

    producer.join().expect("producer thread panicked");
    bridge.join().expect("bridge thread panicked");

    assert!(!registry.is_speaking(PlayerId::new(12).unwrap()));
    let diag = registry.diagnostics();
    assert_eq!((diag.starts, diag.stops), (200, 200));
}
