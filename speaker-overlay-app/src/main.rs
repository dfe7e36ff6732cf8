//! Headless speaker overlay demo.
//!
//! Drives `SpeakerOverlay` against a simulated world and random voice
//! traffic, drawing through a console GUI backend. Run with
//! `RUST_LOG=speaker_overlay=debug` to see every row and icon.
//!
//! ## Threads
//!
//! ```text
//! producer ──► bridge ──► Arc<StreamRegistry> ◄── main (frame loop)
//! ```

mod console_gui;
mod settings;
mod sim;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use console_gui::ConsoleGui;
use settings::{default_settings_path, load_settings, save_settings, AppSettings};
use sim::{spawn_bridge, spawn_producer, SimWorld, TrafficProfile, VoiceTraffic};
use speaker_overlay_core::{
    DeviceHandle, JsonConfigStore, OverlayConfig, OverlayStatusEvent, SpeakerOverlay,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

/// Stand-in bytes when no icon/font file is configured; the console
/// backend only checks they are non-empty.
const PLACEHOLDER_ICON: &[u8] = b"\x89PNG speaker";
const PLACEHOLDER_FONT: &[u8] = b"\x00\x01\x00\x00 speaker";

/// The simulated render device.
const SIM_DEVICE: usize = 0xd3d9;

/// How often the frame loop logs a summary line.
const REPORT_EVERY: u32 = 60;

fn main() -> anyhow::Result<()> {
    // ── Tracing ───────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("speaker_overlay=info")),
        )
        .init();

    info!("speaker overlay demo starting");

    let settings_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_settings_path);
    let app_settings = load_settings(&settings_path);
    if !settings_path.exists() {
        if let Err(e) = save_settings(&settings_path, &app_settings) {
            warn!("could not write default settings to {}: {e}", settings_path.display());
        }
    }
    let icon_settings_path = app_settings.resolved_icon_settings_path(&settings_path);
    info!(
        settings_path = ?settings_path,
        icon_settings_path = ?icon_settings_path,
        players = app_settings.simulated_players,
        frames = app_settings.frames,
        "runtime settings loaded"
    );

    run(&app_settings, icon_settings_path)
}

fn run(app: &AppSettings, icon_settings_path: PathBuf) -> anyhow::Result<()> {
    let icon_bytes = read_asset(app.icon_path.as_deref(), PLACEHOLDER_ICON)?;
    let font_bytes = read_asset(app.font_path.as_deref(), PLACEHOLDER_FONT)?;

    let config = OverlayConfig {
        line_count: app.line_count,
        ..OverlayConfig::default()
    };
    let mut overlay: SpeakerOverlay<ConsoleGui, JsonConfigStore> =
        SpeakerOverlay::new(config, JsonConfigStore::new(icon_settings_path));
    let mut status_rx = overlay.subscribe_status();
    let mut gui = ConsoleGui::new();
    let mut world = SimWorld::new(
        app.simulated_players,
        app.screen_width,
        app.screen_height,
        app.seed,
    );

    overlay
        .init(
            &mut gui,
            DeviceHandle::from_raw(SIM_DEVICE),
            &icon_bytes,
            &font_bytes,
            &world,
        )
        .context("initializing speaker overlay")?;
    overlay.show();
    info!(icon = ?overlay.icon_settings(), players = world.player_count(), "overlay ready");

    // ── Voice traffic ─────────────────────────────────────────────────────
    let frame_interval = Duration::from_millis(app.frame_interval_ms);
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = crossbeam_channel::bounded(1024);
    let producer = spawn_producer(
        VoiceTraffic::new(TrafficProfile {
            players: app.simulated_players,
            talk_probability: app.talk_probability,
            stop_probability: app.stop_probability,
            tick: frame_interval.max(Duration::from_millis(1)),
            seed: app.seed,
        }),
        tx,
        Arc::clone(&stop),
    );
    let bridge = spawn_bridge(rx, overlay.registry());

    // ── Frame loop ────────────────────────────────────────────────────────
    let started = Instant::now();
    let mut last = started;
    let mut rendered = 0u32;
    let mut total_rows = 0usize;
    for frame in 1..=app.frames {
        let now = Instant::now();
        world.advance(now.duration_since(last).as_secs_f32());
        last = now;

        if let Some(stats) = overlay.render(&mut gui, &world, &world) {
            rendered += 1;
            total_rows += stats.rows;
            if frame % REPORT_EVERY == 0 {
                let drawn = gui.last_frame();
                info!(
                    frame,
                    rows = stats.rows,
                    world_icons = stats.world_icons,
                    tokens = stats.tokens,
                    texts_drawn = drawn.texts,
                    images_drawn = drawn.images + drawn.world_images,
                    speaking = overlay.registry().speaking_players().len(),
                    "frame"
                );
            }
        }
        drain_status(&mut status_rx, log_status);
        thread::sleep(frame_interval);
    }

    // ── Shutdown ──────────────────────────────────────────────────────────
    stop.store(true, Ordering::Relaxed);
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("voice traffic producer panicked"))?;
    let applied = bridge
        .join()
        .map_err(|_| anyhow::anyhow!("stream bridge panicked"))?;

    overlay.hide();
    overlay.free();
    drain_status(&mut status_rx, log_status);

    let diag = overlay.registry().diagnostics();
    let (textures, fonts) = gui.live_handles();
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        rendered,
        avg_rows = if rendered > 0 { total_rows as f32 / rendered as f32 } else { 0.0 },
        applied,
        starts = diag.starts,
        stops = diag.stops,
        dropped = diag.dropped_out_of_range,
        "demo finished"
    );
    if textures + fonts > 0 {
        warn!(textures, fonts, "GUI handles still alive after free");
    }
    Ok(())
}

fn read_asset(path: Option<&Path>, placeholder: &[u8]) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => Ok(placeholder.to_vec()),
    }
}

fn log_status(event: OverlayStatusEvent) {
    match event.detail {
        Some(detail) => info!(status = ?event.status, %detail, "overlay status"),
        None => info!(status = ?event.status, "overlay status"),
    }
}

/// Non-blocking drain of the status channel; lagged gaps are skipped.
fn drain_status(rx: &mut broadcast::Receiver<OverlayStatusEvent>, mut sink: impl FnMut(OverlayStatusEvent)) {
    loop {
        match rx.try_recv() {
            Ok(event) => sink(event),
            Err(TryRecvError::Lagged(skipped)) => debug!(skipped, "status events lagged"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return,
        }
    }
}
