//! `SpeakerOverlay`: top-level handle the host plugin talks to.
//!
//! ## Lifecycle
//!
//! ```text
//! SpeakerOverlay::new(config, store)
//!     └─► init(gui, device, icon, font, screen)  → resources loaded, status = Initialized
//!         └─► show()                               → status = Shown
//!             └─► render(gui, world, screen)       → once per frame
//!         └─► free()                               → status = Uninitialized
//! ```
//!
//! ## Threading
//!
//! Stream events may arrive on any thread: hand producers `registry()`
//! (an `Arc<StreamRegistry>`) or call `on_stream_start`/`on_stream_stop`
//! through a shared reference. `render` runs on the render thread only and
//! takes `&mut self` for its reusable buffers. The visibility flag is an
//! atomic so the idle check costs one load.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    config::{clamp_offset, clamp_scale, ConfigStore, IconSettings, OverlayConfig},
    error::{OverlayError, Result},
    gui::{DeviceHandle, GuiBackend},
    ipc::events::{OverlayStatus, OverlayStatusEvent},
    projector::{ScreenMetrics, WorldView},
    registry::StreamRegistry,
    render::{FrameStats, OverlayRenderer},
    resources::OverlayResources,
    stream::{StreamDescriptor, StreamId},
};

/// Status channel capacity; slow subscribers lag rather than block.
const STATUS_CAP: usize = 32;

pub struct SpeakerOverlay<G: GuiBackend, S: ConfigStore> {
    config: OverlayConfig,
    registry: Arc<StreamRegistry>,
    resources: OverlayResources<G>,
    renderer: OverlayRenderer,
    shown: AtomicBool,
    /// Working copy of the persisted icon settings.
    icon: Mutex<IconSettings>,
    store: Mutex<S>,
    status_tx: broadcast::Sender<OverlayStatusEvent>,
}

impl<G: GuiBackend, S: ConfigStore> SpeakerOverlay<G, S> {
    /// Create an overlay with its own registry. Nothing is loaded until `init()`.
    pub fn new(config: OverlayConfig, store: S) -> Self {
        Self::with_registry(config, store, Arc::new(StreamRegistry::new()))
    }

    /// Create an overlay sharing an existing registry.
    pub fn with_registry(config: OverlayConfig, store: S, registry: Arc<StreamRegistry>) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CAP);
        let icon = store.load();
        Self {
            config,
            registry,
            resources: OverlayResources::new(),
            renderer: OverlayRenderer::new(),
            shown: AtomicBool::new(false),
            icon: Mutex::new(icon),
            store: Mutex::new(store),
            status_tx,
        }
    }

    /// Load the icon texture and font.
    ///
    /// On the first successful init ever (persisted `loaded == false`),
    /// default icon settings are written. Otherwise the persisted settings
    /// are re-read, clamped and written back.
    ///
    /// # Errors
    /// Any `OverlayError` from resource creation. Nothing stays acquired
    /// on failure, so `init` can simply be retried. `AlreadyInitialized`
    /// leaves the loaded resources in place and emits no status event.
    pub fn init(
        &mut self,
        gui: &mut G,
        device: Option<DeviceHandle>,
        icon_bytes: &[u8],
        font_bytes: &[u8],
        screen: &dyn ScreenMetrics,
    ) -> Result<()> {
        if let Err(e) = self.resources.init(
            gui,
            device,
            icon_bytes,
            font_bytes,
            self.config.base_font_size,
            screen,
        ) {
            if matches!(e, OverlayError::AlreadyInitialized) {
                debug!("speaker overlay already initialized");
            } else {
                warn!("speaker overlay init failed: {e}");
                self.set_status(OverlayStatus::Error, Some(e.to_string()));
            }
            return Err(e);
        }

        let populated = self.update_icon(|icon| {
            let first = !icon.loaded;
            if first {
                icon.loaded = true;
                icon.reset();
            }
            icon.normalize();
            first
        });
        if populated {
            info!("wrote default speaker icon settings");
        }

        self.set_status(OverlayStatus::Initialized, None);
        info!("speaker overlay initialized");
        Ok(())
    }

    /// Release resources. No-op when not initialized.
    pub fn free(&mut self) {
        if self.resources.free() {
            self.set_status(OverlayStatus::Uninitialized, None);
            info!("speaker overlay freed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.resources.is_initialized()
    }

    pub fn show(&self) {
        if !self.shown.swap(true, Ordering::Relaxed) {
            self.set_status(OverlayStatus::Shown, None);
        }
    }

    pub fn hide(&self) {
        if self.shown.swap(false, Ordering::Relaxed) {
            self.set_status(OverlayStatus::Hidden, None);
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown.load(Ordering::Relaxed)
    }

    /// Per-frame entry point. Returns `None` when hidden, uninitialized, or
    /// when screen metrics are unavailable this frame.
    pub fn render<W: WorldView + ?Sized>(
        &mut self,
        gui: &mut G,
        world: &W,
        screen: &dyn ScreenMetrics,
    ) -> Option<FrameStats> {
        if !self.shown.load(Ordering::Relaxed) {
            return None;
        }
        let resources = self.resources.get()?;
        let icon = self.icon.lock().clone();
        self.renderer.render(
            gui,
            world,
            screen,
            &self.registry,
            resources,
            &self.config,
            &icon,
        )
    }

    pub fn on_stream_start(&self, stream: StreamId, raw_player: u16, descriptor: StreamDescriptor) {
        self.registry.on_stream_start(stream, raw_player, descriptor);
    }

    pub fn on_stream_stop(&self, stream: StreamId, raw_player: u16) {
        self.registry.on_stream_stop(stream, raw_player);
    }

    /// Shared registry handle for stream producers.
    pub fn registry(&self) -> Arc<StreamRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn icon_offset_x(&self) -> i32 {
        self.icon.lock().icon_offset_x
    }

    pub fn icon_offset_y(&self) -> i32 {
        self.icon.lock().icon_offset_y
    }

    pub fn icon_scale(&self) -> f32 {
        self.icon.lock().icon_scale
    }

    /// Clamped to `[-500, 500]`.
    pub fn set_icon_offset_x(&self, offset: i32) {
        self.update_icon(|icon| icon.icon_offset_x = clamp_offset(offset));
    }

    /// Clamped to `[-500, 500]`.
    pub fn set_icon_offset_y(&self, offset: i32) {
        self.update_icon(|icon| icon.icon_offset_y = clamp_offset(offset));
    }

    /// Clamped to `[0.2, 2.0]`.
    pub fn set_icon_scale(&self, scale: f32) {
        self.update_icon(|icon| icon.icon_scale = clamp_scale(scale));
    }

    /// Re-read the persisted settings, clamp them and write them back.
    pub fn sync_configs(&self) {
        self.update_icon(IconSettings::normalize);
    }

    /// Restore default offsets and scale and persist them.
    pub fn reset_configs(&self) {
        self.update_icon(IconSettings::reset);
    }

    pub fn icon_settings(&self) -> IconSettings {
        self.icon.lock().clone()
    }

    /// Subscribe to lifecycle and visibility changes.
    pub fn subscribe_status(&self) -> broadcast::Receiver<OverlayStatusEvent> {
        self.status_tx.subscribe()
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Load from the store, apply `edit`, save, and refresh the working copy.
    /// The store is the source of truth; the working copy only serves reads.
    fn update_icon<R>(&self, edit: impl FnOnce(&mut IconSettings) -> R) -> R {
        let mut store = self.store.lock();
        let mut settings = store.load();
        let out = edit(&mut settings);
        if let Err(e) = store.save(&settings) {
            warn!("failed to persist speaker icon settings: {e}");
        }
        *self.icon.lock() = settings;
        out
    }

    fn set_status(&self, status: OverlayStatus, detail: Option<String>) {
        debug!(?status, "speaker overlay status");
        let _ = self.status_tx.send(OverlayStatusEvent { status, detail });
    }
}

impl<G: GuiBackend, S: ConfigStore> std::fmt::Debug for SpeakerOverlay<G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeakerOverlay")
            .field("initialized", &self.resources.is_initialized())
            .field("shown", &self.is_shown())
            .field("icon", &*self.icon.lock())
            .finish_non_exhaustive()
    }
}
