//! # speaker-overlay-core
//!
//! Tracks which players are transmitting voice and draws a heads-up overlay:
//! a ranked list of active speakers plus icons floating above speaking
//! characters that are within audible range.
//!
//! ## Architecture
//!
//! ```text
//! audio/network callbacks → on_stream_start/stop → StreamRegistry (Arc, per-player locks)
//!                                                        │
//! render thread, once per frame:                         ▼
//!   SpeakerOverlay::render → PresentationRanker → SpatialProjector → OverlayRenderer
//!                                                                          │
//!                                               GuiBackend draw calls ◄────┘
//! ```
//!
//! The game engine and GUI are external: they plug in through the
//! `WorldView`, `ScreenMetrics` and `GuiBackend` traits.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod gui;
pub mod ipc;
pub mod overlay;
pub mod projector;
pub mod ranking;
pub mod registry;
pub mod render;
pub mod resources;
pub mod stream;

#[cfg(test)]
mod testing;

// Convenience re-exports for host crates
pub use config::{ConfigStore, IconSettings, JsonConfigStore, MemoryConfigStore, OverlayConfig};
pub use error::OverlayError;
pub use gui::{DeviceHandle, GlyphRange, GuiBackend, StyleVar, Vec2, WindowFlags};
pub use ipc::events::{OverlayStatus, OverlayStatusEvent};
pub use overlay::SpeakerOverlay;
pub use projector::{FixedScreen, Projection, ScreenMetrics, SpatialProjector, WorldView};
pub use ranking::{DisplaySlot, PresentationRanker};
pub use registry::StreamRegistry;
pub use render::FrameStats;
pub use stream::{PlayerId, StreamColor, StreamDescriptor, StreamId, StreamKind, MAX_PLAYERS};
