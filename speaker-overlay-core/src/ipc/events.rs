//! Status events broadcast by `SpeakerOverlay`.
//!
//! Hosts subscribe with `SpeakerOverlay::subscribe_status()` to mirror the
//! overlay state in their own UI (settings menu toggles, diagnostics).

use serde::{Deserialize, Serialize};

/// Emitted whenever the overlay's lifecycle or visibility changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStatusEvent {
    pub status: OverlayStatus,
    /// Optional human-readable detail (e.g. init error message).
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayStatus {
    /// No resources held; rendering is a no-op.
    Uninitialized,
    /// Icon and font loaded.
    Initialized,
    /// Visibility toggled on.
    Shown,
    /// Visibility toggled off.
    Hidden,
    /// Initialization failed; `detail` carries the reason.
    Error,
}
