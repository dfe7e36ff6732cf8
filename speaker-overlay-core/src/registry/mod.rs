//! Per-player registry of active voice streams.
//!
//! ## Threading
//!
//! ```text
//! audio/network callbacks ──► on_stream_start / on_stream_stop ─┐
//!                                                                │  per-player
//!                                                                ▼  parking_lot::Mutex
//!                                          [ HashMap<StreamId, StreamDescriptor>; MAX_PLAYERS ]
//!                                                                ▲
//! render thread ──► snapshot_into(player, &mut scratch) ─────────┘
//! ```
//!
//! Each player has its own lock, so a producer touching player 7 never
//! contends with the renderer reading player 3. Locks are held only for
//! the map operation or the copy into the caller's scratch buffer, never
//! across drawing work.
//!
//! Raw player indices are validated here, at the boundary. Out-of-range
//! events are dropped and counted, never propagated.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::stream::{PlayerId, StreamDescriptor, StreamId, MAX_PLAYERS};

/// One player's active streams, keyed by stream identity.
pub type SpeakerEntry = HashMap<StreamId, StreamDescriptor>;

/// Counters for stream events seen by the registry.
#[derive(Debug, Default)]
pub struct RegistryDiagnostics {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub dropped_out_of_range: AtomicUsize,
}

impl RegistryDiagnostics {
    pub fn snapshot(&self) -> RegistryDiagnosticsSnapshot {
        RegistryDiagnosticsSnapshot {
            starts: self.starts.load(Ordering::Relaxed),
            stops: self.stops.load(Ordering::Relaxed),
            dropped_out_of_range: self.dropped_out_of_range.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryDiagnosticsSnapshot {
    pub starts: usize,
    pub stops: usize,
    pub dropped_out_of_range: usize,
}

/// Concurrent-safe table of active streams for every player.
///
/// Share as `Arc<StreamRegistry>` between the stream producers and the
/// overlay. `StreamRegistry` is `Send + Sync`.
pub struct StreamRegistry {
    speakers: Box<[Mutex<SpeakerEntry>]>,
    diagnostics: RegistryDiagnostics,
}

impl StreamRegistry {
    pub fn new() -> Self {
        let speakers = (0..MAX_PLAYERS)
            .map(|_| Mutex::new(SpeakerEntry::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            speakers,
            diagnostics: RegistryDiagnostics::default(),
        }
    }

    /// A stream started playing for `raw_player`. Inserts or overwrites the
    /// descriptor stored under `stream`.
    pub fn on_stream_start(&self, stream: StreamId, raw_player: u16, descriptor: StreamDescriptor) {
        let Some(player) = self.accept(raw_player) else {
            return;
        };
        self.diagnostics.starts.fetch_add(1, Ordering::Relaxed);
        let replaced = self.entry(player).lock().insert(stream, descriptor);
        debug!(
            player = player.get(),
            stream = stream.0,
            replaced = replaced.is_some(),
            "speaker stream started"
        );
    }

    /// A stream stopped playing for `raw_player`. Unknown streams are ignored.
    pub fn on_stream_stop(&self, stream: StreamId, raw_player: u16) {
        let Some(player) = self.accept(raw_player) else {
            return;
        };
        self.diagnostics.stops.fetch_add(1, Ordering::Relaxed);
        let removed = self.entry(player).lock().remove(&stream);
        debug!(
            player = player.get(),
            stream = stream.0,
            removed = removed.is_some(),
            "speaker stream stopped"
        );
    }

    /// Copy the player's current streams into `out` (cleared first).
    ///
    /// `out` is meant to be reused across frames so the steady state does
    /// not allocate.
    pub fn snapshot_into(&self, player: PlayerId, out: &mut Vec<(StreamId, StreamDescriptor)>) {
        out.clear();
        let entry = self.entry(player).lock();
        out.extend(entry.iter().map(|(id, descriptor)| (*id, *descriptor)));
    }

    pub fn snapshot(&self, player: PlayerId) -> Vec<(StreamId, StreamDescriptor)> {
        let mut out = Vec::new();
        self.snapshot_into(player, &mut out);
        out
    }

    pub fn is_speaking(&self, player: PlayerId) -> bool {
        !self.entry(player).lock().is_empty()
    }

    pub fn stream_count(&self, player: PlayerId) -> usize {
        self.entry(player).lock().len()
    }

    /// Players with at least one active stream, ascending.
    pub fn speaking_players(&self) -> Vec<PlayerId> {
        PlayerId::all().filter(|p| self.is_speaking(*p)).collect()
    }

    /// Drop every stream of one player (e.g. on disconnect).
    pub fn clear_player(&self, player: PlayerId) {
        self.entry(player).lock().clear();
    }

    /// Drop every stream of every player.
    pub fn clear(&self) {
        for entry in self.speakers.iter() {
            entry.lock().clear();
        }
    }

    pub fn diagnostics(&self) -> RegistryDiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    fn accept(&self, raw_player: u16) -> Option<PlayerId> {
        let player = PlayerId::new(raw_player);
        if player.is_none() {
            self.diagnostics
                .dropped_out_of_range
                .fetch_add(1, Ordering::Relaxed);
            trace!(raw_player, "dropping stream event for out-of-range player");
        }
        player
    }

    fn entry(&self, player: PlayerId) -> &Mutex<SpeakerEntry> {
        // PlayerId construction guarantees the index is in bounds.
        &self.speakers[player.index()]
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRegistry")
            .field("diagnostics", &self.diagnostics.snapshot())
            .finish_non_exhaustive()
    }
}
