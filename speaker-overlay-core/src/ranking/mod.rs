//! Selection and ordering of speakers for the limited display slots.
//!
//! Players are visited in ascending index order and the first `slots`
//! eligible ones win. Rank 0 is the top row at full opacity; each further
//! row fades linearly:
//!
//! ```text
//! alpha(rank) = round(255 * (1 - rank / slots))
//! ```
//!
//! A player is eligible for a frame when all of these hold:
//! 1. the world knows its name (connected),
//! 2. it has at least one `LocalAtPlayer` stream,
//! 3. the external visibility test passes,
//! 4. its anchor distance is measurable and below the widest audible
//!    distance among its `LocalAtPlayer` streams.
//!
//! Eligibility is recomputed each frame; nothing is stored.

use std::iter::FusedIterator;

use crate::projector::{Projection, SpatialProjector, WorldView};
use crate::registry::StreamRegistry;
use crate::stream::{PlayerId, StreamDescriptor, StreamId, MAX_PLAYERS};

/// One ranked row of the overlay for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySlot<'w> {
    pub player: PlayerId,
    pub name: &'w str,
    pub rank: usize,
    pub alpha: u8,
    pub distance: f32,
    /// Colored `LocalAtPlayer` streams, one row icon each.
    pub token_count: usize,
    /// Floating icon placement; `None` when the anchor is off-screen.
    pub projection: Option<Projection>,
}

/// Text alpha for a row at `rank` out of `slots`.
pub fn alpha_for_rank(rank: usize, slots: usize) -> u8 {
    if slots == 0 {
        return 0;
    }
    let level = (1.0 - rank as f32 / slots as f32) * 255.0;
    level.round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone, Copy)]
pub struct PresentationRanker {
    slots: usize,
}

impl PresentationRanker {
    pub fn new(slots: usize) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Lazily rank this frame's speakers.
    ///
    /// `scratch` receives each visited player's stream snapshot; pass the
    /// same buffer every frame to keep ranking allocation-free.
    pub fn rank<'r, 'w, W: WorldView + ?Sized>(
        &self,
        registry: &'r StreamRegistry,
        world: &'w W,
        scratch: &'r mut Vec<(StreamId, StreamDescriptor)>,
    ) -> RankedSpeakers<'r, 'w, W> {
        RankedSpeakers {
            registry,
            world,
            scratch,
            next_player: 0,
            slots: self.slots,
            produced: 0,
        }
    }
}

/// Single-pass iterator over ranked display slots. Stops after `slots`
/// items without visiting the remaining players.
pub struct RankedSpeakers<'r, 'w, W: WorldView + ?Sized> {
    registry: &'r StreamRegistry,
    world: &'w W,
    scratch: &'r mut Vec<(StreamId, StreamDescriptor)>,
    next_player: usize,
    slots: usize,
    produced: usize,
}

impl<'r, 'w, W: WorldView + ?Sized> RankedSpeakers<'r, 'w, W> {
    fn evaluate(&mut self, player: PlayerId) -> Option<DisplaySlot<'w>> {
        let name = self.world.player_name(player)?;

        self.registry.snapshot_into(player, self.scratch);
        let max_distance = self
            .scratch
            .iter()
            .filter_map(|(_, d)| d.player_audible_distance())
            .reduce(f32::max)?;

        if !self.world.is_player_visible(player) {
            return None;
        }

        let projector = SpatialProjector::new(self.world);
        let projection = projector.resolve(player);
        let distance = match projection {
            Some(p) => p.distance,
            None => projector.measure(player)?,
        };
        if !(distance < max_distance) {
            return None;
        }

        let token_count = self.scratch.iter().filter(|(_, d)| d.shows_token()).count();
        let rank = self.produced;

        Some(DisplaySlot {
            player,
            name,
            rank,
            alpha: alpha_for_rank(rank, self.slots),
            distance,
            token_count,
            projection,
        })
    }
}

impl<'r, 'w, W: WorldView + ?Sized> Iterator for RankedSpeakers<'r, 'w, W> {
    type Item = DisplaySlot<'w>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.produced < self.slots && self.next_player < MAX_PLAYERS {
            let raw = self.next_player as u16;
            self.next_player += 1;
            let Some(player) = PlayerId::new(raw) else {
                break;
            };
            if let Some(slot) = self.evaluate(player) {
                self.produced += 1;
                return Some(slot);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.saturating_sub(self.produced)))
    }
}

impl<'r, 'w, W: WorldView + ?Sized> FusedIterator for RankedSpeakers<'r, 'w, W> {}
