//! Stream identity and descriptor types shared by the registry and renderer.
//!
//! The audio/network layer owns stream lifetime; this crate only ever sees a
//! `StreamId` plus an immutable `StreamDescriptor` snapshot of the stream's
//! attributes at the moment it started playing.

use std::fmt;
use std::num::NonZeroU32;

/// Upper bound (exclusive) of valid player indices.
pub const MAX_PLAYERS: usize = 1004;

/// A player index known to be inside `[0, MAX_PLAYERS)`.
///
/// Raw indices arrive from an untrusted feed; they are validated once here
/// and every other module works with `PlayerId` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(u16);

impl PlayerId {
    /// Validate a raw index. Returns `None` when it is out of range.
    pub fn new(raw: u16) -> Option<Self> {
        if (raw as usize) < MAX_PLAYERS {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every valid player in ascending order.
    pub fn all() -> impl Iterator<Item = PlayerId> {
        (0..MAX_PLAYERS as u16).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of one active stream, supplied by the audio layer.
///
/// Two descriptors are "the same stream" iff their ids match; content is
/// never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

/// What a stream is attached to, and how far it can be heard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamKind {
    /// Heard everywhere, never drawn in the world.
    Global,
    LocalAtPoint { distance: f32 },
    LocalAtVehicle { distance: f32 },
    /// Emitted from a player's character. The only kind the overlay draws.
    LocalAtPlayer { distance: f32 },
    LocalAtObject { distance: f32 },
}

impl StreamKind {
    /// Maximum audible distance for local streams, `None` for global ones.
    pub fn max_audible_distance(&self) -> Option<f32> {
        match *self {
            StreamKind::Global => None,
            StreamKind::LocalAtPoint { distance }
            | StreamKind::LocalAtVehicle { distance }
            | StreamKind::LocalAtPlayer { distance }
            | StreamKind::LocalAtObject { distance } => Some(distance),
        }
    }
}

/// Packed `0xAARRGGBB` tint. Zero is not representable: a zero raw color
/// means "no icon token" and becomes `None` on the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamColor(NonZeroU32);

impl StreamColor {
    pub fn from_argb(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn argb(self) -> u32 {
        self.0.get()
    }
}

/// Immutable description of one active stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamDescriptor {
    kind: StreamKind,
    color: Option<StreamColor>,
}

impl StreamDescriptor {
    /// Build a descriptor. Local distances are clamped to `>= 0`
    /// (NaN becomes `0`, i.e. never audible).
    pub fn new(kind: StreamKind, raw_color: u32) -> Self {
        let kind = match kind {
            StreamKind::Global => StreamKind::Global,
            StreamKind::LocalAtPoint { distance } => StreamKind::LocalAtPoint {
                distance: sanitize_distance(distance),
            },
            StreamKind::LocalAtVehicle { distance } => StreamKind::LocalAtVehicle {
                distance: sanitize_distance(distance),
            },
            StreamKind::LocalAtPlayer { distance } => StreamKind::LocalAtPlayer {
                distance: sanitize_distance(distance),
            },
            StreamKind::LocalAtObject { distance } => StreamKind::LocalAtObject {
                distance: sanitize_distance(distance),
            },
        };
        Self {
            kind,
            color: StreamColor::from_argb(raw_color),
        }
    }

    /// Shorthand for the kind the overlay renders.
    pub fn at_player(distance: f32, raw_color: u32) -> Self {
        Self::new(StreamKind::LocalAtPlayer { distance }, raw_color)
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn color(&self) -> Option<StreamColor> {
        self.color
    }

    pub fn max_audible_distance(&self) -> Option<f32> {
        self.kind.max_audible_distance()
    }

    /// Audible distance if this stream is emitted from a player's character.
    pub fn player_audible_distance(&self) -> Option<f32> {
        match self.kind {
            StreamKind::LocalAtPlayer { distance } => Some(distance),
            _ => None,
        }
    }

    /// Whether this stream contributes an icon token to its speaker's row.
    pub fn shows_token(&self) -> bool {
        self.color.is_some() && self.player_audible_distance().is_some()
    }
}

fn sanitize_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        0.0
    } else {
        distance.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_rejects_out_of_range() {
        assert!(PlayerId::new(0).is_some());
        assert!(PlayerId::new((MAX_PLAYERS - 1) as u16).is_some());
        assert!(PlayerId::new(MAX_PLAYERS as u16).is_none());
        assert!(PlayerId::new(u16::MAX).is_none());
    }

    #[test]
    fn all_players_ascend_and_are_bounded() {
        let ids: Vec<_> = PlayerId::all().collect();
        assert_eq!(ids.len(), MAX_PLAYERS);
        assert_eq!(ids[0].get(), 0);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn zero_color_means_no_token() {
        let d = StreamDescriptor::at_player(10.0, 0);
        assert!(d.color().is_none());
        assert!(!d.shows_token());

        let d = StreamDescriptor::at_player(10.0, 0xff00_ff00);
        assert_eq!(d.color().map(StreamColor::argb), Some(0xff00_ff00));
        assert!(d.shows_token());
    }

    #[test]
    fn only_player_streams_render() {
        let global = StreamDescriptor::new(StreamKind::Global, 0xffff_ffff);
        assert_eq!(global.max_audible_distance(), None);
        assert_eq!(global.player_audible_distance(), None);
        assert!(!global.shows_token());

        let vehicle = StreamDescriptor::new(StreamKind::LocalAtVehicle { distance: 30.0 }, 1);
        assert_eq!(vehicle.max_audible_distance(), Some(30.0));
        assert_eq!(vehicle.player_audible_distance(), None);
        assert!(!vehicle.shows_token());
    }

    #[test]
    fn negative_and_nan_distances_clamp_to_zero() {
        assert_eq!(
            StreamDescriptor::at_player(-4.0, 1).player_audible_distance(),
            Some(0.0)
        );
        assert_eq!(
            StreamDescriptor::at_player(f32::NAN, 1).player_audible_distance(),
            Some(0.0)
        );
    }
}
