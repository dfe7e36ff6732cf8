//! Simulated game world and voice traffic for the headless demo.
//!
//! ```text
//! producer thread ──StreamEvent──► crossbeam channel ──► bridge thread ──► Arc<StreamRegistry>
//! main thread: SimWorld::advance → SpeakerOverlay::render
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cgmath::Point3;
use crossbeam_channel::{Receiver, Sender};
use rand::{rngs::StdRng, Rng, SeedableRng};
use speaker_overlay_core::{
    PlayerId, ScreenMetrics, StreamDescriptor, StreamId, StreamKind, StreamRegistry, WorldView,
};
use tracing::{debug, info, trace};

const CAMERA_HEIGHT: f32 = 1.8;
const HEAD_HEIGHT: f32 = 1.6;
/// Beyond this the engine would have streamed the character out.
const STREAM_OUT_DISTANCE: f32 = 120.0;

#[derive(Debug, Clone)]
struct SimPlayer {
    name: String,
    radius: f32,
    angle: f32,
    /// Radians per second, sign gives direction.
    speed: f32,
    indoors: bool,
}

/// A camera at the origin looking along +y, with characters walking circles
/// around it. Projection is a plain 90° pinhole.
#[derive(Debug, Clone)]
pub struct SimWorld {
    camera: Point3<f32>,
    width: f32,
    height: f32,
    players: Vec<SimPlayer>,
}

impl SimWorld {
    pub fn new(player_count: u16, width: f32, height: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let players = (0..player_count)
            .map(|i| SimPlayer {
                name: format!("Player_{i}"),
                radius: rng.gen_range(2.0..40.0),
                angle: rng.gen_range(0.0..std::f32::consts::TAU),
                speed: rng.gen_range(-0.6..0.6),
                indoors: rng.gen_bool(0.1),
            })
            .collect();
        Self {
            camera: Point3::new(0.0, 0.0, CAMERA_HEIGHT),
            width,
            height,
            players,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Move every character along its circle by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for p in &mut self.players {
            p.angle = (p.angle + p.speed * dt).rem_euclid(std::f32::consts::TAU);
        }
    }

    fn player(&self, player: PlayerId) -> Option<&SimPlayer> {
        self.players.get(player.index())
    }

    fn head(&self, p: &SimPlayer) -> Point3<f32> {
        Point3::new(
            self.camera.x + p.radius * p.angle.cos(),
            self.camera.y + p.radius * p.angle.sin(),
            HEAD_HEIGHT,
        )
    }
}

impl WorldView for SimWorld {
    fn camera_position(&self) -> Option<Point3<f32>> {
        Some(self.camera)
    }

    fn anchor_position(&self, player: PlayerId) -> Option<Point3<f32>> {
        let p = self.player(player)?;
        (p.radius < STREAM_OUT_DISTANCE).then(|| self.head(p))
    }

    fn project_to_screen(&self, point: Point3<f32>) -> Option<(f32, f32)> {
        let depth = point.y - self.camera.y;
        if depth <= 0.1 {
            return None;
        }
        let focal = self.width / 2.0;
        let x = self.width / 2.0 + focal * (point.x - self.camera.x) / depth;
        let y = self.height / 2.0 - focal * (point.z - self.camera.z) / depth;
        ((0.0..self.width).contains(&x) && (0.0..self.height).contains(&y)).then_some((x, y))
    }

    fn is_player_visible(&self, player: PlayerId) -> bool {
        self.player(player).is_some_and(|p| !p.indoors)
    }

    fn player_name(&self, player: PlayerId) -> Option<&str> {
        self.player(player).map(|p| p.name.as_str())
    }
}

impl ScreenMetrics for SimWorld {
    fn screen_size(&self) -> Option<(f32, f32)> {
        Some((self.width, self.height))
    }
}

// ── Voice traffic ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamEvent {
    Start {
        stream: StreamId,
        player: u16,
        descriptor: StreamDescriptor,
    },
    Stop {
        stream: StreamId,
        player: u16,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TrafficProfile {
    pub players: u16,
    pub talk_probability: f64,
    pub stop_probability: f64,
    pub tick: Duration,
    pub seed: u64,
}

/// Random start/stop generator. At most one stream per player at a time.
pub struct VoiceTraffic {
    profile: TrafficProfile,
    rng: StdRng,
    active: Vec<Option<StreamId>>,
    next_stream: u64,
}

impl VoiceTraffic {
    pub fn new(profile: TrafficProfile) -> Self {
        Self {
            rng: StdRng::seed_from_u64(profile.seed.wrapping_add(1)),
            active: vec![None; usize::from(profile.players)],
            next_stream: 1,
            profile,
        }
    }

    /// Emit this tick's events. Returns `false` once the receiver is gone.
    pub fn tick(&mut self, tx: &Sender<StreamEvent>) -> bool {
        for player in 0..self.active.len() {
            let raw = player as u16;
            let current = self.active[player];
            let event = match current {
                Some(stream) if self.rng.gen_bool(self.profile.stop_probability) => {
                    self.active[player] = None;
                    StreamEvent::Stop { stream, player: raw }
                }
                None if self.rng.gen_bool(self.profile.talk_probability) => {
                    let stream = StreamId(self.next_stream);
                    self.next_stream += 1;
                    self.active[player] = Some(stream);
                    StreamEvent::Start {
                        stream,
                        player: raw,
                        descriptor: self.random_descriptor(),
                    }
                }
                _ => continue,
            };
            if tx.send(event).is_err() {
                return false;
            }
        }
        true
    }

    /// Stop every stream still open.
    pub fn stop_all(&mut self, tx: &Sender<StreamEvent>) {
        for (player, slot) in self.active.iter_mut().enumerate() {
            if let Some(stream) = slot.take() {
                let _ = tx.send(StreamEvent::Stop {
                    stream,
                    player: player as u16,
                });
            }
        }
    }

    pub fn active_streams(&self) -> usize {
        self.active.iter().filter(|s| s.is_some()).count()
    }

    fn random_descriptor(&mut self) -> StreamDescriptor {
        // Some radio channels carry no icon color.
        let color = if self.rng.gen_bool(0.2) {
            0
        } else {
            0xff00_0000 | self.rng.gen_range(1..=0x00ff_ffff_u32)
        };
        let kind = match self.rng.gen_range(0..20) {
            0 | 1 => StreamKind::Global,
            2 => StreamKind::LocalAtPoint {
                distance: self.rng.gen_range(5.0..30.0),
            },
            _ => StreamKind::LocalAtPlayer {
                distance: self.rng.gen_range(10.0..50.0),
            },
        };
        StreamDescriptor::new(kind, color)
    }
}

/// Run `traffic` on its own thread until `stop` is raised, then close all
/// streams and drop the sender.
pub fn spawn_producer(
    mut traffic: VoiceTraffic,
    tx: Sender<StreamEvent>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!(players = traffic.profile.players, "voice traffic producer started");
        while !stop.load(Ordering::Relaxed) {
            if !traffic.tick(&tx) {
                debug!("stream event receiver closed");
                return;
            }
            thread::sleep(traffic.profile.tick);
        }
        debug!(open = traffic.active_streams(), "closing open streams");
        traffic.stop_all(&tx);
        info!("voice traffic producer stopped");
    })
}

/// Apply channel events to the registry until every sender is dropped.
/// Joins to the number of events applied.
pub fn spawn_bridge(rx: Receiver<StreamEvent>, registry: Arc<StreamRegistry>) -> JoinHandle<usize> {
    thread::spawn(move || {
        let mut applied = 0usize;
        for event in rx {
            apply(&registry, event);
            applied += 1;
        }
        debug!(applied, "stream bridge drained");
        applied
    })
}

pub fn apply(registry: &StreamRegistry, event: StreamEvent) {
    trace!(?event, "stream event");
    match event {
        StreamEvent::Start {
            stream,
            player,
            descriptor,
        } => registry.on_stream_start(stream, player, descriptor),
        StreamEvent::Stop { stream, player } => registry.on_stream_stop(stream, player),
    }
}
