//! Session state and round lifecycle
//!
//! Everything the tick touches lives in one owned `Session`; hosts hold it
//! and drive it one frame at a time.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::effects::Celebration;
use super::emission::Emitter;
use super::stain::StainLayer;
use super::surface::{ResizeDebouncer, ResizeRequest, Surface};
use super::target::TargetSwarm;
use crate::audio::{AudioManager, SoundEffect};
use crate::settings::{ArenaConfig, Settings};

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Preview: targets roam for ambience, no timer, no scoring
    Idle,
    /// Round in progress
    Playing,
    /// Every target eliminated before time ran out
    Won,
    /// Countdown hit zero with targets remaining
    Lost,
}

/// Notifications for the UI collaborator, drained after each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RoundStarted,
    TargetEliminated { target_id: u32, score: u32 },
    RoundWon { score: u32 },
    RoundLost { score: u32 },
}

/// The whole arena: surface, layers, entities, round bookkeeping
#[derive(Debug)]
pub struct Session {
    pub(crate) config: ArenaConfig,
    pub(crate) settings: Settings,
    pub(crate) rng: Pcg32,
    pub(crate) surface: Surface,
    pub(crate) stain: StainLayer,
    pub(crate) swarm: TargetSwarm,
    pub(crate) emitter: Emitter,
    pub(crate) celebration: Celebration,
    pub(crate) audio: AudioManager,
    pub(crate) resize: ResizeDebouncer,
    pub(crate) phase: GamePhase,
    pub(crate) score: u32,
    pub(crate) time_left: f32,
    /// Animation clock (seconds since creation)
    pub(crate) clock: f32,
    pub(crate) pointer: Vec2,
    pub(crate) pressing: bool,
    /// Pointer level seen by the previous tick, for press edges
    pub(crate) input_held: bool,
    pub(crate) events: Vec<GameEvent>,
}

impl Session {
    /// Create an idle session at the minimum surface size with a preview batch
    pub fn new(settings: Settings, seed: u64) -> Self {
        let config = settings.arena_config();
        Self::with_config(config, settings, seed)
    }

    /// Create with an explicit tuning record
    pub fn with_config(config: ArenaConfig, settings: Settings, seed: u64) -> Self {
        let surface = Surface::default();
        let mut session = Self {
            emitter: Emitter::new(config.particles_per_tick, config.particle_cap),
            resize: ResizeDebouncer::new(config.resize_debounce_ms),
            audio: AudioManager::new(settings.sound, settings.master_volume),
            time_left: config.round_seconds,
            config,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            surface,
            stain: StainLayer::new(surface.width, surface.height),
            swarm: TargetSwarm::new(),
            celebration: Celebration::default(),
            phase: GamePhase::Idle,
            score: 0,
            clock: 0.0,
            pointer: Vec2::ZERO,
            pressing: false,
            input_held: false,
            events: Vec::new(),
        };

        session.stain.regenerate(&mut session.rng, session.config.stain_blobs);
        let preview = session.config.idle_preview_count;
        session
            .swarm
            .spawn(preview, session.surface.size(), &mut session.rng);
        session
    }

    // === Round lifecycle ===

    /// Begin a fresh round from any phase
    pub fn start(&mut self) {
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.time_left = self.config.round_seconds;
        self.emitter.clear();
        self.celebration.clear();
        let bounds = self.surface.size();
        self.swarm.spawn(self.config.spawn_count, bounds, &mut self.rng);
        self.stain.regenerate(&mut self.rng, self.config.stain_blobs);
        self.pressing = false;
        self.audio.stop_spray();
        self.audio.clear_last_effect();
        self.events.push(GameEvent::RoundStarted);
        log::info!(
            "Round started: {} targets, {:.0}s",
            self.swarm.len(),
            self.time_left
        );
    }

    /// Explicit restart action (same reset as `start`)
    pub fn restart(&mut self) {
        self.start();
    }

    /// All targets cleared
    pub(crate) fn win(&mut self) {
        self.phase = GamePhase::Won;
        self.stain.clear();
        self.emitter.clear();
        self.pressing = false;
        self.audio.stop_spray();
        let bounds = self.surface.size();
        self.celebration
            .burst(self.config.confetti_count, bounds, &mut self.rng);
        self.audio.play(SoundEffect::Win);
        self.events.push(GameEvent::RoundWon { score: self.score });
        log::info!("Round won with {:.2}s left", self.time_left);
    }

    /// Time ran out
    pub(crate) fn lose(&mut self) {
        self.phase = GamePhase::Lost;
        self.pressing = false;
        self.audio.stop_spray();
        self.events.push(GameEvent::RoundLost { score: self.score });
        log::info!("Round lost, score {}", self.score);
    }

    // === Input ===

    /// Track the pointer (logical surface coordinates)
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.pointer = Vec2::new(x, y);
        }
    }

    /// Pointer pressed: starts a round unless one is running, then sprays
    pub fn press(&mut self, x: f32, y: f32) {
        self.pointer_move(x, y);
        if self.phase != GamePhase::Playing {
            self.start();
        }
        self.pressing = true;
        self.audio.start_spray();
    }

    /// Pointer released: stop spraying
    pub fn release(&mut self) {
        self.pressing = false;
        self.audio.stop_spray();
    }

    // === Surface ===

    /// Queue a viewport change; applied by `apply_pending_resize`
    pub fn request_resize(&mut self, request: ResizeRequest, now_ms: f64) {
        self.resize.request(request, now_ms);
    }

    /// Apply a debounced resize if due. Call between ticks only.
    pub fn apply_pending_resize(&mut self, now_ms: f64) -> bool {
        match self.resize.take_due(now_ms) {
            Some(request) => self.resize_now(request),
            None => false,
        }
    }

    /// Refit the surface immediately. Returns true if the size changed, in
    /// which case the stain layer is reallocated and regenerated in any phase.
    pub fn resize_now(&mut self, request: ResizeRequest) -> bool {
        let next = Surface::fit(request, self.config.pixel_ratio_ceiling);
        if next == self.surface {
            return false;
        }
        self.surface = next;
        self.stain.resize(next.width, next.height);
        self.stain.regenerate(&mut self.rng, self.config.stain_blobs);
        self.swarm.confine(next.size());
        log::info!(
            "Surface resized to {}x{} @{:.2}x",
            next.width,
            next.height,
            next.pixel_ratio
        );
        true
    }

    // === Readouts ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Remaining round time in seconds
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// HUD timer text (`00:SS`)
    pub fn timer_text(&self) -> String {
        crate::format_timer(self.time_left)
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn is_pressing(&self) -> bool {
        self.pressing
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Toggle reduced motion at runtime
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.settings.reduced_motion = reduced;
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn stain(&self) -> &StainLayer {
        &self.stain
    }

    pub fn targets(&self) -> &TargetSwarm {
        &self.swarm
    }

    /// Scripted scenarios and tests place targets directly
    pub fn targets_mut(&mut self) -> &mut TargetSwarm {
        &mut self.swarm
    }

    pub fn spray(&self) -> &Emitter {
        &self.emitter
    }

    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    /// Take the notifications raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
