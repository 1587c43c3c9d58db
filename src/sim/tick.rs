//! Per-frame simulation tick
//!
//! Advances the session in a fixed order: input edges, targets, spray
//! (emit, move, collide), celebration, then the countdown and the
//! won/lost checks.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, Session};
use crate::audio::SoundEffect;
use crate::consts::ERASE_RADIUS_FACTOR;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in logical surface coordinates
    pub pointer: Option<Vec2>,
    /// Pointer held down
    pub pressed: bool,
    /// Restart button (one-shot)
    pub restart: bool,
}

/// Advance the session by one tick of `dt` seconds
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    if input.restart {
        session.restart();
    }
    if let Some(p) = input.pointer {
        session.pointer_move(p.x, p.y);
    }
    // Edges come from the input level, not `pressing`: a round ending under
    // a held pointer must not read as a fresh press
    if input.pressed && !session.input_held {
        let p = session.pointer;
        session.press(p.x, p.y);
    } else if !input.pressed && session.input_held {
        session.release();
    }
    session.input_held = input.pressed;

    session.clock += dt;
    let bounds = session.surface.size();

    // Targets
    session.swarm.advance(bounds);

    // Spray
    if session.pressing && session.settings.emission_allowed() {
        let origin = session.pointer;
        session.emitter.emit(origin, &mut session.rng);
    }
    session.emitter.advance();
    if session.phase == GamePhase::Playing {
        for hit in session.emitter.collide(&mut session.swarm) {
            session.score += 1;
            session
                .stain
                .erase_at(hit.pos.x, hit.pos.y, hit.radius * ERASE_RADIUS_FACTOR);
            session.audio.play(SoundEffect::Pop);
            session.events.push(GameEvent::TargetEliminated {
                target_id: hit.target_id,
                score: session.score,
            });
            log::debug!("Target {} eliminated (score {})", hit.target_id, session.score);
        }
    }

    // Celebration only runs after a win
    if session.phase == GamePhase::Won {
        session.celebration.advance();
    }

    // Countdown, then outcome. A cleared arena wins even if the clock
    // reached zero on the same tick.
    if session.phase == GamePhase::Playing {
        session.time_left = (session.time_left - dt).max(0.0);
        if session.swarm.live_count() == 0 {
            session.win();
        } else if session.time_left <= 0.0 {
            session.lose();
        }
    }
}

/// Aim helper for autoplay: the live target nearest to `from`
pub fn nearest_live_target(session: &Session, from: Vec2) -> Option<Vec2> {
    session
        .swarm
        .iter()
        .filter(|t| !t.eliminated)
        .min_by(|a, b| {
            a.pos
                .distance_squared(from)
                .partial_cmp(&b.pos.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|t| t.pos)
}

/// Autoplay input: park the nozzle just left of the nearest live target and
/// hold the trigger (the spray cone points toward +x)
pub fn autoplay_input(session: &Session) -> TickInput {
    let from = session.pointer;
    match nearest_live_target(session, from) {
        Some(target) => TickInput {
            pointer: Some(target - Vec2::new(12.0, 0.0)),
            pressed: true,
            restart: false,
        },
        None => TickInput::default(),
    }
}
