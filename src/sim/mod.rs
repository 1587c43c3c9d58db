//! Simulation module
//!
//! All gameplay logic lives here. Motion is expressed per tick and every
//! random roll goes through the session's seeded RNG, so a seed plus an
//! input sequence replays exactly. No rendering or platform dependencies.

pub mod effects;
pub mod emission;
pub mod stain;
pub mod state;
pub mod surface;
pub mod target;
pub mod tick;

pub use effects::{Celebration, Confetti};
pub use emission::{Emitter, Hit, SprayParticle};
pub use stain::StainLayer;
pub use state::{GameEvent, GamePhase, Session};
pub use surface::{ResizeDebouncer, ResizeRequest, Surface};
pub use target::{FaceStyle, Target, TargetLook, TargetSwarm};
pub use tick::{TickInput, autoplay_input, nearest_live_target, tick};
