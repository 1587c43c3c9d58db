//! Spray stream: emission, decay and hit detection

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::target::TargetSwarm;
use crate::consts::*;

/// A droplet of cleaner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprayParticle {
    /// Emission order, strictly increasing
    pub seq: u64,
    pub pos: Vec2,
    /// Velocity in px/tick, fixed at creation
    pub vel: Vec2,
    /// Remaining life, 1 -> 0
    pub life: f32,
}

/// A target knocked out this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target_id: u32,
    pub pos: Vec2,
    pub radius: f32,
}

/// Live spray particles, oldest first
#[derive(Debug, Clone)]
pub struct Emitter {
    particles: VecDeque<SprayParticle>,
    per_tick: usize,
    cap: usize,
    next_seq: u64,
}

impl Emitter {
    pub fn new(per_tick: usize, cap: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(cap + per_tick),
            per_tick,
            cap,
            next_seq: 0,
        }
    }

    /// Append one batch at `origin`, then drop the oldest beyond the cap
    pub fn emit<R: Rng>(&mut self, origin: Vec2, rng: &mut R) {
        for _ in 0..self.per_tick {
            let speed = rng.random_range(SPRAY_SPEED_MIN..SPRAY_SPEED_MAX);
            let angle = rng.random_range(-SPRAY_CONE..SPRAY_CONE);
            self.push(SprayParticle {
                seq: 0,
                pos: origin,
                vel: Vec2::from_angle(angle) * speed,
                life: 1.0,
            });
        }
        self.enforce_cap();
    }

    /// Append a single particle (stamped with the next sequence number)
    pub fn push(&mut self, mut particle: SprayParticle) {
        particle.seq = self.next_seq;
        self.next_seq += 1;
        self.particles.push_back(particle);
    }

    /// Discard the oldest particles until the population fits the cap
    pub fn enforce_cap(&mut self) {
        while self.particles.len() > self.cap {
            self.particles.pop_front();
        }
    }

    /// Move and age every particle, dropping the spent ones
    pub fn advance(&mut self) {
        for p in self.particles.iter_mut() {
            p.pos += p.vel;
            p.life -= SPRAY_LIFE_STEP;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Eliminate every live target touched by a particle. A target is
    /// checked against particles only until its first hit.
    pub fn collide(&self, swarm: &mut TargetSwarm) -> Vec<Hit> {
        let mut hits = Vec::new();
        for target in swarm.iter_mut() {
            if target.eliminated {
                continue;
            }
            if self.particles.iter().any(|p| target.is_hit_by(p.pos)) && target.eliminate() {
                hits.push(Hit {
                    target_id: target.id,
                    pos: target.pos,
                    radius: target.radius,
                });
            }
        }
        hits
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SprayParticle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::target::Target;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ARENA: Vec2 = Vec2::new(600.0, 400.0);

    fn parked_target(pos: Vec2) -> Target {
        let mut t = Target::random(0, ARENA, &mut Pcg32::seed_from_u64(9));
        t.pos = pos;
        t.vel = Vec2::ZERO;
        t.radius = 20.0;
        t
    }

    #[test]
    fn test_emit_batch_in_forward_cone() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut emitter = Emitter::new(8, 480);
        emitter.emit(Vec2::new(50.0, 60.0), &mut rng);
        assert_eq!(emitter.len(), 8);
        for p in emitter.iter() {
            assert_eq!(p.pos, Vec2::new(50.0, 60.0));
            assert!(p.vel.x > 0.0);
            let speed = p.vel.length();
            assert!((SPRAY_SPEED_MIN - 1e-4..=SPRAY_SPEED_MAX + 1e-4).contains(&speed));
            assert!(p.vel.y.atan2(p.vel.x).abs() <= SPRAY_CONE + 1e-4);
        }
    }

    #[test]
    fn test_particles_expire() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut emitter = Emitter::new(4, 280);
        emitter.emit(Vec2::ZERO, &mut rng);
        for _ in 0..24 {
            emitter.advance();
        }
        assert_eq!(emitter.len(), 4);
        for _ in 0..2 {
            emitter.advance();
        }
        assert!(emitter.is_empty());
    }

    #[test]
    fn test_cap_drops_oldest_first() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut emitter = Emitter::new(8, 20);
        for _ in 0..5 {
            emitter.emit(Vec2::ZERO, &mut rng);
        }
        assert_eq!(emitter.len(), 20);
        let seqs: Vec<u64> = emitter.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, (20..40).collect::<Vec<u64>>());
    }

    #[test]
    fn test_single_hit_per_target() {
        let mut swarm = TargetSwarm::new();
        let id = swarm.insert(parked_target(Vec2::new(100.0, 100.0)));
        let mut emitter = Emitter::new(8, 480);
        // Many particles inside the target at once
        for _ in 0..10 {
            emitter.push(SprayParticle {
                seq: 0,
                pos: Vec2::new(100.0, 100.0),
                vel: Vec2::ZERO,
                life: 1.0,
            });
        }

        let hits = emitter.collide(&mut swarm);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target_id, id);
        assert!(emitter.collide(&mut swarm).is_empty());
    }

    #[test]
    fn test_miss_leaves_target_alive() {
        let mut swarm = TargetSwarm::new();
        swarm.insert(parked_target(Vec2::new(300.0, 300.0)));
        let mut emitter = Emitter::new(8, 480);
        emitter.emit(Vec2::new(10.0, 10.0), &mut Pcg32::seed_from_u64(3));
        emitter.advance();
        let hits = emitter.collide(&mut swarm);
        assert!(hits.is_empty());
        assert_eq!(swarm.live_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_cap_holds_and_survivors_are_newest(
            seed in any::<u64>(),
            per_tick in 1usize..16,
            cap in 1usize..64,
            ticks in 1usize..40,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut emitter = Emitter::new(per_tick, cap);
            for _ in 0..ticks {
                emitter.emit(Vec2::ZERO, &mut rng);
                prop_assert!(emitter.len() <= cap);
            }
            let total = (per_tick * ticks) as u64;
            let kept = emitter.len() as u64;
            let seqs: Vec<u64> = emitter.iter().map(|p| p.seq).collect();
            prop_assert_eq!(seqs, (total - kept..total).collect::<Vec<u64>>());
        }
    }
}
