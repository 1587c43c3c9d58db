//! Targets (bacteria) and their bounded motion

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// Mouth drawn on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStyle {
    /// Curved grin
    Smile,
    /// Wavy line that breathes
    Smirk,
    /// Open ring
    Gasp,
}

impl FaceStyle {
    fn from_index(i: u32) -> Self {
        match i % 3 {
            0 => FaceStyle::Smile,
            1 => FaceStyle::Smirk,
            _ => FaceStyle::Gasp,
        }
    }
}

/// Appearance rolled once at spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetLook {
    /// Hue in degrees (greens)
    pub hue: f32,
    /// Number of body lobes
    pub lobes: u32,
    /// Lobe amplitude as a fraction of radius
    pub wobble: f32,
    /// Lobe phase offset (radians)
    pub phase: f32,
    pub face: FaceStyle,
    /// Blink phase in 0..1
    pub blink: f32,
}

/// A bacterium roaming the grill
#[derive(Debug, Clone)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    /// Velocity in px/tick
    pub vel: Vec2,
    pub radius: f32,
    /// Fade-out after elimination, 1 -> 0
    pub decay: f32,
    pub eliminated: bool,
    pub look: TargetLook,
}

impl Target {
    /// Roll a new target fully inside `bounds`
    pub fn random<R: Rng>(id: u32, bounds: Vec2, rng: &mut R) -> Self {
        let radius = rng.random_range(TARGET_RADIUS_MIN..TARGET_RADIUS_MAX);
        let mut span = |extent: f32| {
            let hi = extent - radius;
            if hi > radius {
                rng.random_range(radius..hi)
            } else {
                extent * 0.5
            }
        };
        let pos = Vec2::new(span(bounds.x), span(bounds.y));
        let vel = Vec2::new(
            rng.random_range(-TARGET_SPEED..TARGET_SPEED),
            rng.random_range(-TARGET_SPEED..TARGET_SPEED),
        );
        let look = TargetLook {
            hue: rng.random_range(110.0..140.0),
            lobes: rng.random_range(5..8),
            wobble: rng.random_range(0.06..0.12),
            phase: rng.random_range(0.0..std::f32::consts::TAU),
            face: FaceStyle::from_index(rng.random_range(0..3)),
            blink: rng.random_range(0.0..1.0),
        };

        Self {
            id,
            pos,
            vel,
            radius,
            decay: 1.0,
            eliminated: false,
            look,
        }
    }

    /// Integrate one tick, bouncing off the arena walls
    pub fn step(&mut self, bounds: Vec2) {
        self.pos += self.vel;
        self.confine(bounds);
    }

    /// Keep the whole body inside `bounds`, reflecting velocity on contact
    pub fn confine(&mut self, bounds: Vec2) {
        let (lo, hi) = axis_limits(self.radius, bounds.x);
        if self.pos.x < lo {
            self.pos.x = lo;
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x > hi {
            self.pos.x = hi;
            self.vel.x = -self.vel.x.abs();
        }

        let (lo, hi) = axis_limits(self.radius, bounds.y);
        if self.pos.y < lo {
            self.pos.y = lo;
            self.vel.y = self.vel.y.abs();
        } else if self.pos.y > hi {
            self.pos.y = hi;
            self.vel.y = -self.vel.y.abs();
        }
    }

    /// Mark as eliminated. Returns false if it already was.
    pub fn eliminate(&mut self) -> bool {
        if self.eliminated {
            return false;
        }
        self.eliminated = true;
        true
    }

    /// Squared-distance proximity test against a point
    #[inline]
    pub fn is_hit_by(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) < self.radius * self.radius * HIT_RADIUS_FACTOR
    }

    /// Still drawn (alive, or fading out)
    pub fn is_visible(&self) -> bool {
        !self.eliminated || self.decay > 0.0
    }

    /// Draw opacity
    pub fn alpha(&self) -> f32 {
        if self.eliminated { self.decay.max(0.0) } else { 1.0 }
    }
}

/// Valid center range on one axis; degenerate arenas pin to the middle
fn axis_limits(radius: f32, extent: f32) -> (f32, f32) {
    if extent >= radius * 2.0 {
        (radius, extent - radius)
    } else {
        (extent * 0.5, extent * 0.5)
    }
}

/// The active target population
#[derive(Debug, Clone)]
pub struct TargetSwarm {
    targets: Vec<Target>,
    next_id: u32,
}

impl Default for TargetSwarm {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetSwarm {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            next_id: 1,
        }
    }

    /// Replace the population with `count` fresh targets
    pub fn spawn<R: Rng>(&mut self, count: usize, bounds: Vec2, rng: &mut R) {
        self.targets.clear();
        for _ in 0..count {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            self.targets.push(Target::random(id, bounds, rng));
        }
    }

    /// Add a specific target (scripted scenarios)
    pub fn insert(&mut self, mut target: Target) -> u32 {
        target.id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let id = target.id;
        self.targets.push(target);
        id
    }

    /// One tick: move live targets, fade eliminated ones, drop the fully faded
    pub fn advance(&mut self, bounds: Vec2) {
        for target in &mut self.targets {
            if target.eliminated {
                target.decay = (target.decay - TARGET_DECAY_STEP).max(0.0);
            } else {
                target.step(bounds);
            }
        }
        self.targets.retain(Target::is_visible);
    }

    /// Pull every target back inside after the arena shrinks
    pub fn confine(&mut self, bounds: Vec2) {
        for target in &mut self.targets {
            target.confine(bounds);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Target> {
        self.targets.iter_mut()
    }

    pub fn get(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Targets still in play (not eliminated)
    pub fn live_count(&self) -> usize {
        self.targets.iter().filter(|t| !t.eliminated).count()
    }

    /// Targets still tracked, including ones fading out
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ARENA: Vec2 = Vec2::new(400.0, 300.0);

    fn target_at(pos: Vec2, vel: Vec2, radius: f32) -> Target {
        let mut t = Target::random(0, ARENA, &mut Pcg32::seed_from_u64(1));
        t.pos = pos;
        t.vel = vel;
        t.radius = radius;
        t
    }

    #[test]
    fn test_spawn_inside_bounds() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut swarm = TargetSwarm::new();
        swarm.spawn(50, ARENA, &mut rng);
        assert_eq!(swarm.len(), 50);
        for t in swarm.iter() {
            assert!(t.pos.x >= t.radius && t.pos.x <= ARENA.x - t.radius);
            assert!(t.pos.y >= t.radius && t.pos.y <= ARENA.y - t.radius);
            assert!(t.vel.x.abs() <= TARGET_SPEED && t.vel.y.abs() <= TARGET_SPEED);
            assert!((5..8).contains(&t.look.lobes));
            assert!(!t.eliminated);
            assert_eq!(t.decay, 1.0);
        }
    }

    #[test]
    fn test_spawn_replaces_population() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut swarm = TargetSwarm::new();
        swarm.spawn(8, ARENA, &mut rng);
        swarm.spawn(3, ARENA, &mut rng);
        assert_eq!(swarm.len(), 3);
    }

    #[test]
    fn test_wall_reflection() {
        let mut t = target_at(Vec2::new(21.0, 150.0), Vec2::new(-2.0, 0.0), 20.0);
        t.step(ARENA);
        assert_eq!(t.pos.x, 20.0);
        assert_eq!(t.vel.x, 2.0);

        let mut t = target_at(Vec2::new(200.0, 279.5), Vec2::new(0.0, 1.0), 20.0);
        t.step(ARENA);
        assert_eq!(t.pos.y, 280.0);
        assert_eq!(t.vel.y, -1.0);
    }

    #[test]
    fn test_decay_and_removal() {
        let mut swarm = TargetSwarm::new();
        let id = swarm.insert(target_at(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 20.0));
        let pos_before = swarm.get(id).map(|t| t.pos);

        assert!(swarm.iter_mut().next().map(Target::eliminate).unwrap_or(false));
        assert!(!swarm.iter_mut().next().map(Target::eliminate).unwrap_or(true));

        let mut last = 1.0;
        let mut ticks = 0;
        while swarm.get(id).is_some() {
            swarm.advance(ARENA);
            if let Some(t) = swarm.get(id) {
                assert!(t.decay < last);
                assert_eq!(Some(t.pos), pos_before);
                last = t.decay;
            }
            ticks += 1;
            assert!(ticks < 100);
        }
        // 1.0 / 0.05 ticks to fade out
        assert!((19..=21).contains(&ticks));
        assert_eq!(swarm.live_count(), 0);
    }

    #[test]
    fn test_hit_threshold() {
        let t = target_at(Vec2::new(100.0, 100.0), Vec2::ZERO, 20.0);
        assert!(t.is_hit_by(Vec2::new(100.0, 100.0)));
        assert!(t.is_hit_by(Vec2::new(117.0, 100.0)));
        assert!(!t.is_hit_by(Vec2::new(118.0, 100.0)));
    }

    proptest! {
        #[test]
        fn prop_targets_stay_in_bounds_and_keep_their_look(
            seed in any::<u64>(),
            w in 280.0f32..1200.0,
            h in 240.0f32..900.0,
            ticks in 1usize..600,
        ) {
            let bounds = Vec2::new(w, h);
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut swarm = TargetSwarm::new();
            swarm.spawn(10, bounds, &mut rng);
            let looks: Vec<(f32, TargetLook)> = swarm.iter().map(|t| (t.radius, t.look)).collect();

            for _ in 0..ticks {
                swarm.advance(bounds);
                for t in swarm.iter() {
                    prop_assert!(t.pos.x >= t.radius && t.pos.x <= w - t.radius);
                    prop_assert!(t.pos.y >= t.radius && t.pos.y <= h - t.radius);
                }
            }
            let after: Vec<(f32, TargetLook)> = swarm.iter().map(|t| (t.radius, t.look)).collect();
            prop_assert_eq!(looks, after);
        }
    }
}
