//! Win celebration: confetti burst and the light sweep

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// A falling paper strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confetti {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    /// Width, height
    pub size: Vec2,
    /// Hue in degrees (pinks)
    pub hue: f32,
    pub life: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Celebration {
    pub confetti: Vec<Confetti>,
    /// Distance the light sweep has traveled
    pub sweep: f32,
}

impl Celebration {
    /// Drop `count` confetti from just above the top edge and restart the sweep
    pub fn burst<R: Rng>(&mut self, count: usize, bounds: Vec2, rng: &mut R) {
        self.sweep = 0.0;
        let width = bounds.x.max(1.0);
        for _ in 0..count {
            self.confetti.push(Confetti {
                pos: Vec2::new(rng.random_range(0.0..width), rng.random_range(-40.0..20.0)),
                vel: Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(0.5..2.0)),
                size: Vec2::new(rng.random_range(3.0..6.0), rng.random_range(6.0..12.0)),
                hue: rng.random_range(300.0..340.0),
                life: 1.0,
            });
        }
    }

    /// One tick of gravity and fade; the sweep keeps moving
    pub fn advance(&mut self) {
        for c in &mut self.confetti {
            c.vel.y += CONFETTI_GRAVITY;
            c.pos += c.vel;
            c.life -= CONFETTI_LIFE_STEP;
        }
        self.confetti.retain(|c| c.life > 0.0);
        self.sweep += SWEEP_SPEED;
    }

    /// Left edge of the sweep gradient for a surface width; wraps around
    /// after leaving the right edge
    pub fn sweep_x(&self, width: f32) -> f32 {
        self.sweep.rem_euclid(width + SWEEP_LEAD) - SWEEP_LEAD
    }

    pub fn clear(&mut self) {
        self.confetti.clear();
        self.sweep = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_confetti_falls_and_fades() {
        let mut fx = Celebration::default();
        fx.burst(30, Vec2::new(400.0, 300.0), &mut Pcg32::seed_from_u64(4));
        assert_eq!(fx.confetti.len(), 30);
        let vy0: Vec<f32> = fx.confetti.iter().map(|c| c.vel.y).collect();

        fx.advance();
        for (c, vy) in fx.confetti.iter().zip(vy0) {
            assert!((c.vel.y - (vy + CONFETTI_GRAVITY)).abs() < 1e-5);
            assert!(c.life < 1.0);
        }

        for _ in 0..120 {
            fx.advance();
        }
        assert!(fx.confetti.is_empty());
    }

    #[test]
    fn test_sweep_wraps() {
        let mut fx = Celebration::default();
        assert_eq!(fx.sweep_x(400.0), -SWEEP_LEAD);
        fx.advance();
        assert_eq!(fx.sweep_x(400.0), SWEEP_SPEED - SWEEP_LEAD);
        fx.sweep = 700.0;
        assert_eq!(fx.sweep_x(400.0), -SWEEP_LEAD);
    }
}
