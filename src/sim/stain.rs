//! Erasable grime layer
//!
//! A logical-resolution RGBA raster, stored as straight (non-premultiplied)
//! color plus a separate opacity plane. Two blend operations touch it:
//!
//! - paint: source-over, `a' = a_s + a_d (1 - a_s)`
//! - erase: destination-out, `a' = a_d (1 - m)` where `m` is a radial mask
//!   falling linearly from 1 at the center to 0 at the rim
//!
//! Erasing multiplies opacity by a factor in [0, 1] and never touches color,
//! so it can only remove grime. Neither operation leaves a mode behind.

use rand::Rng;

/// Base film tint (rgb 80,50,20)
const BASE_TINT: [f32; 3] = [80.0 / 255.0, 50.0 / 255.0, 20.0 / 255.0];
const BASE_ALPHA: f32 = 0.58;
/// Scattered grease blobs (rgb 120,80,40)
const BLOB_TINT: [f32; 3] = [120.0 / 255.0, 80.0 / 255.0, 40.0 / 255.0];
const BLOB_ALPHA: (f32, f32) = (0.05, 0.22);
const BLOB_RADIUS: (f32, f32) = (1.0, 3.2);
/// Vertical streaks left by the grill bars
const STREAK_SPACING: u32 = 90;
const STREAK_WIDTH: u32 = 3;
const STREAK_ALPHA: f32 = 0.22;

#[derive(Debug, Clone)]
pub struct StainLayer {
    width: u32,
    height: u32,
    color: Vec<[f32; 3]>,
    alpha: Vec<f32>,
}

impl StainLayer {
    /// Create a fully transparent layer
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            color: vec![[0.0; 3]; len],
            alpha: vec![0.0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate for new dimensions (contents are cleared)
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Remove all grime
    pub fn clear(&mut self) {
        self.alpha.fill(0.0);
    }

    /// Opacity at a logical pixel (0 outside the layer)
    pub fn alpha_at(&self, x: u32, y: u32) -> f32 {
        self.index(x, y).map_or(0.0, |i| self.alpha[i])
    }

    /// Straight color and opacity at a logical pixel
    pub fn texel(&self, x: u32, y: u32) -> ([f32; 3], f32) {
        self.index(x, y)
            .map_or(([0.0; 3], 0.0), |i| (self.color[i], self.alpha[i]))
    }

    /// Sum of opacity over the layer (for coverage readouts)
    pub fn total_alpha(&self) -> f32 {
        self.alpha.iter().sum()
    }

    /// Repaint the layer: a semi-opaque base film, `blobs` random grease
    /// spots, then faint vertical streaks
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R, blobs: usize) {
        self.color.fill(BASE_TINT);
        self.alpha.fill(BASE_ALPHA);

        if self.width == 0 || self.height == 0 {
            return;
        }

        let (w, h) = (self.width as f32, self.height as f32);
        for _ in 0..blobs {
            let cx = rng.random_range(0.0..w);
            let cy = rng.random_range(0.0..h);
            let r = rng.random_range(BLOB_RADIUS.0..BLOB_RADIUS.1);
            let a = rng.random_range(BLOB_ALPHA.0..BLOB_ALPHA.1);
            self.paint_disc(cx, cy, r, BLOB_TINT, a);
        }

        for x0 in (0..self.width).step_by(STREAK_SPACING as usize) {
            for x in x0..(x0 + STREAK_WIDTH).min(self.width) {
                for y in 0..self.height {
                    let i = (y * self.width + x) as usize;
                    self.paint(i, [0.0; 3], STREAK_ALPHA);
                }
            }
        }
    }

    /// Destination-out a soft disc centered at (x, y)
    pub fn erase_at(&mut self, x: f32, y: f32, radius: f32) {
        if radius.is_nan() || radius <= 0.0 || !x.is_finite() || !y.is_finite() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip_box(x, y, radius) else {
            return;
        };

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let d = (dx * dx + dy * dy).sqrt();
                if d >= radius {
                    continue;
                }
                let mask = 1.0 - d / radius;
                let i = (py * self.width + px) as usize;
                self.alpha[i] *= 1.0 - mask;
            }
        }
    }

    /// Source-over an antialiased disc
    fn paint_disc(&mut self, x: f32, y: f32, radius: f32, rgb: [f32; 3], alpha: f32) {
        let Some((x0, y0, x1, y1)) = self.clip_box(x, y, radius + 1.0) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                let coverage = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let i = (py * self.width + px) as usize;
                    self.paint(i, rgb, alpha * coverage);
                }
            }
        }
    }

    #[inline]
    fn paint(&mut self, i: usize, rgb: [f32; 3], src_a: f32) {
        let dst_a = self.alpha[i];
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let dst = self.color[i];
        let w_dst = dst_a * (1.0 - src_a);
        for c in 0..3 {
            self.color[i][c] = (rgb[c] * src_a + dst[c] * w_dst) / out_a;
        }
        self.alpha[i] = out_a;
    }

    /// Pixel range covering a disc, clipped to the layer
    fn clip_box(&self, x: f32, y: f32, radius: f32) -> Option<(u32, u32, u32, u32)> {
        let x0 = (x - radius).floor().max(0.0) as u32;
        let y0 = (y - radius).floor().max(0.0) as u32;
        let x1 = ((x + radius).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((y + radius).ceil().max(0.0) as u32).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn dirty(w: u32, h: u32, seed: u64) -> StainLayer {
        let mut layer = StainLayer::new(w, h);
        layer.regenerate(&mut Pcg32::seed_from_u64(seed), 200);
        layer
    }

    #[test]
    fn test_regenerate_covers_surface() {
        let layer = dirty(120, 80, 7);
        for y in 0..80 {
            for x in 0..120 {
                assert!(layer.alpha_at(x, y) >= BASE_ALPHA - 1e-5);
                assert!(layer.alpha_at(x, y) <= 1.0);
            }
        }

        // Streak column is darker than the base film
        let mut plain = StainLayer::new(120, 80);
        plain.regenerate(&mut Pcg32::seed_from_u64(7), 0);
        let (streak, streak_a) = plain.texel(1, 40);
        let (film, film_a) = plain.texel(10, 40);
        assert!(streak[0] < film[0]);
        assert!(streak_a > film_a);
    }

    #[test]
    fn test_erase_center_reaches_zero() {
        let mut layer = dirty(100, 100, 3);
        layer.erase_at(50.5, 50.5, 20.0);
        assert!(layer.alpha_at(50, 50) < 1e-6);
        // Rim and beyond untouched
        assert_eq!(layer.alpha_at(50, 80), dirty(100, 100, 3).alpha_at(50, 80));
    }

    #[test]
    fn test_erase_is_soft_edged() {
        let mut layer = StainLayer::new(100, 1);
        layer.alpha.fill(1.0);
        layer.erase_at(50.0, 0.5, 40.0);
        let near = layer.alpha_at(55, 0);
        let far = layer.alpha_at(80, 0);
        assert!(near < far);
        assert!(far < 1.0);
    }

    #[test]
    fn test_erase_does_not_add_color() {
        let mut layer = dirty(60, 60, 11);
        let before = layer.texel(30, 30).0;
        layer.erase_at(30.0, 30.0, 10.0);
        assert_eq!(layer.texel(30, 30).0, before);
    }

    #[test]
    fn test_degenerate_erase_is_noop() {
        let mut layer = dirty(40, 40, 5);
        let before = layer.total_alpha();
        layer.erase_at(20.0, 20.0, 0.0);
        layer.erase_at(f32::NAN, 20.0, 10.0);
        layer.erase_at(-500.0, -500.0, 10.0);
        assert_eq!(layer.total_alpha(), before);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut layer = dirty(40, 40, 5);
        layer.clear();
        assert_eq!(layer.total_alpha(), 0.0);
        layer.resize(10, 20);
        assert_eq!((layer.width(), layer.height()), (10, 20));
        assert_eq!(layer.alpha_at(9, 19), 0.0);
        assert_eq!(layer.alpha_at(10, 0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_erase_is_monotonic(
            seed in any::<u64>(),
            x in -20.0f32..100.0,
            y in -20.0f32..100.0,
            r in 0.5f32..60.0,
        ) {
            let mut layer = dirty(64, 48, seed);
            let before = layer.alpha.clone();
            layer.erase_at(x, y, r);
            for (after, before) in layer.alpha.iter().zip(before.iter()) {
                prop_assert!(*after <= *before);
                prop_assert!(*after >= 0.0);
            }
        }
    }
}
