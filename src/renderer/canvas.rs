//! Software canvas
//!
//! Straight-alpha RGBA8 frame buffer. Draw calls take logical coordinates and
//! are scaled to physical pixels by the buffer's `scale` (the device pixel
//! ratio). Edges get one physical pixel of coverage antialiasing.

use glam::Vec2;

/// How a source color combines with the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha compositing
    #[default]
    SourceOver,
    /// `1 - (1 - src)(1 - dst)`, weighted by source alpha. Only brightens.
    Screen,
}

/// Flat fill: straight color in 0..1 plus opacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub rgb: [f32; 3],
    pub alpha: f32,
    pub mode: BlendMode,
}

impl Paint {
    pub const fn new(rgb: [f32; 3], alpha: f32) -> Self {
        Self {
            rgb,
            alpha,
            mode: BlendMode::SourceOver,
        }
    }

    /// From a `0xRRGGBB` literal
    pub fn hex(rgb: u32, alpha: f32) -> Self {
        Self::new(hex_rgb(rgb), alpha)
    }

    /// Scale opacity (layer-wide fade)
    pub fn faded(self, factor: f32) -> Self {
        Self {
            alpha: self.alpha * factor,
            ..self
        }
    }
}

/// `0xRRGGBB` to channels in 0..1
pub fn hex_rgb(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Composite one straight-alpha source over one destination pixel
fn blend_pixel(dst: &mut [u8; 4], rgb: [f32; 3], alpha: f32, mode: BlendMode) {
    let sa = alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    for c in 0..3 {
        let d = dst[c] as f32 / 255.0;
        let s = match mode {
            BlendMode::SourceOver => rgb[c],
            BlendMode::Screen => 1.0 - (1.0 - rgb[c]) * (1.0 - d),
        };
        dst[c] = to_u8((s * sa + d * da * (1.0 - sa)) / out_a);
    }
    dst[3] = to_u8(out_a);
}

/// Distance from `p` to the segment `a..b`
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// RGBA8 frame buffer (row-major, top-left origin)
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    /// Physical pixels per logical unit
    scale: f32,
    pixels: Vec<[u8; 4]>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            pixels: vec![[0; 4]; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Reallocate for a new physical size (contents are discarded)
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![[0; 4]; (width as usize) * (height as usize)];
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
    }

    /// Reset to fully transparent
    pub fn clear(&mut self) {
        self.pixels.fill([0; 4]);
    }

    /// Physical pixel, `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
    }

    /// Raw RGBA bytes, ready for an `ImageData` upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Blend into one physical pixel (ignored outside the buffer)
    pub fn blend(&mut self, x: u32, y: u32, rgb: [f32; 3], alpha: f32, mode: BlendMode) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize) * (self.width as usize) + x as usize;
        if let Some(dst) = self.pixels.get_mut(i) {
            blend_pixel(dst, rgb, alpha, mode);
        }
    }

    /// Logical center of a physical pixel
    #[inline]
    fn logical(&self, px: u32, py: u32) -> Vec2 {
        Vec2::new(px as f32 + 0.5, py as f32 + 0.5) / self.scale
    }

    /// Physical pixel range covering a logical box, clipped to the buffer
    fn physical_box(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let lo = (min * self.scale).floor().max(Vec2::ZERO);
        let hi = (max * self.scale).ceil();
        let x0 = lo.x as u32;
        let y0 = lo.y as u32;
        let x1 = (hi.x.max(0.0) as u32).min(self.width);
        let y1 = (hi.y.max(0.0) as u32).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Run `coverage` over every pixel in a logical box and blend by it
    fn cover(&mut self, min: Vec2, max: Vec2, paint: Paint, coverage: impl Fn(Vec2) -> f32) {
        let Some((x0, y0, x1, y1)) = self.physical_box(min, max) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let c = coverage(self.logical(px, py));
                if c > 0.0 {
                    self.blend(px, py, paint.rgb, paint.alpha * c.min(1.0), paint.mode);
                }
            }
        }
    }

    /// Axis-aligned rectangle (hard edges)
    pub fn fill_rect(&mut self, pos: Vec2, size: Vec2, paint: Paint) {
        self.fill_rect_with(pos, size, paint.mode, |_| (paint.rgb, paint.alpha));
    }

    /// Rectangle shaded per pixel; `shader` maps a logical point to color and
    /// opacity (gradients)
    pub fn fill_rect_with(
        &mut self,
        pos: Vec2,
        size: Vec2,
        mode: BlendMode,
        shader: impl Fn(Vec2) -> ([f32; 3], f32),
    ) {
        let max = pos + size;
        let Some((x0, y0, x1, y1)) = self.physical_box(pos, max) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let p = self.logical(px, py);
                if p.x < pos.x || p.y < pos.y || p.x >= max.x || p.y >= max.y {
                    continue;
                }
                let (rgb, alpha) = shader(p);
                self.blend(px, py, rgb, alpha, mode);
            }
        }
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.fill_ellipse(center, Vec2::splat(radius), paint);
    }

    /// Axis-aligned ellipse with radii `radii`
    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, paint: Paint) {
        if radii.is_nan() || radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let short = radii.x.min(radii.y);
        let pad = Vec2::splat(1.0);
        let scale = self.scale;
        self.cover(center - radii - pad, center + radii + pad, paint, |p| {
            let f = ((p - center) / radii).length();
            ((1.0 - f) * short * scale + 0.5).clamp(0.0, 1.0)
        });
    }

    /// Star-shaped region around `center`; `radius_at(angle)` gives the
    /// boundary distance and never exceeds `max_radius`
    pub fn fill_radial(
        &mut self,
        center: Vec2,
        max_radius: f32,
        paint: Paint,
        radius_at: impl Fn(f32) -> f32,
    ) {
        if max_radius.is_nan() || max_radius <= 0.0 {
            return;
        }
        let reach = Vec2::splat(max_radius + 1.0);
        let scale = self.scale;
        self.cover(center - reach, center + reach, paint, |p| {
            let offset = p - center;
            let boundary = radius_at(offset.y.atan2(offset.x));
            ((boundary - offset.length()) * scale + 0.5).clamp(0.0, 1.0)
        });
    }

    /// Stroke an open polyline with round joins and caps. Overlapping
    /// segments blend once.
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, paint: Paint) {
        let Some(&first) = points.first() else {
            return;
        };
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let half = width * 0.5;
        let (mut min, mut max) = (first, first);
        for &p in points {
            min = min.min(p);
            max = max.max(p);
        }
        let pad = Vec2::splat(half + 1.0);
        let scale = self.scale;
        self.cover(min - pad, max + pad, paint, |p| {
            let d = if points.len() == 1 {
                p.distance(first)
            } else {
                points
                    .windows(2)
                    .map(|w| segment_distance(p, w[0], w[1]))
                    .fold(f32::INFINITY, f32::min)
            };
            ((half - d) * scale + 0.5).clamp(0.0, 1.0)
        });
    }
}
