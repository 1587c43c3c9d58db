//! Scene primitives drawn into the frame buffer

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::canvas::{BlendMode, FrameBuffer, Paint, hex_rgb};
use crate::consts::*;
use crate::hsl_to_rgb;
use crate::sim::{Confetti, Emitter, FaceStyle, StainLayer, Target};

/// Grill bar spacing and offset
const BAR_PITCH: f32 = 80.0;
const BAR_OFFSET: f32 = 20.0;
/// Faint horizontal seams
const SEAM_PITCH: f32 = 36.0;

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Three-stop gradient (0, 0.5, 1)
fn gradient3(stops: [[f32; 3]; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        lerp3(stops[0], stops[1], t * 2.0)
    } else {
        lerp3(stops[1], stops[2], (t - 0.5) * 2.0)
    }
}

/// Sample a quadratic Bezier into `n + 1` points
fn quad_curve(p0: Vec2, ctrl: Vec2, p1: Vec2, n: usize) -> Vec<Vec2> {
    (0..=n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let u = 1.0 - t;
            p0 * (u * u) + ctrl * (2.0 * u * t) + p1 * (t * t)
        })
        .collect()
}

/// Sample a circular arc (clockwise on screen, angles in radians)
fn arc_points(center: Vec2, radius: f32, start: f32, end: f32, n: usize) -> Vec<Vec2> {
    (0..=n)
        .map(|i| {
            let a = start + (end - start) * i as f32 / n as f32;
            center + Vec2::from_angle(a) * radius
        })
        .collect()
}

/// Dark steel backdrop with grill bars, rivets and seams
pub fn grill_background(fb: &mut FrameBuffer, size: Vec2) {
    let base = [hex_rgb(0x1b1c20), hex_rgb(0x0f1013), hex_rgb(0x1b1c20)];
    let height = size.y.max(1.0);
    fb.fill_rect_with(Vec2::ZERO, size, BlendMode::SourceOver, |p| {
        (gradient3(base, p.y / height), 1.0)
    });

    let metal = [hex_rgb(0x17181b), hex_rgb(0xc8ccd3), hex_rgb(0x1a1b1f)];
    let rivet = Paint::hex(0xffffff, 0.15);
    let mut x = BAR_OFFSET;
    while x < size.x {
        let left = x - 4.0;
        fb.fill_rect_with(
            Vec2::new(left, 0.0),
            Vec2::new(16.0, size.y),
            BlendMode::SourceOver,
            |p| (gradient3(metal, (p.x - left) / 16.0), 1.0),
        );
        let mut y = BAR_OFFSET;
        while y < size.y {
            fb.fill_rect(Vec2::new(x + 2.0, y), Vec2::splat(2.0), rivet);
            y += BAR_PITCH;
        }
        x += BAR_PITCH;
    }

    let seam = Paint::hex(0xffffff, 0.08);
    let mut y = 0.0;
    while y < size.y {
        fb.fill_rect(Vec2::new(0.0, y), Vec2::new(size.x, 1.0), seam);
        y += SEAM_PITCH;
    }
}

/// Composite the grime raster (logical pixels, nearest sample)
pub fn stain_layer(fb: &mut FrameBuffer, layer: &StainLayer) {
    let scale = fb.scale();
    for py in 0..fb.height() {
        let ly = ((py as f32 + 0.5) / scale) as u32;
        for px in 0..fb.width() {
            let lx = ((px as f32 + 0.5) / scale) as u32;
            let (rgb, alpha) = layer.texel(lx, ly);
            if alpha > 0.0 {
                fb.blend(px, py, rgb, alpha, BlendMode::SourceOver);
            }
        }
    }
}

/// A bacterium: lobed body, whiskers, blinking eyes and a mouth
pub fn target(fb: &mut FrameBuffer, target: &Target, clock: f32) {
    let fade = target.alpha();
    if fade <= 0.0 {
        return;
    }
    let look = &target.look;
    let r = target.radius;
    let amp = r * look.wobble;
    let lobes = look.lobes as f32;
    let center = target.pos;

    // Body
    let lightness = if target.eliminated { 0.42 } else { 0.55 };
    let body = Paint::new(hsl_to_rgb(look.hue, 0.8, lightness), fade);
    fb.fill_radial(center, r + amp, body, |a| {
        r + (a * lobes + look.phase + clock * 1.6).sin() * amp
    });

    // Whiskers
    let whisker = Paint::new(hsl_to_rgb(look.hue, 0.8, 0.3), 0.6 * fade);
    for i in 0..4 {
        let a = i as f32 / 4.0 * TAU + look.phase;
        let dir = Vec2::from_angle(a);
        let root = center + dir * (r + (a * lobes + clock * 1.4).sin() * amp + 2.0);
        fb.stroke_polyline(&[root, root + dir * 14.0], 1.2, whisker);
    }

    // Eyes
    let open = (clock * 2.0 + look.blink * 6.0).sin() > -0.4;
    let eye_r = r * 0.16;
    let eye = Vec2::new(eye_r, if open { eye_r } else { eye_r * 0.2 });
    let pupil = Paint::new([0.0; 3], 0.65 * fade);
    fb.fill_ellipse(center + Vec2::new(-r * 0.35, -r * 0.15), eye, pupil);
    fb.fill_ellipse(center + Vec2::new(r * 0.35, -r * 0.15), eye, pupil);

    // Mouth
    let ink = Paint::hex(0x0b0b0f, fade);
    let width = (r * 0.12).max(2.0);
    let breathe = (clock * 2.0).sin();
    let mouth = match look.face {
        FaceStyle::Smile => {
            arc_points(center + Vec2::new(0.0, r * 0.2), r * 0.45, 0.1, PI - 0.1, 16)
        }
        FaceStyle::Smirk => quad_curve(
            center + Vec2::new(-r * 0.4, r * 0.28),
            center + Vec2::new(0.0, r * (0.05 + 0.05 * breathe)),
            center + Vec2::new(r * 0.4, r * 0.28),
            12,
        ),
        FaceStyle::Gasp => arc_points(
            center + Vec2::new(0.0, r * 0.1),
            r * (0.22 + 0.03 * breathe),
            0.0,
            TAU,
            24,
        ),
    };
    fb.stroke_polyline(&mouth, width, ink);
}

/// Cleaner droplets, fading with life
pub fn spray(fb: &mut FrameBuffer, emitter: &Emitter) {
    let droplet = Paint::new([1.0; 3], 0.9);
    for p in emitter.iter() {
        fb.fill_circle(p.pos, SPRAY_DOT_RADIUS, droplet.faded(p.life.max(0.1)));
    }
}

pub fn confetti(fb: &mut FrameBuffer, pieces: &[Confetti]) {
    for c in pieces {
        let alpha = c.life.max(0.0);
        if alpha <= 0.0 {
            continue;
        }
        fb.fill_rect(c.pos, c.size, Paint::new(hsl_to_rgb(c.hue, 0.9, 0.6), alpha));
    }
}

/// Diagonal highlight band starting at `start_x`, screened over the frame
pub fn light_sweep(fb: &mut FrameBuffer, start_x: f32, size: Vec2) {
    let origin = Vec2::new(start_x, 0.0);
    let axis = Vec2::new(SWEEP_BAND, size.y);
    let len2 = axis.length_squared().max(1.0);
    fb.fill_rect_with(
        Vec2::new(start_x - 50.0, 0.0),
        Vec2::new(SWEEP_BAND + 60.0, size.y),
        BlendMode::Screen,
        |p| {
            let t = (p - origin).dot(axis) / len2;
            let peak = (1.0 - (t - 0.5).abs() * 2.0).clamp(0.0, 1.0);
            ([1.0; 3], peak * SWEEP_PEAK_ALPHA)
        },
    );
}
