//! Frame composition
//!
//! Layers go down in a fixed order: background, stain, targets, spray, then
//! the win-only confetti and light sweep on top.

use super::canvas::FrameBuffer;
use super::shapes;
use crate::sim::{GamePhase, Session};

/// Owns the frame buffer and keeps it sized to the session surface
#[derive(Debug, Clone)]
pub struct Renderer {
    frame: FrameBuffer,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            frame: FrameBuffer::new(0, 0),
        }
    }

    /// Compose the current session state and return the finished frame
    pub fn render(&mut self, session: &Session) -> &FrameBuffer {
        render_frame(session, &mut self.frame);
        &self.frame
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}

/// Draw one frame of `session` into `fb`, resizing it to the physical surface
pub fn render_frame(session: &Session, fb: &mut FrameBuffer) {
    let surface = session.surface();
    fb.resize(surface.physical_width(), surface.physical_height());
    fb.set_scale(surface.pixel_ratio);
    fb.clear();

    let size = surface.size();
    shapes::grill_background(fb, size);
    shapes::stain_layer(fb, session.stain());

    let clock = session.clock();
    for target in session.targets().iter() {
        shapes::target(fb, target, clock);
    }
    shapes::spray(fb, session.spray());

    if session.phase() == GamePhase::Won {
        let celebration = session.celebration();
        shapes::confetti(fb, &celebration.confetti);
        shapes::light_sweep(fb, celebration.sweep_x(size.x), size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{ResizeRequest, SprayParticle, Target};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn empty_arena(seed: u64) -> Session {
        let mut s = Session::new(Settings::default(), seed);
        let bounds = s.surface().size();
        s.targets_mut()
            .spawn(0, bounds, &mut Pcg32::seed_from_u64(0));
        s
    }

    fn luma(fb: &FrameBuffer, x: u32, y: u32) -> u32 {
        fb.pixel(x, y)
            .map(|p| p[0] as u32 + p[1] as u32 + p[2] as u32)
            .unwrap_or(0)
    }

    #[test]
    fn test_frame_matches_physical_surface() {
        let mut s = empty_arena(1);
        s.resize_now(ResizeRequest {
            viewport_width: 320.0,
            viewport_height: 260.0,
            device_pixel_ratio: 2.0,
        });
        let mut renderer = Renderer::new();
        let frame = renderer.render(&s);
        assert_eq!((frame.width(), frame.height()), (640, 520));
        assert_eq!(frame.as_bytes().len(), 640 * 520 * 4);
        assert!(frame.as_bytes().chunks(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_stain_sits_under_targets() {
        let mut s = empty_arena(2);
        let mut t = Target::random(0, s.surface().size(), &mut Pcg32::seed_from_u64(8));
        t.pos = Vec2::new(120.0, 120.0);
        t.vel = Vec2::ZERO;
        t.radius = 24.0;
        t.look.face = crate::sim::FaceStyle::Smile;
        s.targets_mut().insert(t);

        let mut renderer = Renderer::new();
        let dirty = renderer.render(&s).pixel(120, 120);
        s.stain.clear();
        let clean = renderer.render(&s).pixel(120, 120);
        assert_eq!(dirty, clean);

        // Away from the target the grime shows
        let mut dirty_arena = empty_arena(2);
        let grimy = luma(Renderer::new().render(&dirty_arena), 60, 200);
        dirty_arena.stain.clear();
        let bare = luma(Renderer::new().render(&dirty_arena), 60, 200);
        assert_ne!(grimy, bare);
    }

    #[test]
    fn test_spray_drawn_over_scene() {
        let mut s = empty_arena(3);
        let mut renderer = Renderer::new();
        let before = luma(renderer.render(&s), 60, 100);
        s.emitter.push(SprayParticle {
            seq: 0,
            pos: Vec2::new(60.5, 100.5),
            vel: Vec2::ZERO,
            life: 1.0,
        });
        let after = luma(renderer.render(&s), 60, 100);
        assert!(after > before + 300);
    }

    #[test]
    fn test_sweep_only_when_won() {
        let mut s = empty_arena(4);
        s.celebration.sweep = 400.0;
        let mut renderer = Renderer::new();

        let playing = luma(renderer.render(&s), 200, 120);
        s.phase = GamePhase::Won;
        let won = luma(renderer.render(&s), 200, 120);
        assert!(won > playing);
    }
}
