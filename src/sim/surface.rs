//! Drawing surface dimensions and resize policy

use glam::Vec2;

use crate::consts::{MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH};

/// A viewport measurement from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeRequest {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub device_pixel_ratio: f32,
}

/// Logical drawing size plus device-pixel scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Logical width (simulation units)
    pub width: u32,
    /// Logical height (simulation units)
    pub height: u32,
    /// Physical pixels per logical unit
    pub pixel_ratio: f32,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: MIN_SURFACE_WIDTH,
            height: MIN_SURFACE_HEIGHT,
            pixel_ratio: 1.0,
        }
    }
}

impl Surface {
    /// Compute the surface for a viewport. Undersized or non-finite viewports
    /// clamp to the minimum; the pixel ratio is capped at `ratio_ceiling`.
    pub fn fit(request: ResizeRequest, ratio_ceiling: f32) -> Self {
        let dim = |v: f32, min: u32| {
            if v.is_finite() {
                (v.floor().max(0.0) as u32).max(min)
            } else {
                min
            }
        };
        let dpr = if request.device_pixel_ratio.is_finite() && request.device_pixel_ratio > 0.0 {
            request.device_pixel_ratio
        } else {
            1.0
        };

        Self {
            width: dim(request.viewport_width, MIN_SURFACE_WIDTH),
            height: dim(request.viewport_height, MIN_SURFACE_HEIGHT),
            pixel_ratio: dpr.min(ratio_ceiling.max(1.0)),
        }
    }

    /// Logical size as a vector (the arena's far corner)
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Frame buffer width in physical pixels
    pub fn physical_width(&self) -> u32 {
        (self.width as f32 * self.pixel_ratio).round() as u32
    }

    /// Frame buffer height in physical pixels
    pub fn physical_height(&self) -> u32 {
        (self.height as f32 * self.pixel_ratio).round() as u32
    }
}

/// Coalesces bursts of resize requests (e.g. an orientation drag) into one
///
/// Only the newest request survives; it becomes due once `window_ms` has
/// passed without another request arriving.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    window_ms: f64,
    pending: Option<ResizeRequest>,
    due_at_ms: f64,
}

impl ResizeDebouncer {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            pending: None,
            due_at_ms: 0.0,
        }
    }

    /// Record a request, pushing the deadline out
    pub fn request(&mut self, request: ResizeRequest, now_ms: f64) {
        self.pending = Some(request);
        self.due_at_ms = now_ms + self.window_ms;
    }

    /// Take the pending request if its window has elapsed
    pub fn take_due(&mut self, now_ms: f64) -> Option<ResizeRequest> {
        if self.pending.is_some() && now_ms >= self.due_at_ms {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(w: f32, h: f32, dpr: f32) -> ResizeRequest {
        ResizeRequest {
            viewport_width: w,
            viewport_height: h,
            device_pixel_ratio: dpr,
        }
    }

    #[test]
    fn test_fit_clamps_small_viewport() {
        let s = Surface::fit(req(100.0, 50.0, 1.0), 2.0);
        assert_eq!((s.width, s.height), (MIN_SURFACE_WIDTH, MIN_SURFACE_HEIGHT));

        let s = Surface::fit(req(f32::NAN, -20.0, 1.0), 2.0);
        assert_eq!((s.width, s.height), (MIN_SURFACE_WIDTH, MIN_SURFACE_HEIGHT));
    }

    #[test]
    fn test_fit_floors_and_caps_ratio() {
        let s = Surface::fit(req(640.7, 480.2, 3.0), 1.5);
        assert_eq!((s.width, s.height), (640, 480));
        assert_eq!(s.pixel_ratio, 1.5);
        assert_eq!(s.physical_width(), 960);
        assert_eq!(s.physical_height(), 720);

        let s = Surface::fit(req(640.0, 480.0, 0.0), 2.0);
        assert_eq!(s.pixel_ratio, 1.0);
    }

    #[test]
    fn test_debouncer_coalesces_burst() {
        let mut d = ResizeDebouncer::new(60.0);
        d.request(req(300.0, 300.0, 1.0), 0.0);
        d.request(req(400.0, 300.0, 1.0), 30.0);
        d.request(req(500.0, 300.0, 1.0), 50.0);

        assert_eq!(d.take_due(100.0), None);
        assert!(d.is_pending());

        let due = d.take_due(110.0).expect("due after quiet window");
        assert_eq!(due.viewport_width, 500.0);
        assert_eq!(d.take_due(500.0), None);
    }
}
