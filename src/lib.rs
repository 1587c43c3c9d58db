//! Grill Arena - spray the bacteria off a dirty grill before time runs out
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (surface, stains, targets, spray, game state)
//! - `renderer`: Software compositing into an RGBA frame buffer
//! - `audio`: Procedural sound cues (Web Audio on wasm, silent elsewhere)
//! - `settings`: Device tier tuning and player preferences

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use audio::{AudioManager, SoundEffect};
pub use settings::{ArenaConfig, DeviceTier, Settings};

/// Game configuration constants
///
/// Motion values are expressed per tick, matching the 60 Hz frame cadence the
/// game was tuned at.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const TICK_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Smallest logical drawing surface
    pub const MIN_SURFACE_WIDTH: u32 = 280;
    pub const MIN_SURFACE_HEIGHT: u32 = 240;

    /// Round length in seconds
    pub const ROUND_SECONDS: f32 = 10.0;
    /// Resize requests closer together than this are coalesced
    pub const RESIZE_DEBOUNCE_MS: f64 = 60.0;

    /// Target (bacteria) tuning
    pub const TARGET_RADIUS_MIN: f32 = 16.0;
    pub const TARGET_RADIUS_MAX: f32 = 28.0;
    /// Max speed per axis (px/tick)
    pub const TARGET_SPEED: f32 = 1.2;
    /// Decay lost per tick once eliminated
    pub const TARGET_DECAY_STEP: f32 = 0.05;
    /// Hit when dist² < r² * factor
    pub const HIT_RADIUS_FACTOR: f32 = 0.8;
    /// Stain erase radius relative to target radius
    pub const ERASE_RADIUS_FACTOR: f32 = 1.8;

    /// Spray tuning
    pub const SPRAY_SPEED_MIN: f32 = 2.2;
    pub const SPRAY_SPEED_MAX: f32 = 4.2;
    /// Half-angle of the forward cone (radians)
    pub const SPRAY_CONE: f32 = 0.6;
    pub const SPRAY_LIFE_STEP: f32 = 0.04;
    pub const SPRAY_DOT_RADIUS: f32 = 2.2;

    /// Confetti tuning
    pub const CONFETTI_GRAVITY: f32 = 0.08;
    pub const CONFETTI_LIFE_STEP: f32 = 0.01;

    /// Win light sweep
    pub const SWEEP_SPEED: f32 = 6.0;
    pub const SWEEP_BAND: f32 = 200.0;
    pub const SWEEP_LEAD: f32 = 300.0;
    pub const SWEEP_PEAK_ALPHA: f32 = 0.18;
}

/// Convert HSL (hue in degrees, saturation/lightness in 0..1) to linear RGB in 0..1
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(360.0) / 360.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

/// Format remaining seconds for the HUD: truncated, zero-padded `00:SS`
pub fn format_timer(seconds: f32) -> String {
    let whole = seconds.max(0.0).floor() as u32;
    format!("00:{:02}", whole % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-5 && red[1].abs() < 1e-5 && red[2].abs() < 1e-5);

        let green = hsl_to_rgb(120.0, 1.0, 0.5);
        assert!(green[0].abs() < 1e-5 && (green[1] - 1.0).abs() < 1e-5);

        let grey = hsl_to_rgb(200.0, 0.0, 0.3);
        assert_eq!(grey, [0.3, 0.3, 0.3]);
    }

    #[test]
    fn test_format_timer_truncates_and_pads() {
        assert_eq!(format_timer(10.0), "00:10");
        assert_eq!(format_timer(9.99), "00:09");
        assert_eq!(format_timer(0.4), "00:00");
        assert_eq!(format_timer(-1.0), "00:00");
    }
}
