//! Audio system using Web Audio API
//!
//! Procedurally generated cues - no external files needed. The spray hiss is
//! the one long-lived source: it starts on press and must be stopped on
//! release, round end and restart. Every call here is infallible; a missing
//! or misbehaving audio backend only costs the sound.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Target eliminated - short descending pop
    Pop,
    /// Round won - rising chime
    Win,
}

/// Audio manager for the arena
pub struct AudioManager {
    enabled: bool,
    master_volume: f32,
    spray_active: bool,
    last_effect: Option<SoundEffect>,
    #[cfg(target_arch = "wasm32")]
    web: web::WebAudio,
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("enabled", &self.enabled)
            .field("master_volume", &self.master_volume)
            .field("spray_active", &self.spray_active)
            .finish()
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(true, 0.22)
    }
}

impl AudioManager {
    pub fn new(enabled: bool, master_volume: f32) -> Self {
        Self {
            enabled,
            master_volume: master_volume.clamp(0.0, 1.0),
            spray_active: false,
            last_effect: None,
            #[cfg(target_arch = "wasm32")]
            web: web::WebAudio::default(),
        }
    }

    /// Mute/unmute all audio (muting also stops the spray hiss)
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop_spray();
        }
        self.enabled = enabled;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        #[cfg(target_arch = "wasm32")]
        self.web.set_volume(self.master_volume);
    }

    /// Whether a spray hiss source is currently alive
    pub fn spray_active(&self) -> bool {
        self.spray_active
    }

    /// Most recent cue requested (cleared on round reset)
    pub fn last_effect(&self) -> Option<SoundEffect> {
        self.last_effect
    }

    pub fn clear_last_effect(&mut self) {
        self.last_effect = None;
    }

    /// Start the looping spray hiss, replacing any running one
    pub fn start_spray(&mut self) {
        if !self.enabled {
            return;
        }
        self.stop_spray();
        #[cfg(target_arch = "wasm32")]
        {
            self.spray_active = self.web.start_noise(self.master_volume);
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.spray_active = true;
        }
    }

    /// Stop the spray hiss. Safe to call when nothing is running.
    pub fn stop_spray(&mut self) {
        if !self.spray_active {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        self.web.stop_noise();
        self.spray_active = false;
    }

    /// Play a one-shot cue
    pub fn play(&mut self, effect: SoundEffect) {
        if !self.enabled || self.master_volume <= 0.0 {
            return;
        }
        self.last_effect = Some(effect);
        #[cfg(target_arch = "wasm32")]
        self.web.play(effect);
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioBufferSourceNode, AudioContext, BiquadFilterType, GainNode, OscillatorNode,
        OscillatorType,
    };

    use super::SoundEffect;

    /// Lazily created Web Audio graph: context -> master gain -> destination
    #[derive(Default)]
    pub(super) struct WebAudio {
        ctx: Option<AudioContext>,
        master: Option<GainNode>,
        noise: Option<AudioBufferSourceNode>,
        failed: bool,
    }

    impl WebAudio {
        /// Create the context on first use (browsers require a user gesture)
        fn ensure(&mut self, volume: f32) -> Option<(AudioContext, GainNode)> {
            if self.failed {
                return None;
            }
            if self.ctx.is_none() {
                let Ok(ctx) = AudioContext::new() else {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    self.failed = true;
                    return None;
                };
                let Ok(master) = ctx.create_gain() else {
                    log::warn!("Failed to create master gain - audio disabled");
                    self.failed = true;
                    return None;
                };
                master.gain().set_value(volume);
                if master.connect_with_audio_node(&ctx.destination()).is_err() {
                    log::warn!("Failed to connect master gain - audio disabled");
                    self.failed = true;
                    return None;
                }
                self.ctx = Some(ctx);
                self.master = Some(master);
            }
            let ctx = self.ctx.clone()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some((ctx, self.master.clone()?))
        }

        pub(super) fn set_volume(&self, volume: f32) {
            if let Some(master) = &self.master {
                master.gain().set_value(volume);
            }
        }

        /// One second of white noise, high-passed at 1 kHz, looped
        pub(super) fn start_noise(&mut self, volume: f32) -> bool {
            let Some((ctx, master)) = self.ensure(volume) else {
                return false;
            };
            let rate = ctx.sample_rate();
            let Ok(buffer) = ctx.create_buffer(1, rate as u32, rate) else {
                return false;
            };
            let samples: Vec<f32> = (0..rate as usize)
                .map(|_| js_sys::Math::random() as f32 * 2.0 - 1.0)
                .collect();
            if buffer.copy_to_channel(&samples, 0).is_err() {
                return false;
            }
            let Ok(src) = ctx.create_buffer_source() else {
                return false;
            };
            let Ok(filter) = ctx.create_biquad_filter() else {
                return false;
            };
            src.set_buffer(Some(&buffer));
            src.set_loop(true);
            filter.set_type(BiquadFilterType::Highpass);
            filter.frequency().set_value(1000.0);
            if src.connect_with_audio_node(&filter).is_err()
                || filter.connect_with_audio_node(&master).is_err()
                || src.start().is_err()
            {
                let _ = src.disconnect();
                return false;
            }
            self.noise = Some(src);
            true
        }

        pub(super) fn stop_noise(&mut self) {
            if let Some(src) = self.noise.take() {
                let _ = src.stop();
                let _ = src.disconnect();
            }
        }

        pub(super) fn play(&mut self, effect: SoundEffect) {
            // Cues never create the context; only a press does
            let (Some(ctx), Some(master)) = (self.ctx.clone(), self.master.clone()) else {
                return;
            };
            match effect {
                SoundEffect::Pop => Self::sweep(
                    &ctx,
                    &master,
                    OscillatorType::Sine,
                    600.0,
                    120.0,
                    0.12,
                    0.35,
                    0.13,
                ),
                SoundEffect::Win => Self::sweep(
                    &ctx,
                    &master,
                    OscillatorType::Triangle,
                    440.0,
                    880.0,
                    0.25,
                    0.5,
                    0.45,
                ),
            }
        }

        /// Oscillator with an exponential pitch sweep and decaying gain
        #[allow(clippy::too_many_arguments)]
        fn sweep(
            ctx: &AudioContext,
            master: &GainNode,
            osc_type: OscillatorType,
            from_hz: f32,
            to_hz: f32,
            sweep_secs: f64,
            peak: f32,
            stop_secs: f64,
        ) {
            let Some((osc, gain)) = Self::create_osc(ctx, master, osc_type) else {
                return;
            };
            let t = ctx.current_time();
            osc.frequency().set_value_at_time(from_hz, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to_hz, t + sweep_secs)
                .ok();
            gain.gain().set_value_at_time(peak, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + stop_secs - 0.01)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + stop_secs).ok();
        }

        fn create_osc(
            ctx: &AudioContext,
            master: &GainNode,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(osc_type);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(master).ok()?;
            Some((osc, gain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_spray_is_idempotent() {
        let mut audio = AudioManager::default();
        audio.stop_spray();
        assert!(!audio.spray_active());

        audio.start_spray();
        assert!(audio.spray_active());
        audio.stop_spray();
        audio.stop_spray();
        assert!(!audio.spray_active());
    }

    #[test]
    fn test_restart_spray_keeps_single_source() {
        let mut audio = AudioManager::default();
        audio.start_spray();
        audio.start_spray();
        assert!(audio.spray_active());
        audio.stop_spray();
        assert!(!audio.spray_active());
    }

    #[test]
    fn test_disabled_audio_is_silent() {
        let mut audio = AudioManager::new(false, 0.5);
        audio.start_spray();
        audio.play(SoundEffect::Pop);
        assert!(!audio.spray_active());
        assert_eq!(audio.last_effect(), None);
    }

    #[test]
    fn test_muting_stops_spray() {
        let mut audio = AudioManager::default();
        audio.start_spray();
        audio.set_enabled(false);
        assert!(!audio.spray_active());
        audio.play(SoundEffect::Win);
        assert_eq!(audio.last_effect(), None);
    }
}
