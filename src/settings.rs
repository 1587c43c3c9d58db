//! Device tier tuning and player preferences
//!
//! Preferences are persisted in LocalStorage on the web; the tier table is
//! passed to the simulation at construction so nothing sniffs the user agent.

use serde::{Deserialize, Serialize};

use crate::consts::{RESIZE_DEBOUNCE_MS, ROUND_SECONDS};

/// Hardware class hint from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceTier {
    /// Phones and tablets: fewer particles, lower pixel density
    Constrained,
    #[default]
    Full,
}

impl DeviceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTier::Constrained => "Constrained",
            DeviceTier::Full => "Full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "constrained" | "mobile" => Some(DeviceTier::Constrained),
            "full" | "desktop" => Some(DeviceTier::Full),
            _ => None,
        }
    }

    /// Targets spawned at round start
    pub fn spawn_count(&self) -> usize {
        match self {
            DeviceTier::Constrained => 7,
            DeviceTier::Full => 10,
        }
    }

    /// Spray particles emitted per tick while pressed
    pub fn particles_per_tick(&self) -> usize {
        match self {
            DeviceTier::Constrained => 4,
            DeviceTier::Full => 8,
        }
    }

    /// Live spray particle cap
    pub fn particle_cap(&self) -> usize {
        match self {
            DeviceTier::Constrained => 280,
            DeviceTier::Full => 480,
        }
    }

    /// Grime blobs scattered per stain regeneration
    pub fn stain_blobs(&self) -> usize {
        match self {
            DeviceTier::Constrained => 420,
            DeviceTier::Full => 700,
        }
    }

    /// Confetti pieces in the win burst
    pub fn confetti_count(&self) -> usize {
        match self {
            DeviceTier::Constrained => 90,
            DeviceTier::Full => 140,
        }
    }

    /// Device pixel ratio ceiling
    pub fn pixel_ratio_ceiling(&self) -> f32 {
        match self {
            DeviceTier::Constrained => 1.5,
            DeviceTier::Full => 2.0,
        }
    }
}

/// Explicit simulation tuning record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub tier: DeviceTier,
    pub spawn_count: usize,
    /// Targets shown before the first round
    pub idle_preview_count: usize,
    pub particles_per_tick: usize,
    pub particle_cap: usize,
    pub stain_blobs: usize,
    pub confetti_count: usize,
    pub pixel_ratio_ceiling: f32,
    pub round_seconds: f32,
    pub resize_debounce_ms: f64,
}

impl ArenaConfig {
    /// Build the tuning table for a device tier
    pub fn for_tier(tier: DeviceTier) -> Self {
        Self {
            tier,
            spawn_count: tier.spawn_count(),
            idle_preview_count: 8,
            particles_per_tick: tier.particles_per_tick(),
            particle_cap: tier.particle_cap(),
            stain_blobs: tier.stain_blobs(),
            confetti_count: tier.confetti_count(),
            pixel_ratio_ceiling: tier.pixel_ratio_ceiling(),
            round_seconds: ROUND_SECONDS,
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::for_tier(DeviceTier::default())
    }
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Device tier hint
    pub tier: DeviceTier,

    // === Audio ===
    /// Sound cues enabled
    pub sound: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Accessibility ===
    /// Reduced motion: the spray stream is not drawn or simulated
    pub reduced_motion: bool,
    /// Short vibration pulse on press
    pub haptics: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tier: DeviceTier::Full,
            sound: true,
            master_volume: 0.22,
            reduced_motion: false,
            haptics: true,
        }
    }
}

impl Settings {
    /// Settings for a tier with other preferences at defaults
    pub fn for_tier(tier: DeviceTier) -> Self {
        Self {
            tier,
            ..Self::default()
        }
    }

    /// Tuning record matching these settings
    pub fn arena_config(&self) -> ArenaConfig {
        ArenaConfig::for_tier(self.tier)
    }

    /// Spray particles are generated only when motion is allowed
    pub fn emission_allowed(&self) -> bool {
        !self.reduced_motion
    }

    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        Ok(settings)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "grill_arena_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table() {
        let mobile = ArenaConfig::for_tier(DeviceTier::Constrained);
        let desktop = ArenaConfig::for_tier(DeviceTier::Full);

        assert_eq!(mobile.spawn_count, 7);
        assert_eq!(desktop.spawn_count, 10);
        assert!(mobile.particle_cap < desktop.particle_cap);
        assert!(mobile.stain_blobs < desktop.stain_blobs);
        assert!(mobile.pixel_ratio_ceiling < desktop.pixel_ratio_ceiling);
        assert_eq!(mobile.idle_preview_count, desktop.idle_preview_count);
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!(DeviceTier::from_str("Mobile"), Some(DeviceTier::Constrained));
        assert_eq!(DeviceTier::from_str("full"), Some(DeviceTier::Full));
        assert_eq!(DeviceTier::from_str("toaster"), None);
    }

    #[test]
    fn test_settings_json_defaults_and_clamp() {
        let settings = Settings::from_json(r#"{"reduced_motion": true, "master_volume": 3.0}"#)
            .expect("valid json");
        assert!(settings.reduced_motion);
        assert!(!settings.emission_allowed());
        assert!(settings.sound);
        assert_eq!(settings.master_volume, 1.0);

        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_settings_round_trip_through_json() {
        let settings = Settings::for_tier(DeviceTier::Constrained);
        let json = serde_json::to_string(&settings).expect("serialize");
        let loaded = Settings::from_json(&json).expect("parse");
        assert_eq!(loaded.tier, DeviceTier::Constrained);
        assert_eq!(loaded.arena_config().spawn_count, 7);
    }
}
