use serde::{Deserialize, Serialize};

use crate::crush::CrushMode;

/// Behavior switches that reproduce quirks of older engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatFlags {
    /// Let a rising floor pass its own ceiling (and a lowering ceiling its
    /// floor) instead of clamping the destination.
    #[serde(default)]
    pub floor_move: bool,
    /// Advance the stair height even for neighbours skipped as busy, like
    /// Doom did.
    #[serde(default)]
    pub stair_index: bool,
}

/// Configuration for a level run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// RNG seed for perpetual platforms picking their first direction.
    pub seed: u64,
    /// Crush mode applied when an activation does not name one.
    pub crush_mode: CrushMode,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Compatibility switches.
    #[serde(default)]
    pub compat: CompatFlags,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            crush_mode: CrushMode::Doom,
            max_events: 0,
            compat: CompatFlags::default(),
        }
    }
}

impl SimConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the default crush mode.
    pub fn with_crush_mode(mut self, mode: CrushMode) -> Self {
        self.crush_mode = mode;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Replace the compatibility switches.
    pub fn with_compat(mut self, compat: CompatFlags) -> Self {
        self.compat = compat;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.crush_mode, CrushMode::Doom);
        assert_eq!(config.max_events, 0);
        assert!(!config.compat.floor_move);
        assert!(!config.compat.stair_index);
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_crush_mode(CrushMode::Hexen)
            .with_max_events(500)
            .with_compat(CompatFlags {
                floor_move: true,
                stair_index: false,
            });
        assert_eq!(config.seed, 123);
        assert_eq!(config.crush_mode, CrushMode::Hexen);
        assert_eq!(config.max_events, 500);
        assert!(config.compat.floor_move);
    }

    #[test]
    fn config_compat_defaults_when_missing_from_json() {
        let config: SimConfig =
            serde_json::from_str(r#"{"seed":7,"crush_mode":"Slowdown","max_events":10}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.crush_mode, CrushMode::Slowdown);
        assert_eq!(config.compat, CompatFlags::default());
    }
}
