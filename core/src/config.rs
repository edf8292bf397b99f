use crate::types::Millis;
use serde::{Deserialize, Serialize};

/// Tunable rules of a game session.
///
/// Every field has a default, so a config file only needs the values
/// it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    // ── Player ─────────────────────────────────────
    pub starting_credits: u32,
    pub starting_health:  u32,
    /// XP needed per level: level × this value.
    pub xp_per_level:     u32,
    pub max_health_per_level: u32,

    // ── Deployment rounds ──────────────────────────
    pub round_seconds:        u32,
    pub countdown_interval_ms: Millis,
    pub spawn_interval_ms:    Millis,
    pub deploy_xp:            u32,

    // ── Investigation and scanning ─────────────────
    pub investigate_cost: u32,
    pub investigate_xp:   u32,
    pub scan_cost:        u32,
    pub scan_delay_ms:    Millis,
    pub clue_delay_ms:    Millis,

    // ── Region events ──────────────────────────────
    /// Probability that arriving in a region triggers a flavor event.
    pub region_event_chance:   f64,
    pub region_event_delay_ms: Millis,

    // ── Mock provider ──────────────────────────────
    pub account_id:     String,
    pub default_region: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_credits: 500,
            starting_health: 100,
            xp_per_level: 100,
            max_health_per_level: 10,
            round_seconds: 45,
            countdown_interval_ms: 1000,
            spawn_interval_ms: 2000,
            deploy_xp: 25,
            investigate_cost: 25,
            investigate_xp: 15,
            scan_cost: 15,
            scan_delay_ms: 1500,
            clue_delay_ms: 2000,
            region_event_chance: 0.3,
            region_event_delay_ms: 2000,
            account_id: "123456789012".into(),
            default_region: "us-east-1".into(),
        }
    }
}

impl GameConfig {
    /// Load overrides from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        anyhow::ensure!(
            (0.0..=1.0).contains(&config.region_event_chance),
            "region_event_chance must be within [0, 1], got {}",
            config.region_event_chance
        );
        anyhow::ensure!(config.round_seconds > 0, "round_seconds must be positive");
        anyhow::ensure!(config.countdown_interval_ms > 0, "countdown_interval_ms must be positive");
        anyhow::ensure!(config.spawn_interval_ms > 0, "spawn_interval_ms must be positive");
        Ok(config)
    }
}
