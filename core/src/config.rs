use std::path::Path;

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Fallbackverdier når verken predikert eller faktisk aggregat finnes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthDefaults {
    pub duration_minutes: f64,
    pub avg_heart_rate: f64,
    pub max_heart_rate: f64,
    pub avg_speed: f64, // km/t
    pub max_speed: f64, // km/t
    pub min_samples: usize,
    /// Øvre grense for antall syntetiske punkter.
    pub max_samples: usize,
    pub cadence: f64, // fast plassholder, modelleres ikke
}

impl Default for SynthDefaults {
    fn default() -> Self {
        Self {
            duration_minutes: 120.0,
            avg_heart_rate: 140.0,
            max_heart_rate: 190.0,
            avg_speed: 4.0,
            max_speed: 10.0,
            min_samples: 10,
            max_samples: 10_000,
            cadence: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Vindu for sammenslåing av render-kall (ms).
    pub render_debounce_ms: u64,
    /// Syklisk palett for ekte fullføringer.
    pub palette: Vec<String>,
    /// Reservert nøytral farge for den predikerte serien.
    pub synthetic_color: String,
    pub synth: SynthDefaults,
    pub http: HttpConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_debounce_ms: 100,
            palette: [
                "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            synthetic_color: "#9ca3af".to_string(),
            synth: SynthDefaults::default(),
            http: HttpConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.palette.is_empty() {
            return Err(EngineError::InvalidConfig("palette must not be empty".into()));
        }
        if self.palette.iter().any(|c| c == &self.synthetic_color) {
            return Err(EngineError::InvalidConfig(
                "synthetic_color must not be part of the palette".into(),
            ));
        }
        let s = &self.synth;
        if !(s.duration_minutes > 0.0 && s.avg_heart_rate > 0.0 && s.avg_speed > 0.0) {
            return Err(EngineError::InvalidConfig("synth defaults must be positive".into()));
        }
        if s.max_heart_rate < 60.0 || s.max_speed < 1.0 {
            return Err(EngineError::InvalidConfig(
                "synth max values below clamp floor (60 bpm / 1.0 km/h)".into(),
            ));
        }
        if s.max_samples < s.min_samples.max(2) {
            return Err(EngineError::InvalidConfig("synth.max_samples below min_samples".into()));
        }
        Ok(())
    }
}

/// Leser config fra disk (JSON).
/// Hvis filen ikke finnes, returneres default.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, EngineError> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let cfg: EngineConfig = crate::types::parse_json(&contents, "EngineConfig")?;
        cfg.validate()?;
        info!("config loaded from {} (debounce={}ms)", path.display(), cfg.render_debounce_ms);
        Ok(cfg)
    } else {
        info!("no config at {}, using defaults", path.display());
        Ok(EngineConfig::default())
    }
}

/// Lagrer config som JSON (pretty-print).
pub fn save_config(cfg: &EngineConfig, path: impl AsRef<Path>) -> Result<(), EngineError> {
    let path = path.as_ref();
    cfg.validate()?;
    let json = serde_json::to_string_pretty(cfg)?;
    std::fs::write(path, json)?;
    info!("config saved to {}", path.display());
    Ok(())
}

/// Config-sti fra `TRAIL_COMPARE_CONFIG`, ellers default.
pub fn load_config_from_env() -> anyhow::Result<EngineConfig> {
    match std::env::var("TRAIL_COMPARE_CONFIG") {
        Ok(path) => load_config(&path).with_context(|| format!("loading config from {path}")),
        Err(_) => Ok(EngineConfig::default()),
    }
}
