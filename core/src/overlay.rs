use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::types::NormalizedSample;

/// Nøkkelen den predikerte serien alltid registreres under.
pub const PREDICTED_KEY: &str = "predicted";

/// Visningsfarge (CSS-hex) for en serie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(pub String);

impl ColorToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEntry {
    pub key: String,
    pub series: Vec<NormalizedSample>,
    pub color: ColorToken,
    pub is_synthetic: bool,
    pub completion_date: Option<DateTime<Utc>>,
}

/// Nøklede serier som vises samtidig i sammenligningsgrafen.
///
/// Maks én syntetisk serie. Ekte nøkler registreres idempotent.
/// Farger for ekte serier tas syklisk fra paletten etter
/// innsettingsrekkefølge blant ekte serier; den syntetiske får alltid
/// den nøytrale fargen.
#[derive(Debug, Clone)]
pub struct CompletionOverlaySet {
    entries: Vec<CompletionEntry>,
    palette: Vec<ColorToken>,
    synthetic_color: ColorToken,
    real_inserted: usize,
}

impl Default for CompletionOverlaySet {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl CompletionOverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            entries: Vec::new(),
            palette: cfg.palette.iter().cloned().map(ColorToken).collect(),
            synthetic_color: ColorToken(cfg.synthetic_color.clone()),
            real_inserted: 0,
        }
    }

    /// Returnerer `true` når registeret faktisk endret seg.
    pub fn add(
        &mut self,
        key: &str,
        series: Vec<NormalizedSample>,
        is_synthetic: bool,
        completion_date: Option<DateTime<Utc>>,
    ) -> bool {
        if is_synthetic {
            if self.real_entries().any(|e| e.key == key) {
                debug!("overlay: synthetic key '{}' is taken by a real entry, ignoring", key);
                return false;
            }
            self.entries.retain(|e| !e.is_synthetic);
            self.entries.push(CompletionEntry {
                key: key.to_string(),
                series,
                color: self.synthetic_color.clone(),
                is_synthetic: true,
                completion_date,
            });
            debug!("overlay: synthetic entry '{}' set", key);
            return true;
        }

        if self.contains(key) {
            debug!("overlay: '{}' already registered, ignoring", key);
            return false;
        }

        let color = if self.palette.is_empty() {
            self.synthetic_color.clone()
        } else {
            self.palette[self.real_inserted % self.palette.len()].clone()
        };
        self.real_inserted += 1;

        self.entries.push(CompletionEntry {
            key: key.to_string(),
            series,
            color,
            is_synthetic: false,
            completion_date,
        });
        debug!("overlay: added '{}' ({} entries)", key, self.entries.len());
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        before != self.entries.len()
    }

    /// Tømmer registeret; fargeindeksen starter på nytt.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.real_inserted = 0;
    }

    pub fn entries(&self) -> &[CompletionEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&CompletionEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn synthetic(&self) -> Option<&CompletionEntry> {
        self.entries.iter().find(|e| e.is_synthetic)
    }

    pub fn real_entries(&self) -> impl Iterator<Item = &CompletionEntry> {
        self.entries.iter().filter(|e| !e.is_synthetic)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
