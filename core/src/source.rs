use std::collections::HashMap;

use crate::error::EngineError;
use crate::types::{CompletionSummary, PerformanceRecord};

/// Leverandør av fullføringer og ytelsesposter
/// (prod: HttpPerformanceSource, test: StaticPerformanceSource).
pub trait PerformanceSource {
    fn completions(&self, user_id: &str, trail_id: &str) -> Result<Vec<CompletionSummary>, EngineError>;

    /// `completion_id = None` gir nyeste fullføring.
    fn performance(
        &self,
        user_id: &str,
        trail_id: &str,
        completion_id: Option<&str>,
    ) -> Result<PerformanceRecord, EngineError>;
}

/// Minnebasert kilde, nøklet på løype.
#[derive(Debug, Clone, Default)]
pub struct StaticPerformanceSource {
    pub completions: HashMap<String, Vec<CompletionSummary>>,
    pub records: HashMap<(String, String), PerformanceRecord>,
}

impl StaticPerformanceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completion(
        mut self,
        trail_id: &str,
        summary: CompletionSummary,
        record: PerformanceRecord,
    ) -> Self {
        self.records
            .insert((trail_id.to_string(), summary.id.clone()), record);
        self.completions
            .entry(trail_id.to_string())
            .or_default()
            .push(summary);
        self
    }
}

impl PerformanceSource for StaticPerformanceSource {
    fn completions(&self, _user_id: &str, trail_id: &str) -> Result<Vec<CompletionSummary>, EngineError> {
        Ok(self.completions.get(trail_id).cloned().unwrap_or_default())
    }

    fn performance(
        &self,
        _user_id: &str,
        trail_id: &str,
        completion_id: Option<&str>,
    ) -> Result<PerformanceRecord, EngineError> {
        let id = match completion_id {
            Some(id) => id.to_string(),
            None => match self.completions.get(trail_id).and_then(|l| l.first()) {
                Some(first) => first.id.clone(),
                None => return Ok(PerformanceRecord::default()),
            },
        };
        Ok(self
            .records
            .get(&(trail_id.to_string(), id))
            .cloned()
            .unwrap_or_default())
    }
}
