use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::error::EngineError;

/// Tellere for én sammenligningsøkt (eget register, ingen global tilstand).
#[derive(Clone)]
pub struct EngineMetrics {
    registry: Registry,
    pub samples_dropped_total: IntCounter,
    pub series_synthesized_total: IntCounter,
    pub render_requests_total: IntCounter,
    pub renders_total: IntCounter,
    pub stale_responses_total: IntCounter,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, EngineError> {
        let registry = Registry::new();

        let samples_dropped_total = counter(
            &registry,
            "trail_compare_samples_dropped_total",
            "Telemetry samples dropped during normalization",
        )?;
        let series_synthesized_total = counter(
            &registry,
            "trail_compare_series_synthesized_total",
            "Predicted series generated from aggregates",
        )?;
        let render_requests_total = counter(
            &registry,
            "trail_compare_render_requests_total",
            "Render requests issued by registry mutations",
        )?;
        let renders_total = counter(
            &registry,
            "trail_compare_renders_total",
            "Coalesced renders handed to the chart surface",
        )?;
        let stale_responses_total = counter(
            &registry,
            "trail_compare_stale_responses_total",
            "Responses discarded because the selection changed",
        )?;

        Ok(Self {
            registry,
            samples_dropped_total,
            series_synthesized_total,
            render_requests_total,
            renders_total,
            stale_responses_total,
        })
    }

    /// Prometheus tekstformat.
    pub fn gather_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buf).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, EngineError> {
    let c = IntCounter::new(name, help)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_output() {
        let m = EngineMetrics::new().unwrap();
        m.renders_total.inc();
        m.samples_dropped_total.inc_by(3);
        let text = m.gather_text();
        assert!(text.contains("trail_compare_renders_total 1"));
        assert!(text.contains("trail_compare_samples_dropped_total 3"));
    }
}
