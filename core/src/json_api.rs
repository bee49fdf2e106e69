// JSON inn / JSON ut for vertsmiljøer (Python-bindingen bruker disse).
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::EngineError;
use crate::normalize::normalize;
use crate::overlay::{CompletionOverlaySet, PREDICTED_KEY};
use crate::projector::build_chart;
use crate::route;
use crate::synth::{synthesize, ShapeHint};
use crate::types::{parse_json, Metric, PredictedAggregate, TelemetrySample};

#[derive(Debug, Deserialize)]
struct SeriesIn {
    #[serde(default, alias = "samples")]
    time_series: Vec<TelemetrySample>,
}

#[derive(Debug, Deserialize)]
struct SynthIn {
    #[serde(default, alias = "performance")]
    aggregate: PredictedAggregate,
    /// Rå samples fra den ekte serien (normaliseres her).
    #[serde(default)]
    shape_hint: Vec<TelemetrySample>,
}

#[derive(Debug, Deserialize)]
struct EntryIn {
    key: String,
    #[serde(default, alias = "samples")]
    time_series: Vec<TelemetrySample>,
    #[serde(default)]
    is_synthetic: bool,
    #[serde(default)]
    completion_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectIn {
    metric: String,
    #[serde(default)]
    entries: Vec<EntryIn>,
}

pub fn normalize_from_json(json_in: &str) -> Result<String, EngineError> {
    let input: SeriesIn = parse_json(json_in, "SeriesIn")?;
    Ok(serde_json::to_string(&normalize(&input.time_series))?)
}

pub fn synthesize_from_json(json_in: &str) -> Result<String, EngineError> {
    let input: SynthIn = parse_json(json_in, "SynthIn")?;
    let hint = ShapeHint::from_series(&normalize(&input.shape_hint));
    let out = match synthesize(&input.aggregate, hint) {
        Some(series) => serde_json::to_value(series)?,
        None => Value::Null,
    };
    Ok(out.to_string())
}

pub fn project_from_json(json_in: &str) -> Result<String, EngineError> {
    let input: ProjectIn = parse_json(json_in, "ProjectIn")?;
    let metric: Metric = input.metric.parse()?;

    let mut set = CompletionOverlaySet::new();
    for e in input.entries {
        let date: Option<DateTime<Utc>> = e
            .completion_date
            .as_deref()
            .and_then(crate::types::parse_completion_date);
        let key = if e.is_synthetic { PREDICTED_KEY.to_string() } else { e.key };
        set.add(&key, normalize(&e.time_series), e.is_synthetic, date);
    }

    let out = match build_chart(set.entries(), metric) {
        Some(chart) => serde_json::to_value(chart)?,
        None => json!({ "hidden": true, "metric": metric.as_str() }),
    };
    Ok(out.to_string())
}

pub fn route_from_json(json_in: &str) -> Result<String, EngineError> {
    let input: SeriesIn = parse_json(json_in, "SeriesIn")?;
    Ok(serde_json::to_string(&route::project(&normalize(&input.time_series)))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_roundtrip_through_json() {
        let input = json!({
            "metric": "heart_rate",
            "entries": [
                {"key": "c1", "completion_date": "2024-04-02",
                 "time_series": [{"timestamp": 0, "heart_rate": 100}, {"timestamp": 120, "heart_rate": 130}]}
            ]
        });
        let out: Value = serde_json::from_str(&project_from_json(&input.to_string()).unwrap()).unwrap();
        assert_eq!(out["max_x"], 2.0);
        assert_eq!(out["series"][0]["label"], "Heart Rate (2024-04-02)");
        assert_eq!(out["series"][0]["points"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_projection_is_hidden() {
        let out: Value =
            serde_json::from_str(&project_from_json(r#"{"metric": "speed", "entries": []}"#).unwrap()).unwrap();
        assert_eq!(out["hidden"], true);
    }

    #[test]
    fn synthesize_without_aggregate_is_null() {
        assert_eq!(synthesize_from_json("{}").unwrap(), "null");
    }

    #[test]
    fn huge_duration_does_not_blow_up() {
        let out = synthesize_from_json(r#"{"aggregate":{"predicted_duration_minutes":1e20}}"#).unwrap();
        assert_eq!(out, "null");

        let out = synthesize_from_json(
            r#"{"aggregate":{"predicted_duration_minutes":1e20,"predicted_avg_heart_rate":150}}"#,
        )
        .unwrap();
        let series: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(series.as_array().unwrap().len(), 120);
    }

    #[test]
    fn unknown_metric_is_an_error() {
        assert!(project_from_json(r#"{"metric": "watts"}"#).is_err());
    }
}
