use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::overlay::{ColorToken, CompletionEntry};
use crate::types::Metric;

pub const Z_SYNTHETIC: i32 = 0;
pub const Z_REAL: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64, // minutter
    pub y: f64,
}

/// Én linje klar for grafflaten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedSeries {
    pub label: String,
    pub color: ColorToken,
    pub points: Vec<Point>,
    pub is_synthetic: bool,
    pub z_order: i32,
}

/// Alt grafflaten trenger: serier, valgt metrikk og felles x-akse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChart {
    pub metric: Metric,
    pub y_label: String,
    pub series: Vec<ProjectedSeries>,
    pub max_x: f64,
}

fn label_for(entry: &CompletionEntry, metric: Metric) -> String {
    let suffix = if entry.is_synthetic {
        "Predicted".to_string()
    } else {
        match entry.completion_date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => entry.key.clone(),
        }
    };
    format!("{} ({})", metric.display_name(), suffix)
}

/// Flater ut registeret for valgt metrikk.
/// Samples uten feltet hoppes over, slik at hull forblir hull.
pub fn project(entries: &[CompletionEntry], metric: Metric) -> Vec<ProjectedSeries> {
    entries
        .iter()
        .map(|e| ProjectedSeries {
            label: label_for(e, metric),
            color: e.color.clone(),
            points: e
                .series
                .iter()
                .filter_map(|s| {
                    s.value(metric)
                        .filter(|y| y.is_finite())
                        .map(|y| Point { x: s.time_minutes, y })
                })
                .collect(),
            is_synthetic: e.is_synthetic,
            z_order: if e.is_synthetic { Z_SYNTHETIC } else { Z_REAL },
        })
        .collect()
}

/// Felles aksemaks: største `time_minutes` på tvers av alle serier,
/// uavhengig av valgt metrikk.
pub fn max_x(entries: &[CompletionEntry]) -> f64 {
    entries
        .iter()
        .flat_map(|e| e.series.iter())
        .map(|s| OrderedFloat(s.time_minutes))
        .max()
        .map(|m| m.into_inner())
        .unwrap_or(0.0)
}

/// `None` betyr "skjul grafen": ingen serie har et eneste punkt.
pub fn build_chart(entries: &[CompletionEntry], metric: Metric) -> Option<ComparisonChart> {
    let mut series = project(entries, metric);
    if series.iter().all(|s| s.points.is_empty()) {
        return None;
    }
    // lavest z tegnes først
    series.sort_by_key(|s| s.z_order);
    let max_x = max_x(entries);
    Some(ComparisonChart {
        metric,
        y_label: format!("{} ({})", metric.display_name(), metric.unit()),
        series,
        max_x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::CompletionOverlaySet;
    use crate::types::{NormalizedSample, TelemetrySample};
    use chrono::{TimeZone, Utc};

    fn ns(t: f64, hr: Option<f64>) -> NormalizedSample {
        NormalizedSample {
            sample: TelemetrySample { timestamp_seconds: Some(t * 60.0), heart_rate: hr, ..Default::default() },
            time_minutes: t,
        }
    }

    #[test]
    fn labels_use_date_or_predicted() {
        let mut set = CompletionOverlaySet::new();
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        set.add("42", vec![ns(0.0, Some(100.0))], false, Some(date));
        set.add("predicted", vec![ns(0.0, Some(90.0))], true, None);
        set.add("7", vec![ns(0.0, Some(95.0))], false, None);

        let out = project(set.entries(), Metric::HeartRate);
        assert_eq!(out[0].label, "Heart Rate (2024-06-01)");
        assert_eq!(out[1].label, "Heart Rate (Predicted)");
        assert_eq!(out[2].label, "Heart Rate (7)");
        assert!(out[1].z_order < out[0].z_order);
    }

    #[test]
    fn chart_hidden_when_metric_missing_everywhere() {
        let mut set = CompletionOverlaySet::new();
        set.add("a", vec![ns(0.0, Some(100.0))], false, None);
        assert!(build_chart(set.entries(), Metric::Cadence).is_none());
        assert!(build_chart(&[], Metric::HeartRate).is_none());
    }

    #[test]
    fn chart_draws_synthetic_first() {
        let mut set = CompletionOverlaySet::new();
        set.add("a", vec![ns(0.0, Some(100.0)), ns(4.0, Some(120.0))], false, None);
        set.add("predicted", vec![ns(0.0, Some(90.0)), ns(3.0, Some(95.0))], true, None);
        let chart = build_chart(set.entries(), Metric::HeartRate).unwrap();
        assert!(chart.series[0].is_synthetic);
        assert_eq!(chart.max_x, 4.0);
        assert_eq!(chart.y_label, "Heart Rate (bpm)");
    }

    #[test]
    fn axis_does_not_shrink_when_tail_lacks_metric() {
        let mut set = CompletionOverlaySet::new();
        set.add("a", vec![ns(0.0, Some(100.0)), ns(2.0, Some(110.0)), ns(6.0, None)], false, None);
        let chart = build_chart(set.entries(), Metric::HeartRate).unwrap();
        assert_eq!(chart.series[0].points.len(), 2);
        assert_eq!(chart.max_x, 6.0);
    }
}
