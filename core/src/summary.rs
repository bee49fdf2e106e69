use serde::Serialize;

use crate::types::PredictedAggregate;

/// Én rad i tabellen predikert vs faktisk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub name: &'static str,
    pub unit: &'static str,
    pub predicted: f64,
    pub actual: f64,
    pub delta: f64,             // faktisk − predikert
    pub delta_pct: Option<f64>, // None når predikert er 0
}

fn row(name: &'static str, unit: &'static str, predicted: Option<f64>, actual: Option<f64>) -> Option<MetricComparison> {
    let (p, a) = match (predicted, actual) {
        (Some(p), Some(a)) if p.is_finite() && a.is_finite() => (p, a),
        _ => return None,
    };
    let delta = a - p;
    Some(MetricComparison {
        name,
        unit,
        predicted: p,
        actual: a,
        delta,
        delta_pct: if p != 0.0 { Some(delta / p * 100.0) } else { None },
    })
}

/// Rader der begge sider finnes; resten utelates.
pub fn compare(agg: &PredictedAggregate) -> Vec<MetricComparison> {
    [
        row("Duration", "min", agg.predicted_duration_minutes, agg.actual_duration_minutes),
        row("Avg Heart Rate", "bpm", agg.predicted_avg_heart_rate, agg.actual_avg_heart_rate),
        row("Max Heart Rate", "bpm", agg.predicted_max_heart_rate, agg.actual_max_heart_rate),
        row("Avg Speed", "km/h", agg.predicted_avg_speed, agg.actual_avg_speed),
        row("Max Speed", "km/h", agg.predicted_max_speed, agg.actual_max_speed),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_complete_pairs_are_listed() {
        let agg = PredictedAggregate {
            predicted_duration_minutes: Some(100.0),
            actual_duration_minutes: Some(110.0),
            predicted_avg_heart_rate: Some(130.0),
            ..Default::default()
        };
        let rows = compare(&agg);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Duration");
        assert!((rows[0].delta - 10.0).abs() < 1e-12);
        assert!((rows[0].delta_pct.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_prediction_has_no_pct() {
        let agg = PredictedAggregate {
            predicted_avg_speed: Some(0.0),
            actual_avg_speed: Some(3.5),
            ..Default::default()
        };
        assert_eq!(compare(&agg)[0].delta_pct, None);
    }
}
