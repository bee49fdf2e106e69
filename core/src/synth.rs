use std::f64::consts::PI;

use log::debug;

use crate::config::SynthDefaults;
use crate::normalize::span_minutes;
use crate::types::{NormalizedSample, PredictedAggregate, TelemetrySample};

pub const HR_FLOOR: f64 = 60.0; // bpm
pub const SPEED_FLOOR: f64 = 1.0; // km/t
const SPEED_WAVE_AMPLITUDE: f64 = 0.10; // ±10 % rundt snittfart
/// Lengre varighet enn dette (én uke) regnes som ubrukelig data.
pub const MAX_DURATION_MINUTES: f64 = 7.0 * 24.0 * 60.0;

/// Antall punkter og tidsspenn fra en eksisterende serie, brukt for å
/// lage en predikert kurve med samme punkttetthet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHint {
    pub sample_count: usize,
    pub span_minutes: f64,
}

impl ShapeHint {
    pub fn from_series(series: &[NormalizedSample]) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        Some(Self {
            sample_count: series.len(),
            span_minutes: span_minutes(series),
        })
    }
}

/// Målverdier etter fallback: predikert → faktisk → default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTargets {
    pub duration_minutes: f64,
    pub avg_heart_rate: f64,
    pub max_heart_rate: f64,
    pub avg_speed: f64,
    pub max_speed: f64,
}

#[inline]
fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

#[inline]
fn duration(v: Option<f64>) -> Option<f64> {
    positive(v).filter(|d| *d <= MAX_DURATION_MINUTES)
}

fn has_usable(agg: &PredictedAggregate) -> bool {
    let any_duration = duration(agg.predicted_duration_minutes).is_some()
        || duration(agg.actual_duration_minutes).is_some();
    let any_rate = [
        agg.predicted_avg_heart_rate,
        agg.actual_avg_heart_rate,
        agg.predicted_max_heart_rate,
        agg.actual_max_heart_rate,
        agg.predicted_avg_speed,
        agg.actual_avg_speed,
        agg.predicted_max_speed,
        agg.actual_max_speed,
    ]
    .into_iter()
    .any(|v| positive(v).is_some());
    agg.has_any() && (any_duration || any_rate)
}

pub fn resolve_targets(
    agg: &PredictedAggregate,
    hint: Option<ShapeHint>,
    defaults: &SynthDefaults,
) -> ResolvedTargets {
    // Faktisk varighet faller tilbake til spennet i den ekte serien
    let hint_span = duration(hint.map(|h| h.span_minutes));

    let duration_minutes = duration(agg.predicted_duration_minutes)
        .or(duration(agg.actual_duration_minutes))
        .or(hint_span)
        .unwrap_or(defaults.duration_minutes.min(MAX_DURATION_MINUTES));
    let avg_heart_rate = positive(agg.predicted_avg_heart_rate)
        .or(positive(agg.actual_avg_heart_rate))
        .unwrap_or(defaults.avg_heart_rate);
    let max_heart_rate = positive(agg.predicted_max_heart_rate)
        .or(positive(agg.actual_max_heart_rate))
        .unwrap_or(defaults.max_heart_rate);
    let avg_speed = positive(agg.predicted_avg_speed)
        .or(positive(agg.actual_avg_speed))
        .unwrap_or(defaults.avg_speed);
    let max_speed = positive(agg.predicted_max_speed)
        .or(positive(agg.actual_max_speed))
        .unwrap_or(defaults.max_speed);

    ResolvedTargets {
        duration_minutes,
        avg_heart_rate,
        max_heart_rate,
        avg_speed,
        max_speed,
    }
}

/// (antall punkter, intervall i sekunder), aldri flere enn `max_samples`.
fn plan_samples(
    hint: Option<ShapeHint>,
    duration_minutes: f64,
    min_samples: usize,
    max_samples: usize,
) -> (usize, f64) {
    let (n, interval) = plan_unbounded(hint, duration_minutes, min_samples.max(2));
    let cap = max_samples.max(2);
    if n > cap {
        debug!("synthesize: capping {} samples to {}", n, cap);
        (cap, duration_minutes * 60.0 / (cap - 1) as f64)
    } else {
        (n, interval)
    }
}

fn plan_unbounded(hint: Option<ShapeHint>, duration_minutes: f64, min_samples: usize) -> (usize, f64) {
    let duration_sec = duration_minutes * 60.0;

    match hint {
        Some(h) if h.sample_count > 0 => {
            let n = h.sample_count;
            // 1) samme tetthet som hintet, skalert til predikert varighet
            let derived = if n > 1 && h.span_minutes > 0.0 {
                let hint_interval_sec = h.span_minutes * 60.0 / (n - 1) as f64;
                let interval = hint_interval_sec * (duration_minutes / h.span_minutes);
                if interval > 0.0 {
                    Some(((duration_sec / interval).round() as usize + 1, interval))
                } else {
                    None
                }
            } else {
                None
            };

            match derived {
                Some((count, interval)) if count >= min_samples => (count, interval),
                // 2) degenerert: bruk hintets rå antall, spenn over varigheten
                _ => {
                    let interval = if n > 1 { duration_sec / (n - 1) as f64 } else { 0.0 };
                    (n, interval)
                }
            }
        }
        // 3) ett punkt per minutt, minst min_samples
        _ => {
            let n = (duration_minutes.ceil() as usize).max(min_samples);
            (n, duration_sec / (n - 1) as f64)
        }
    }
}

/// Predikert kurve med standardverdier.
pub fn synthesize(agg: &PredictedAggregate, hint: Option<ShapeHint>) -> Option<Vec<NormalizedSample>> {
    synthesize_with(agg, hint, &SynthDefaults::default())
}

/// Syntetisk telemetri fra grove aggregater.
///
/// Puls følger `avg * (0.7 + progression*0.6)` med
/// `progression = p*(1.2 - 0.4p)`, klemt til `[60, maks]`. Fart svinger
/// én hel periode rundt snittet. Kadens er konstant, kalorier 0.
/// Returnerer `None` når aggregatet ikke har én eneste brukbar verdi.
pub fn synthesize_with(
    agg: &PredictedAggregate,
    hint: Option<ShapeHint>,
    defaults: &SynthDefaults,
) -> Option<Vec<NormalizedSample>> {
    if !has_usable(agg) {
        return None;
    }

    let targets = resolve_targets(agg, hint, defaults);
    let (count, interval_sec) = plan_samples(
        hint,
        targets.duration_minutes,
        defaults.min_samples,
        defaults.max_samples,
    );

    let hr_ceiling = targets.max_heart_rate.max(HR_FLOOR);
    let speed_ceiling = targets.max_speed.max(SPEED_FLOOR);

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let p = if count > 1 { i as f64 / (count - 1) as f64 } else { 0.0 };

        let progression = p * (1.2 - 0.4 * p);
        let hr = (targets.avg_heart_rate * (0.7 + progression * 0.6)).clamp(HR_FLOOR, hr_ceiling);

        let wave = (2.0 * PI * p).sin();
        let speed = (targets.avg_speed * (1.0 + SPEED_WAVE_AMPLITUDE * wave)).clamp(SPEED_FLOOR, speed_ceiling);

        let t = i as f64 * interval_sec;
        out.push(NormalizedSample {
            sample: TelemetrySample {
                timestamp_seconds: Some(t),
                heart_rate: Some(hr),
                speed: Some(speed),
                cadence: Some(defaults.cadence),
                calories: Some(0.0),
                latitude: None,
                longitude: None,
            },
            time_minutes: t / 60.0,
        });
    }

    debug!(
        "synthesize: {} samples over {:.1} min (interval {:.1}s, hint={:?})",
        count, targets.duration_minutes, interval_sec, hint
    );

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(n: usize, span: f64) -> ShapeHint {
        ShapeHint { sample_count: n, span_minutes: span }
    }

    #[test]
    fn no_hint_gives_one_per_minute() {
        let agg = PredictedAggregate { predicted_duration_minutes: Some(45.0), ..Default::default() };
        let out = synthesize(&agg, None).unwrap();
        assert_eq!(out.len(), 45);
        assert!((out.last().unwrap().time_minutes - 45.0).abs() < 1e-9);
    }

    #[test]
    fn short_duration_keeps_minimum_ten() {
        let agg = PredictedAggregate { predicted_duration_minutes: Some(3.0), ..Default::default() };
        let out = synthesize(&agg, None).unwrap();
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn hint_with_zero_span_falls_back_to_raw_count() {
        let agg = PredictedAggregate { predicted_duration_minutes: Some(30.0), ..Default::default() };
        let out = synthesize(&agg, Some(hint(4, 0.0))).unwrap();
        assert_eq!(out.len(), 4);
        assert!((out[3].time_minutes - 30.0).abs() < 1e-9);
    }

    #[test]
    fn single_sample_hint() {
        let agg = PredictedAggregate { predicted_avg_heart_rate: Some(150.0), ..Default::default() };
        let out = synthesize(&agg, Some(hint(1, 0.0))).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time_minutes, 0.0);
    }

    #[test]
    fn hint_scales_to_predicted_duration() {
        let agg = PredictedAggregate { predicted_duration_minutes: Some(200.0), ..Default::default() };
        let out = synthesize(&agg, Some(hint(50, 100.0))).unwrap();
        assert_eq!(out.len(), 50);
        assert!((out.last().unwrap().time_minutes - 200.0).abs() < 1e-6);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let agg = PredictedAggregate { predicted_avg_speed: Some(5.0), ..Default::default() };
        let t = resolve_targets(&agg, None, &SynthDefaults::default());
        assert_eq!(t.duration_minutes, 120.0);
        assert_eq!(t.avg_heart_rate, 140.0);
        assert_eq!(t.avg_speed, 5.0);
        assert_eq!(t.max_speed, 10.0);
    }

    #[test]
    fn actual_values_used_before_defaults() {
        let agg = PredictedAggregate {
            actual_duration_minutes: Some(75.0),
            actual_avg_heart_rate: Some(128.0),
            ..Default::default()
        };
        let t = resolve_targets(&agg, Some(hint(10, 5.0)), &SynthDefaults::default());
        assert_eq!(t.duration_minutes, 75.0);
        assert_eq!(t.avg_heart_rate, 128.0);
    }

    #[test]
    fn non_positive_values_are_not_usable() {
        let agg = PredictedAggregate {
            predicted_duration_minutes: Some(0.0),
            predicted_avg_heart_rate: Some(-5.0),
            ..Default::default()
        };
        assert!(synthesize(&agg, None).is_none());
    }

    #[test]
    fn speed_stays_in_band_and_is_not_flat() {
        let agg = PredictedAggregate {
            predicted_avg_speed: Some(4.0),
            predicted_max_speed: Some(4.2),
            ..Default::default()
        };
        let out = synthesize(&agg, None).unwrap();
        let speeds: Vec<f64> = out.iter().filter_map(|s| s.sample.speed).collect();
        assert!(speeds.iter().all(|v| (1.0..=4.2).contains(v)));
        let min = speeds.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = speeds.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.1);
    }

    #[test]
    fn sample_count_is_capped() {
        let defaults = SynthDefaults { max_samples: 500, ..Default::default() };
        let agg = PredictedAggregate { predicted_duration_minutes: Some(5_000.0), ..Default::default() };
        let out = synthesize_with(&agg, None, &defaults).unwrap();
        assert_eq!(out.len(), 500);
        assert!((out.last().unwrap().time_minutes - 5_000.0).abs() < 1e-6);

        let out = synthesize_with(&agg, Some(hint(2_000, 100.0)), &defaults).unwrap();
        assert_eq!(out.len(), 500);
    }

    #[test]
    fn cadence_constant_calories_zero() {
        let agg = PredictedAggregate { predicted_duration_minutes: Some(12.0), ..Default::default() };
        let out = synthesize(&agg, None).unwrap();
        assert!(out.iter().all(|s| s.sample.cadence == Some(80.0) && s.sample.calories == Some(0.0)));
    }
}
