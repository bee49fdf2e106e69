use log::warn;

use crate::types::{NormalizedSample, TelemetrySample};

/// Resultat av normalisering med antall forkastede samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub series: Vec<NormalizedSample>,
    pub dropped_missing_timestamp: usize,
    pub dropped_out_of_order: usize,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.dropped_missing_timestamp + self.dropped_out_of_order
    }
}

/// Flytter serien slik at første sample får `time_minutes == 0`.
/// Samples uten brukbar tidsstempel forkastes. Rekkefølgen beholdes.
pub fn normalize(samples: &[TelemetrySample]) -> Vec<NormalizedSample> {
    normalize_with_report(samples).series
}

pub fn normalize_with_report(samples: &[TelemetrySample]) -> NormalizeReport {
    let mut report = NormalizeReport {
        series: Vec::with_capacity(samples.len()),
        ..Default::default()
    };

    let mut origin: Option<f64> = None;
    let mut last_t = f64::NEG_INFINITY;

    for s in samples {
        let t = match s.timestamp_seconds {
            Some(t) if t.is_finite() => t,
            _ => {
                report.dropped_missing_timestamp += 1;
                continue;
            }
        };

        // Ingen sortering: et sample som går bakover i tid bryter aksen og forkastes
        if t < last_t {
            report.dropped_out_of_order += 1;
            continue;
        }
        last_t = t;

        let t0 = *origin.get_or_insert(t);
        report.series.push(NormalizedSample {
            sample: *s,
            time_minutes: (t - t0) / 60.0,
        });
    }

    if report.dropped_out_of_order > 0 {
        warn!(
            "normalize: dropped {} out-of-order samples (of {})",
            report.dropped_out_of_order,
            samples.len()
        );
    }

    report
}

/// Total tidsspenn (min) for en normalisert serie.
pub fn span_minutes(series: &[NormalizedSample]) -> f64 {
    match (series.first(), series.last()) {
        (Some(a), Some(b)) => (b.time_minutes - a.time_minutes).max(0.0),
        _ => 0.0,
    }
}
