use serde::{Deserialize, Serialize};

use crate::types::NormalizedSample;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Gyldige posisjoner fra en serie, i samme rekkefølge.
/// Tom liste er ikke en feil; kalleren avgjør om ruten skal tegnes.
pub fn project(series: &[NormalizedSample]) -> Vec<LatLon> {
    series
        .iter()
        .filter_map(|s| match (s.sample.latitude, s.sample.longitude) {
            (Some(lat), Some(lon)) if valid_coord(lat, lon) => Some(LatLon { lat, lon }),
            _ => None,
        })
        .collect()
}

#[inline]
fn valid_coord(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0
}
