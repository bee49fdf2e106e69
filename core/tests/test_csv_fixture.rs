// Innspilt telemetri (CSV) gjennom hele kjeden.
use serde::Deserialize;
use trail_compare_core::route;
use trail_compare_core::{normalize_with_report, project, CompletionOverlaySet, Metric, TelemetrySample};

const RECORDING: &str = "\
timestamp,heart_rate,speed,cadence,lat,lon
1715000000,98,3.9,78,61.1000,10.4000
1715000012,104,4.1,80,61.1002,10.4003
,250,,,,
1715000030,,4.3,81,61.1005,10.4007
1715000047,118,4.4,82,,
1715000061,121,4.0,80,61.1011,10.4012
";

#[derive(Debug, Deserialize)]
struct Row {
    timestamp: Option<f64>,
    heart_rate: Option<f64>,
    speed: Option<f64>,
    cadence: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
}

fn load() -> Vec<TelemetrySample> {
    let mut rdr = csv::Reader::from_reader(RECORDING.as_bytes());
    rdr.deserialize::<Row>()
        .map(|r| {
            let r = r.expect("csv row");
            TelemetrySample {
                timestamp_seconds: r.timestamp,
                heart_rate: r.heart_rate,
                speed: r.speed,
                cadence: r.cadence,
                calories: None,
                latitude: r.lat,
                longitude: r.lon,
            }
        })
        .collect()
}

#[test]
fn recorded_csv_flows_through_normalize_project_and_route() {
    let raw = load();
    assert_eq!(raw.len(), 6);

    let rep = normalize_with_report(&raw);
    assert_eq!(rep.series.len(), 5);
    assert_eq!(rep.dropped_missing_timestamp, 1);
    assert!((rep.series.last().unwrap().time_minutes - 61.0 / 60.0).abs() < 1e-9);

    let mut set = CompletionOverlaySet::new();
    set.add("rec", rep.series.clone(), false, None);
    let hr = project(set.entries(), Metric::HeartRate);
    assert_eq!(hr[0].points.len(), 4, "row without hr is a gap");

    let route = route::project(&rep.series);
    assert_eq!(route.len(), 4);
}
