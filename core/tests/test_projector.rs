use trail_compare_core::projector::max_x;
use trail_compare_core::{build_chart, normalize, project, CompletionOverlaySet, Metric, TelemetrySample};

fn s(t: f64, hr: Option<f64>, speed: Option<f64>) -> TelemetrySample {
    TelemetrySample { timestamp_seconds: Some(t), heart_rate: hr, speed, ..Default::default() }
}

#[test]
fn missing_heart_rate_leaves_a_gap_not_a_zero() {
    let mut set = CompletionOverlaySet::new();
    let series = normalize(&[
        s(0.0, Some(100.0), Some(4.0)),
        s(60.0, None, Some(4.2)), // hull i puls
        s(120.0, Some(120.0), None),
    ]);
    set.add("c1", series, false, None);

    let hr = project(set.entries(), Metric::HeartRate);
    let xs: Vec<f64> = hr[0].points.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![0.0, 2.0]);
    assert!(hr[0].points.iter().all(|p| p.y != 0.0));

    let speed = project(set.entries(), Metric::Speed);
    assert_eq!(speed[0].points.len(), 2);
}

#[test]
fn axis_extent_is_shared_across_series() {
    let mut set = CompletionOverlaySet::new();
    set.add("short", normalize(&[s(0.0, Some(90.0), None), s(300.0, Some(95.0), None)]), false, None);
    set.add("long", normalize(&[s(0.0, Some(90.0), None), s(1800.0, Some(99.0), None)]), false, None);

    assert_eq!(max_x(set.entries()), 30.0);
    assert_eq!(build_chart(set.entries(), Metric::HeartRate).unwrap().max_x, 30.0);
}

#[test]
fn real_series_draw_above_synthetic() {
    let mut set = CompletionOverlaySet::new();
    set.add("predicted", normalize(&[s(0.0, Some(90.0), None)]), true, None);
    set.add("c1", normalize(&[s(0.0, Some(90.0), None)]), false, None);
    let out = project(set.entries(), Metric::HeartRate);
    let synth = out.iter().find(|p| p.is_synthetic).unwrap();
    let real = out.iter().find(|p| !p.is_synthetic).unwrap();
    assert!(synth.z_order < real.z_order);
}

#[test]
fn switching_metric_keeps_the_time_axis() {
    let mut set = CompletionOverlaySet::new();
    // fart mangler i siste del av serien
    set.add(
        "c1",
        normalize(&[
            s(0.0, Some(100.0), Some(4.0)),
            s(600.0, Some(110.0), Some(4.5)),
            s(1200.0, Some(120.0), None),
        ]),
        false,
        None,
    );
    let hr = build_chart(set.entries(), Metric::HeartRate).unwrap();
    let speed = build_chart(set.entries(), Metric::Speed).unwrap();
    assert_eq!(hr.max_x, 20.0);
    assert_eq!(speed.max_x, 20.0);
    assert_eq!(speed.series[0].points.len(), 2);
}
