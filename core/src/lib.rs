//! Trail compare core: normalisering av telemetri, predikert kurve og
//! overlegg av fullføringer for sammenligningsgrafen.

pub mod config;
pub mod error;
pub mod http_api;
pub mod json_api;
pub mod metrics;
pub mod normalize;
pub mod overlay;
pub mod projector;
pub mod render;
pub mod route;
pub mod session;
pub mod source;
pub mod summary;
pub mod synth;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use config::{load_config, save_config, EngineConfig, SynthDefaults};
pub use error::EngineError;
pub use normalize::{normalize, normalize_with_report};
pub use overlay::{ColorToken, CompletionEntry, CompletionOverlaySet, PREDICTED_KEY};
pub use projector::{build_chart, project, ComparisonChart, Point, ProjectedSeries};
pub use render::ComparisonRenderTrigger;
pub use route::LatLon;
pub use session::{AddOutcome, ChartSurface, ComparisonSession, LoadOutcome, MapSurface, SelectionTicket};
pub use source::{PerformanceSource, StaticPerformanceSource};
pub use synth::{synthesize, synthesize_with, ShapeHint};
pub use types::{
    default_completion, CompletionSummary, Metric, NormalizedSample, PerformanceData, PerformanceRecord,
    PredictedAggregate, TelemetrySample,
};
