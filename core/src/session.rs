use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::metrics::EngineMetrics;
use crate::normalize::normalize_with_report;
use crate::overlay::{CompletionEntry, CompletionOverlaySet, PREDICTED_KEY};
use crate::projector::{build_chart, ComparisonChart};
use crate::render::ComparisonRenderTrigger;
use crate::route::{self, LatLon};
use crate::source::PerformanceSource;
use crate::summary::{compare, MetricComparison};
use crate::synth::{synthesize_with, ShapeHint};
use crate::types::{default_completion, Metric, PerformanceData, PerformanceRecord, PredictedAggregate};

/// Grafflaten (ekstern). Kjernen leverer ferdige serier.
pub trait ChartSurface {
    fn draw(&mut self, chart: &ComparisonChart);
    /// Ingen data: seksjonen skjules i stedet for å vise en tom graf.
    fn hide(&mut self);
}

/// Kartflaten (ekstern).
pub trait MapSurface {
    fn draw_route(&mut self, route: &[LatLon]);
    fn clear_route(&mut self);
}

/// Hvilket utvalg (løype + ev. fullføring) en forespørsel hører til.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    pub trail_id: String,
    pub completion_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Ekte nøkkel fantes allerede (idempotent).
    Duplicate,
    /// Svaret tilhører et utvalg brukeren har forlatt.
    Stale,
    NotCompleted,
    /// Ingenting å vise etter normalisering/syntese.
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub actual: AddOutcome,
    pub predicted: Option<AddOutcome>,
}

/// Sammenligningsøkt for én løypedetalj-visning.
///
/// Eier registeret, render-triggeren og tellerne. Lages ny per visning og
/// kastes ved navigasjon.
pub struct ComparisonSession {
    config: EngineConfig,
    overlay: CompletionOverlaySet,
    trigger: ComparisonRenderTrigger,
    metric: Metric,
    generation: u64,
    aggregates: HashMap<String, PredictedAggregate>,
    metrics: EngineMetrics,
}

impl ComparisonSession {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            overlay: CompletionOverlaySet::from_config(&config),
            trigger: ComparisonRenderTrigger::from_millis(config.render_debounce_ms),
            metric: Metric::default(),
            generation: 0,
            aggregates: HashMap::new(),
            metrics: EngineMetrics::new()?,
            config,
        })
    }

    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(EngineConfig::default())
    }

    // ──────────────────────────────────────────────────────────────────────
    // Utvalg og foreldede svar
    // ──────────────────────────────────────────────────────────────────────

    /// Tømmer registeret og utsteder en ny billett. Svar med eldre
    /// billetter forkastes.
    pub fn begin_selection(&mut self, trail_id: &str, completion_id: Option<&str>) -> SelectionTicket {
        self.generation += 1;
        self.overlay.clear();
        self.aggregates.clear();
        self.notify();
        debug!(
            "session: selection #{} trail={} completion={:?}",
            self.generation, trail_id, completion_id
        );
        SelectionTicket {
            generation: self.generation,
            trail_id: trail_id.to_string(),
            completion_id: completion_id.map(str::to_string),
        }
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        ticket.generation == self.generation
    }

    fn reject_stale(&self, ticket: &SelectionTicket, key: &str) -> bool {
        if self.is_current(ticket) {
            return false;
        }
        warn!(
            "session: discarding stale response for '{}' (ticket #{}, current #{})",
            key, ticket.generation, self.generation
        );
        self.metrics.stale_responses_total.inc();
        true
    }

    // ──────────────────────────────────────────────────────────────────────
    // Registrering
    // ──────────────────────────────────────────────────────────────────────

    /// Steg 1: normaliser og registrer en ekte fullføring.
    pub fn register_actual(
        &mut self,
        ticket: &SelectionTicket,
        key: &str,
        performance: &PerformanceData,
        completion_date: Option<DateTime<Utc>>,
    ) -> AddOutcome {
        if self.reject_stale(ticket, key) {
            return AddOutcome::Stale;
        }
        if self.overlay.contains(key) {
            self.notify();
            return AddOutcome::Duplicate;
        }

        let report = normalize_with_report(&performance.time_series);
        self.metrics.samples_dropped_total.inc_by(report.dropped() as u64);
        if report.series.is_empty() {
            debug!("session: '{}' has no usable telemetry", key);
            return AddOutcome::NoData;
        }

        self.overlay.add(key, report.series, false, completion_date);
        self.aggregates.insert(key.to_string(), performance.aggregate);
        self.notify();
        AddOutcome::Added
    }

    /// Formhint fra en registrert ekte serie.
    pub fn shape_hint_from(&self, key: &str) -> Option<ShapeHint> {
        self.overlay
            .get(key)
            .filter(|e| !e.is_synthetic)
            .and_then(|e| ShapeHint::from_series(&e.series))
    }

    /// Steg 2: syntetiser og registrer den predikerte serien.
    pub fn register_predicted(
        &mut self,
        ticket: &SelectionTicket,
        aggregate: &PredictedAggregate,
        hint: Option<ShapeHint>,
        completion_date: Option<DateTime<Utc>>,
    ) -> AddOutcome {
        if self.reject_stale(ticket, PREDICTED_KEY) {
            return AddOutcome::Stale;
        }
        let Some(series) = synthesize_with(aggregate, hint, &self.config.synth) else {
            debug!("session: no aggregate to synthesize from");
            return AddOutcome::NoData;
        };
        self.metrics.series_synthesized_total.inc();
        self.overlay.add(PREDICTED_KEY, series, true, completion_date);
        self.notify();
        AddOutcome::Added
    }

    /// Vertsoperasjon: registrer en ekte fullføring, eller (med
    /// `is_predicted`) den syntetiske motparten formet etter `key`.
    pub fn add_completion_to_chart(
        &mut self,
        ticket: &SelectionTicket,
        record: &PerformanceRecord,
        key: &str,
        is_predicted: bool,
    ) -> AddOutcome {
        if self.reject_stale(ticket, key) {
            return AddOutcome::Stale;
        }
        let Some(perf) = record.performance() else {
            return AddOutcome::NotCompleted;
        };

        if is_predicted {
            let hint = self.shape_hint_from(key).or_else(|| {
                self.overlay
                    .real_entries()
                    .next()
                    .and_then(|e| ShapeHint::from_series(&e.series))
            });
            self.register_predicted(ticket, &perf.aggregate, hint, perf.completion_date)
        } else {
            self.register_actual(ticket, key, perf, perf.completion_date)
        }
    }

    /// Ekte serie, deretter predikert motpart formet etter den.
    pub fn load_and_compare(
        &mut self,
        ticket: &SelectionTicket,
        key: &str,
        record: &PerformanceRecord,
        with_predicted: bool,
    ) -> LoadOutcome {
        let actual = self.add_completion_to_chart(ticket, record, key, false);
        let predicted = match actual {
            AddOutcome::Added | AddOutcome::Duplicate | AddOutcome::NoData if with_predicted => {
                Some(self.add_completion_to_chart(ticket, record, key, true))
            }
            _ => None,
        };
        LoadOutcome { actual, predicted }
    }

    /// Henter via kilden og laster fullføringen billetten peker på
    /// (nyeste når billetten ikke har en).
    pub fn load_from_source(
        &mut self,
        source: &dyn PerformanceSource,
        user_id: &str,
        ticket: &SelectionTicket,
        with_predicted: bool,
    ) -> Result<LoadOutcome, EngineError> {
        let (key, listed_date) = match &ticket.completion_id {
            Some(id) => (id.clone(), None),
            None => {
                let list = source.completions(user_id, &ticket.trail_id)?;
                match default_completion(&list) {
                    Some(c) => (c.id.clone(), c.completion_date),
                    None => {
                        return Ok(LoadOutcome { actual: AddOutcome::NotCompleted, predicted: None });
                    }
                }
            }
        };

        let mut record = source.performance(user_id, &ticket.trail_id, Some(&key))?;
        if let Some(perf) = record.performance.as_mut() {
            perf.completion_date = perf.completion_date.or(listed_date);
        }
        Ok(self.load_and_compare(ticket, &key, &record, with_predicted))
    }

    /// Vertsoperasjon: fjern en serie og be om ny render.
    pub fn remove_completion(&mut self, key: &str) {
        if self.overlay.remove(key) {
            debug!("session: removed '{}'", key);
        }
        self.aggregates.remove(key);
        self.notify();
    }

    /// Tømmer registeret. Utestående billetter blir foreldet; nye svar
    /// krever en ny `begin_selection`.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.overlay.clear();
        self.aggregates.clear();
        self.notify();
    }

    // ──────────────────────────────────────────────────────────────────────
    // Render
    // ──────────────────────────────────────────────────────────────────────

    fn notify(&mut self) {
        self.trigger.schedule();
        self.metrics.render_requests_total.inc();
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if self.metric != metric {
            self.metric = metric;
            self.notify();
        }
    }

    pub fn chart(&self) -> Option<ComparisonChart> {
        build_chart(self.overlay.entries(), self.metric)
    }

    fn render(&self, surface: &mut dyn ChartSurface) {
        self.metrics.renders_total.inc();
        match self.chart() {
            Some(chart) => surface.draw(&chart),
            None => surface.hide(),
        }
    }

    /// Kjører en ventende render når debounce-vinduet er passert.
    pub fn poll_render(&mut self, surface: &mut dyn ChartSurface) -> bool {
        self.poll_render_at(Instant::now(), surface)
    }

    pub fn poll_render_at(&mut self, now: Instant, surface: &mut dyn ChartSurface) -> bool {
        if self.trigger.poll_at(now) {
            self.render(surface);
            true
        } else {
            false
        }
    }

    /// Render nå hvis noe venter.
    pub fn flush_render(&mut self, surface: &mut dyn ChartSurface) -> bool {
        if self.trigger.flush() {
            self.render(surface);
            true
        } else {
            false
        }
    }

    pub fn render_pending(&self) -> bool {
        self.trigger.is_pending()
    }

    pub fn trigger(&self) -> &ComparisonRenderTrigger {
        &self.trigger
    }

    // ──────────────────────────────────────────────────────────────────────
    // Kart, tabell, innsyn
    // ──────────────────────────────────────────────────────────────────────

    /// Tegner ruten for `key`; returnerer antall punkter.
    pub fn draw_route(&self, key: &str, map: &mut dyn MapSurface) -> usize {
        let points = self
            .overlay
            .get(key)
            .map(|e| route::project(&e.series))
            .unwrap_or_default();
        if points.is_empty() {
            map.clear_route();
        } else {
            map.draw_route(&points);
        }
        points.len()
    }

    /// Predikert vs faktisk for en registrert fullføring.
    pub fn summary(&self, key: &str) -> Vec<MetricComparison> {
        self.aggregates.get(key).map(compare).unwrap_or_default()
    }

    pub fn entries(&self) -> &[CompletionEntry] {
        self.overlay.entries()
    }

    pub fn overlay(&self) -> &CompletionOverlaySet {
        &self.overlay
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }
}
