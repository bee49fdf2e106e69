use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// Ett øyeblikk med målt (eller syntetisert) telemetri.
/// `None` betyr "ikke målt her", aldri 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    #[serde(default, alias = "timestamp", alias = "t", deserialize_with = "de_opt_f64")]
    pub timestamp_seconds: Option<f64>, // rå sekunder (epoch eller offset, kun delta teller)
    #[serde(default, alias = "hr", deserialize_with = "de_opt_f64")]
    pub heart_rate: Option<f64>, // bpm
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub speed: Option<f64>, // km/t
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub cadence: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub calories: Option<f64>,
    #[serde(default, alias = "lat", deserialize_with = "de_opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lon", alias = "lng", deserialize_with = "de_opt_f64")]
    pub longitude: Option<f64>,
}

/// Sample plassert på felles tidsakse (minutter fra første sample).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSample {
    #[serde(flatten)]
    pub sample: TelemetrySample,
    pub time_minutes: f64,
}

impl NormalizedSample {
    #[inline]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        metric.value_of(&self.sample)
    }
}

/// Metrikkene som kan velges i sammenligningsgrafen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    HeartRate,
    Speed,
    Cadence,
    Calories,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::HeartRate, Metric::Speed, Metric::Cadence, Metric::Calories];

    pub fn value_of(self, s: &TelemetrySample) -> Option<f64> {
        match self {
            Metric::HeartRate => s.heart_rate,
            Metric::Speed => s.speed,
            Metric::Cadence => s.cadence,
            Metric::Calories => s.calories,
        }
    }

    /// Visningsnavn brukt i grafetiketter.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::HeartRate => "Heart Rate",
            Metric::Speed => "Speed",
            Metric::Cadence => "Cadence",
            Metric::Calories => "Calories",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::HeartRate => "bpm",
            Metric::Speed => "km/h",
            Metric::Cadence => "spm",
            Metric::Calories => "kcal",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::HeartRate => "heart_rate",
            Metric::Speed => "speed",
            Metric::Cadence => "cadence",
            Metric::Calories => "calories",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_").as_str() {
            "heart_rate" | "hr" | "heartrate" => Ok(Metric::HeartRate),
            "speed" => Ok(Metric::Speed),
            "cadence" => Ok(Metric::Cadence),
            "calories" => Ok(Metric::Calories),
            _ => Err(EngineError::UnknownMetric(s.to_string())),
        }
    }
}

/// Grove aggregater fra ytelsesposten: predikert + faktisk.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictedAggregate {
    #[serde(default, alias = "predicted_duration", deserialize_with = "de_opt_f64")]
    pub predicted_duration_minutes: Option<f64>,
    #[serde(default, alias = "actual_duration", alias = "duration_minutes", deserialize_with = "de_opt_f64")]
    pub actual_duration_minutes: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub predicted_avg_heart_rate: Option<f64>,
    #[serde(default, alias = "avg_heart_rate", deserialize_with = "de_opt_f64")]
    pub actual_avg_heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub predicted_max_heart_rate: Option<f64>,
    #[serde(default, alias = "max_heart_rate", deserialize_with = "de_opt_f64")]
    pub actual_max_heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub predicted_avg_speed: Option<f64>,
    #[serde(default, alias = "avg_speed", deserialize_with = "de_opt_f64")]
    pub actual_avg_speed: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub predicted_max_speed: Option<f64>,
    #[serde(default, alias = "max_speed", deserialize_with = "de_opt_f64")]
    pub actual_max_speed: Option<f64>,
}

impl PredictedAggregate {
    /// Sant når minst én predikert eller faktisk verdi finnes.
    pub fn has_any(&self) -> bool {
        [
            self.predicted_duration_minutes,
            self.actual_duration_minutes,
            self.predicted_avg_heart_rate,
            self.actual_avg_heart_rate,
            self.predicted_max_heart_rate,
            self.actual_max_heart_rate,
            self.predicted_avg_speed,
            self.actual_avg_speed,
            self.predicted_max_speed,
            self.actual_max_speed,
        ]
        .iter()
        .any(Option::is_some)
    }
}

/// `performance`-blokken i ytelsesposten.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceData {
    #[serde(flatten)]
    pub aggregate: PredictedAggregate,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub total_calories: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_vec_or_null")]
    pub time_series: Vec<TelemetrySample>,
    // bilder håndteres utenfor kjernen
    #[serde(default, deserialize_with = "de_vec_or_null")]
    pub photos: Vec<Value>,
}

/// `{completed: false}` eller `{completed: true, performance: {...}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceRecord {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub performance: Option<PerformanceData>,
}

impl PerformanceRecord {
    /// Parse med sti i feilmeldingen (serde_path_to_error).
    pub fn from_json(json_str: &str) -> Result<Self, EngineError> {
        parse_json(json_str, "PerformanceRecord")
    }

    /// Ytelsesdata kun når økten faktisk er fullført.
    pub fn performance(&self) -> Option<&PerformanceData> {
        if self.completed {
            self.performance.as_ref()
        } else {
            None
        }
    }
}

/// Ett element i listen over fullføringer for (bruker, løype).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub completion_date: Option<DateTime<Utc>>,
}

impl CompletionSummary {
    pub fn list_from_json(json_str: &str) -> Result<Vec<Self>, EngineError> {
        parse_json(json_str, "CompletionSummary[]")
    }
}

/// Element 0 regnes som "nyeste" når en standard trengs.
pub fn default_completion(list: &[CompletionSummary]) -> Option<&CompletionSummary> {
    list.first()
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    json_str: &str,
    what: &'static str,
) -> Result<T, EngineError> {
    let mut de = serde_json::Deserializer::from_str(json_str);
    serde_path_to_error::deserialize(&mut de).map_err(|e| EngineError::Parse {
        what,
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

/// Tolerant datoparser: RFC 3339, "YYYY-MM-DD HH:MM:SS" eller ren dato (UTC).
pub fn parse_completion_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ──────────────────────────────────────────────────────────────────────────────
// TOLERANTE FELT-PARSERE
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(f64),
    Text(String),
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumOrText> = Option::deserialize(deserializer)?;
    let v = match raw {
        Some(NumOrText::Num(x)) => Some(x),
        Some(NumOrText::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    // NaN/inf regnes som ikke målt
    Ok(v.filter(|x| x.is_finite()))
}

fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_completion_date))
}

fn de_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Int(i64),
        Text(String),
    }
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Int(i) => i.to_string(),
        IdRepr::Text(s) => s,
    })
}
