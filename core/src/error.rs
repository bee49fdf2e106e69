use thiserror::Error;

/// Feil ved grensen mot omverdenen (payload, config, HTTP).
/// Datakvalitet inne i motoren gir aldri feil, kun "ingenting å vise".
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("parse error ({what}) at {path}: {message}")]
    Parse {
        what: &'static str,
        path: String,
        message: String,
    },
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config JSON failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
}
