// core/src/http_api.rs
use std::time::Duration;

use log::debug;
use ureq::Agent;

use crate::config::HttpConfig;
use crate::error::EngineError;
use crate::source::PerformanceSource;
use crate::types::{CompletionSummary, PerformanceRecord};

/// Dashboard-API klient – enkel blocking-versjon (ureq)
pub struct HttpPerformanceSource {
    agent: Agent,
    base_url: String,
}

impl HttpPerformanceSource {
    pub fn new(cfg: &HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build();
        Self {
            agent,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn completions_url(&self, user_id: &str, trail_id: &str) -> String {
        format!("{}/users/{user_id}/trails/{trail_id}/completions", self.base_url)
    }

    pub fn performance_url(&self, user_id: &str, trail_id: &str, completion_id: Option<&str>) -> String {
        let base = format!("{}/users/{user_id}/trails/{trail_id}/performance", self.base_url);
        match completion_id {
            Some(id) => format!("{base}?completion_id={id}"),
            None => base,
        }
    }

    fn get_text(&self, url: &str) -> Result<String, EngineError> {
        debug!("GET {url}");
        let resp = self
            .agent
            .get(url)
            .call()
            .map_err(|e| EngineError::Http(e.to_string()))?;
        resp.into_string().map_err(|e| EngineError::Http(e.to_string()))
    }
}

impl Default for HttpPerformanceSource {
    fn default() -> Self {
        Self::new(&HttpConfig::default())
    }
}

impl PerformanceSource for HttpPerformanceSource {
    fn completions(&self, user_id: &str, trail_id: &str) -> Result<Vec<CompletionSummary>, EngineError> {
        let body = self.get_text(&self.completions_url(user_id, trail_id))?;
        CompletionSummary::list_from_json(&body)
    }

    fn performance(
        &self,
        user_id: &str,
        trail_id: &str,
        completion_id: Option<&str>,
    ) -> Result<PerformanceRecord, EngineError> {
        let body = self.get_text(&self.performance_url(user_id, trail_id, completion_id))?;
        PerformanceRecord::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_base() {
        let cfg = HttpConfig { base_url: "https://trails.example/api/".into(), timeout_secs: 5 };
        let client = HttpPerformanceSource::new(&cfg);
        assert_eq!(
            client.completions_url("u1", "t9"),
            "https://trails.example/api/users/u1/trails/t9/completions"
        );
        assert_eq!(
            client.performance_url("u1", "t9", Some("c3")),
            "https://trails.example/api/users/u1/trails/t9/performance?completion_id=c3"
        );
        assert_eq!(
            client.performance_url("u1", "t9", None),
            "https://trails.example/api/users/u1/trails/t9/performance"
        );
    }
}
