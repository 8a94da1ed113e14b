//! AI-assisted daily insight
//!
//! Without an API key the provider degrades to a deterministic summary so
//! the daily job keeps producing reports.

use crate::config::InsightConfig;
use crate::error::{CopilotError, CopilotResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{instrument, warn};

/// Summary produced for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInsight {
    pub summary: String,
    pub anomalies: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Produces the daily summary for a date and locale
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn daily_insight(
        &self,
        date: &str,
        locale: &str,
        context_hint: &str,
    ) -> CopilotResult<DailyInsight>;
}

/// Deterministic provider used when no API key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackInsight;

#[async_trait]
impl InsightProvider for FallbackInsight {
    async fn daily_insight(
        &self,
        _date: &str,
        _locale: &str,
        _context_hint: &str,
    ) -> CopilotResult<DailyInsight> {
        Ok(DailyInsight {
            summary: "OpenAI API key is not configured. Returning deterministic fallback summary."
                .to_string(),
            anomalies: vec!["No AI anomaly detection (OPENAI_API_KEY missing)".to_string()],
            recommendations: vec!["Configure OPENAI_API_KEY for richer daily insights.".to_string()],
        })
    }
}

/// Provider backed by the OpenAI Responses API
pub struct OpenAiInsight {
    config: InsightConfig,
    api_key: String,
    http_client: Client,
}

impl OpenAiInsight {
    pub fn new(config: InsightConfig, api_key: impl Into<String>, http_client: Client) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            http_client,
        }
    }

    fn prompt(date: &str, locale: &str, context_hint: &str) -> String {
        format!(
            "You are a diabetes analytics assistant for personal R&D. \
             Date: {}, locale: {}. \
             Return concise JSON with keys summary, anomalies, recommendations. \
             Context: {}",
            date, locale, context_hint
        )
    }
}

#[async_trait]
impl InsightProvider for OpenAiInsight {
    #[instrument(skip(self, context_hint), level = "debug")]
    async fn daily_insight(
        &self,
        date: &str,
        locale: &str,
        context_hint: &str,
    ) -> CopilotResult<DailyInsight> {
        let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));
        let request_body = json!({
            "model": self.config.model,
            "input": Self::prompt(date, locale, context_hint),
            "max_output_tokens": self.config.max_output_tokens,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CopilotError::insight(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CopilotError::insight(format!(
                "OpenAI API error (status {}): {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CopilotError::insight(format!("Failed to parse OpenAI response: {}", e)))?;

        Ok(DailyInsight {
            summary: extract_output_text(&body).unwrap_or_else(|| "No response".to_string()),
            anomalies: vec!["AI-generated insight available in summary".to_string()],
            recommendations: vec![
                "Validate suggestions with deterministic safety policy before action.".to_string(),
            ],
        })
    }
}

/// Pull the generated text out of a Responses API body
fn extract_output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return (!text.is_empty()).then(|| text.to_string());
    }

    let text: String = body
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    (!text.is_empty()).then_some(text)
}

/// Pick the provider matching the configuration
pub fn provider_from_config(config: &InsightConfig) -> Box<dyn InsightProvider> {
    match config.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            Box::new(OpenAiInsight::new(config.clone(), key, Client::new()))
        }
        _ => {
            warn!("No insight API key configured; using deterministic fallback");
            Box::new(FallbackInsight)
        }
    }
}
