//! UDPipe REST client
//!
//! Sends raw text to a UDPipe 2 service for tokenization, tagging and
//! dependency parsing, and reads the CoNLL-U it returns.

use std::time::Duration;

use async_trait::async_trait;
use kg_core::{KgError, ParserConfig, Result, Sentence, SentenceParser};
use reqwest::Client;
use serde::Deserialize;

use crate::conllu::parse_conllu;

/// UDPipe service client
pub struct UdpipeParser {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    model: Option<String>,
    result: String,
}

impl UdpipeParser {
    /// Create a new UDPipe client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| KgError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.udpipe_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Read the CoNLL-U payload out of a `/process` response body
fn decode_response(body: &str) -> Result<Vec<Sentence>> {
    let response: ProcessResponse = serde_json::from_str(body).map_err(|e| {
        KgError::SentenceParser(format!("Failed to parse UDPipe response: {e}"))
    })?;

    if let Some(model) = &response.model {
        tracing::debug!(%model, "UDPipe model used");
    }

    parse_conllu(&response.result)
}

#[async_trait]
impl SentenceParser for UdpipeParser {
    async fn parse(&self, text: &str) -> Result<Vec<Sentence>> {
        let params = [
            ("model", self.model.as_str()),
            ("tokenizer", ""),
            ("tagger", ""),
            ("parser", ""),
            ("data", text),
        ];

        let response = self
            .client
            .post(format!("{}/process", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| KgError::SentenceParser(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(KgError::SentenceParser(format!(
                "UDPipe error ({status}): {error_text}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| KgError::SentenceParser(format!("Failed to read response: {e}")))?;

        let sentences = decode_response(&body)?;
        tracing::debug!(
            chars = text.len(),
            sentences = sentences.len(),
            "Text parsed by UDPipe"
        );
        Ok(sentences)
    }

    fn name(&self) -> &str {
        "udpipe"
    }
}
