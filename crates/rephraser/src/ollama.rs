use crate::{clean_reason_text, prompt, RephraseRequest, Rephraser, RephraserError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Liveness probe budget, independent of the generation timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

const STOP_SEQUENCES: [&str; 6] = [
    "\n\n",
    "Label:",
    "Description:",
    "Vitals:",
    "Reason:",
    "Examples:",
];

/// Rephraser backed by a local Ollama instance.
#[derive(Debug, Clone)]
pub struct OllamaRephraser {
    base_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Serialize)]
struct GenerateOptions<'a> {
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    num_predict: u32,
    stop: &'a [&'a str],
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

impl OllamaRephraser {
    /// Create a rephraser for `model` served at `base_url`.
    ///
    /// `timeout` bounds a whole rephrase call, probe included.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, RephraserError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// True when `/api/tags` answers 200 within one second.
    pub async fn is_alive(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("rephraser probe failed: {e}");
                false
            }
        }
    }

    /// One raw generation round trip, returning the cleaned sentence.
    pub async fn generate(&self, request: &RephraseRequest) -> Result<String, RephraserError> {
        let prompt = prompt::build_prompt(request.level, &request.description, &request.vitals);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            system: prompt::SYSTEM_PROMPT,
            stream: false,
            options: GenerateOptions {
                temperature: 0.2,
                top_p: 0.9,
                repeat_penalty: 1.05,
                num_predict: 64,
                stop: &STOP_SEQUENCES,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RephraserError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RephraserError::ResponseParsing(e.to_string()))?;

        let cleaned = clean_reason_text(parsed.response.as_deref().unwrap_or_default());
        if cleaned.is_empty() {
            return Err(RephraserError::Empty);
        }
        Ok(cleaned)
    }

    fn classify(&self, e: reqwest::Error) -> RephraserError {
        if e.is_connect() {
            RephraserError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            RephraserError::Timeout(self.timeout)
        } else {
            RephraserError::Http(e)
        }
    }
}

#[async_trait::async_trait]
impl Rephraser for OllamaRephraser {
    async fn rephrase(&self, request: &RephraseRequest) -> Option<String> {
        let attempt = async {
            if !self.is_alive().await {
                return Err(RephraserError::Connection(self.base_url.clone()));
            }
            self.generate(request).await
        };

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(sentence)) => Some(sentence),
            Ok(Err(e)) => {
                tracing::warn!("rephrase failed: {e}");
                None
            }
            Err(_) => {
                tracing::warn!("rephrase failed: {}", RephraserError::Timeout(self.timeout));
                None
            }
        }
    }
}
