use serde::{Deserialize, Serialize};

/// Client for the external text-generation service. The service is a black
/// box: prompt string in, generated string out.
#[derive(Debug, Clone)]
pub struct TextGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug)]
pub enum GenerationError {
    Http(reqwest::Error),
    Api { status: reqwest::StatusCode, body: String },
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Http(err) => write!(f, "HTTP error: {}", err),
            GenerationError::Api { status, body } => write!(f, "API error {}: {}", status, body),
        }
    }
}

impl TextGenerator {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(GenerationError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let reply: GenerateResponse = response.json().await.map_err(GenerationError::Http)?;

        Ok(strip_prompt_echo(&reply.response, prompt))
    }
}

/// Some models echo the prompt back at the start of their output; keep only
/// the continuation.
fn strip_prompt_echo(output: &str, prompt: &str) -> String {
    let trimmed = output.trim_start();
    trimmed.strip_prefix(prompt).unwrap_or(trimmed).trim().to_string()
}
