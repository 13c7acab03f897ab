//! Language model backends

use std::error::Error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Something that completes a prompt
#[async_trait]
pub trait LanguageModel {
    /// Send a prompt and return the raw text of the completion
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Only the `response` field of Ollama's answer is of any interest here
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// A model served by a local [Ollama](https://ollama.com) instance
pub struct OllamaBackend {
    url: Url,
    model: String,
    http: reqwest::Client,
}

impl OllamaBackend {
    pub fn new<S: ToString>(url: Url, model: S) -> Self {
        Self {
            url,
            model: model.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> Result<Url, Box<dyn Error>> {
        let mut base = self.url.clone();
        if base.path().ends_with('/') == false {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join("api/generate")?)
    }
}

#[async_trait]
impl LanguageModel for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let url = self.generate_url()?;
        let res = self.http
            .post(url)
            .json(&request)
            .send()
            .await?;

        if res.status().is_success() == false {
            return Err(format!("Unexpected HTTP status code {:?} from {}", res.status(), self.url).into());
        }

        let body: GenerateResponse = res.json().await?;
        Ok(body.response)
    }
}
