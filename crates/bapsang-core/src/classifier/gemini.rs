//! Google Gemini classifier adapter.
//!
//! Calls the Generative Language API's `generateContent` endpoint over
//! HTTPS and hands the raw text to [`super::response`] for normalization.
//! Prompt responses are requested as strict JSON, but nothing here trusts
//! the model to comply.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use async_trait::async_trait;

use bapsang_db::models::Dish;

use super::response;
use super::trait_def::{ClassifierError, DishClassifier};

/// Default model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Base URL for the Generative Language API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ---------------------------------------------------------------------------
// API request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Dish classifier backed by Gemini.
#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClassifier {
    /// Create a classifier with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: API_BASE_URL.to_owned(),
        }
    }

    /// Override the model name (e.g. "gemini-1.5-flash").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL. Useful for pointing tests at a local
    /// stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send one prompt and return the first candidate's concatenated text.
    async fn generate(&self, prompt: String) -> Result<String, ClassifierError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::Unavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "API returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        if let Some(error) = parsed.error {
            return Err(ClassifierError::Unavailable(error.message));
        }

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ClassifierError::EmptyResponse);
        }

        Ok(text)
    }

    fn classify_prompt(dish_name: &str) -> String {
        format!(
            "Return the category and per-serving nutrition facts for the Korean \
             cafeteria dish below as a single JSON object, and nothing else.\n\
             Dish: {dish_name}\n\n\
             Response format:\n\
             {{\n\
             \x20   \"name\": \"{dish_name}\",\n\
             \x20   \"category\": \"soup|main|side|rice\",\n\
             \x20   \"calories\": integer,\n\
             \x20   \"protein\": integer,\n\
             \x20   \"fat\": integer,\n\
             \x20   \"carbs\": integer,\n\
             \x20   \"sodium\": integer\n\
             }}\n\n\
             Rules:\n\
             1. All numbers must be integers for one serving.\n\
             2. category must be exactly one of soup, main, side, rice.\n\
             3. calories must be between 50 and 1000.\n\
             4. protein, fat, and carbs must be between 0 and 100 (grams).\n\
             5. sodium must be between 0 and 2000 (milligrams).\n"
        )
    }

    fn invent_prompt(count: usize, existing: &[String]) -> String {
        format!(
            "Generate {count} Korean cafeteria dishes as a JSON array, and \
             nothing else. Each element must have the shape:\n\
             {{\"name\": \"...\", \"category\": \"soup|main|side\", \
             \"calories\": integer, \"protein\": integer, \"fat\": integer, \
             \"carbs\": integer, \"sodium\": integer}}\n\n\
             Rules:\n\
             1. Dish names must be specific, written in Korean, and must not \
             appear in the existing list below.\n\
             2. All numbers are integers for one serving: calories 50-1000, \
             protein/fat/carbs 0-100 grams, sodium 0-2000 milligrams.\n\
             3. Do not generate plain rice dishes or plain kimchi (dishes \
             cooked with kimchi are fine).\n\n\
             Existing dishes: {existing:?}\n"
        )
    }
}

#[async_trait]
impl DishClassifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, dish_name: &str) -> Result<Dish, ClassifierError> {
        let text = self.generate(Self::classify_prompt(dish_name)).await?;
        response::parse_dish(&text, dish_name)
    }

    async fn invent(&self, count: usize, existing: &[String]) -> Result<Vec<Dish>, ClassifierError> {
        let text = self.generate(Self::invent_prompt(count, existing)).await?;
        let dishes = response::parse_dish_list(&text)?;
        // The model sometimes repeats known names despite the prompt.
        Ok(dishes
            .into_iter()
            .filter(|d| !existing.iter().any(|e| e == &d.name))
            .collect())
    }
}
