use {
    async_trait::async_trait,
    serde_json::{Value, json},
    std::{error::Error, fmt, time::Duration},
};

use crate::{
    config::LLM,
    llm::{
        chat::{ChatRole, ChatTurn},
        prompts::full_analysis_prompt,
        response::parse_analysis,
    },
    models::AnalysisResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LlmError {
    MissingApiKey,
    InvalidApiKey,
    QuotaExceeded,
    EmptyResponse,
    Other(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LlmError::MissingApiKey => write!(
                f,
                "Gemini API key is not configured. Set one of {} in the environment.",
                LLM.api_key_env_vars.join(", ")
            ),
            LlmError::InvalidApiKey => write!(f, "Gemini API key is invalid. Please check your configuration."),
            LlmError::QuotaExceeded => {
                write!(f, "Gemini API quota exceeded. Please check your quota or try again later.")
            }
            LlmError::EmptyResponse => write!(f, "Gemini returned no text."),
            LlmError::Other(msg) => write!(f, "Gemini API error: {}", msg),
        }
    }
}

impl Error for LlmError {}

impl LlmError {
    /// Maps a provider error message onto the cases the UI reports differently.
    pub fn from_message(msg: &str) -> Self {
        if msg.contains("API_KEY_INVALID") || msg.contains("API key not valid") {
            LlmError::InvalidApiKey
        } else if msg.contains("quota") || msg.contains("Quota") {
            LlmError::QuotaExceeded
        } else {
            LlmError::Other(msg.to_string())
        }
    }
}

fn is_placeholder(key: &str) -> bool {
    LLM.placeholder_keys.contains(&key)
}

/// First configured, non-placeholder key. `lookup` is normally `std::env::var`.
pub fn resolve_api_key<F>(lookup: F) -> Result<String, LlmError>
where
    F: Fn(&str) -> Option<String>,
{
    LLM.api_key_env_vars
        .iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty() && !is_placeholder(key))
        .ok_or(LlmError::MissingApiKey)
}

pub fn resolve_api_key_from_env() -> Result<String, LlmError> {
    resolve_api_key(|name| std::env::var(name).ok())
}

/// Seam between the app and whichever model backs it.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single-shot generation with a JSON response.
    async fn generate_analysis(&self, prompt: &str) -> Result<String, LlmError>;

    /// Next model turn for a conversation under `system_prompt`.
    async fn chat(&self, system_prompt: &str, history: &[ChatTurn]) -> Result<String, LlmError>;
}

/// Gemini over the REST `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() || is_placeholder(api_key.trim()) {
            return Err(LlmError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(LLM.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            url: LLM.generate_url.replace("{model}", LLM.model_name),
        })
    }

    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(resolve_api_key_from_env()?)
    }

    async fn generate(&self, body: Value) -> Result<String, LlmError> {
        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_message(&e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Other(format!("unreadable response ({}): {}", status, e)))?;

        if !status.is_success() || payload.get("error").is_some() {
            let err = payload.get("error").cloned().unwrap_or(Value::Null);
            log::error!("Gemini request failed with {}: {}", status, err);
            return Err(LlmError::from_message(&err.to_string()));
        }

        response_text(&payload).ok_or(LlmError::EmptyResponse)
    }
}

/// Concatenated text parts of the first candidate.
pub fn response_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

fn contents(history: &[ChatTurn]) -> Value {
    Value::Array(
        history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                };
                json!({ "role": role, "parts": [{ "text": turn.text }] })
            })
            .collect(),
    )
}

pub fn analysis_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "maxOutputTokens": LLM.max_output_tokens,
            "temperature": LLM.temperature,
        }
    })
}

pub fn chat_request_body(system_prompt: &str, history: &[ChatTurn]) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
        "contents": contents(history),
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate_analysis(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(analysis_request_body(prompt)).await
    }

    async fn chat(&self, system_prompt: &str, history: &[ChatTurn]) -> Result<String, LlmError> {
        self.generate(chat_request_body(system_prompt, history)).await
    }
}

/// Full analysis round trip. Transport and key problems are errors; an
/// unusable answer is not, it becomes the fallback result.
pub async fn analyze_chart(
    client: &dyn LlmClient,
    symbol: &str,
    timeframe: &str,
    price: f64,
    volume: Option<f64>,
) -> Result<AnalysisResult, LlmError> {
    let prompt = full_analysis_prompt(symbol, timeframe, price, volume);
    match client.generate_analysis(&prompt).await {
        Ok(text) => Ok(parse_analysis(&text, symbol, timeframe)),
        Err(LlmError::EmptyResponse) => {
            log::warn!("No text from the model, using fallback analysis");
            Ok(AnalysisResult::fallback(symbol, timeframe))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Canned(Result<String, LlmError>);

    #[async_trait]
    impl LlmClient for Canned {
        async fn generate_analysis(&self, _prompt: &str) -> Result<String, LlmError> {
            self.0.clone()
        }
        async fn chat(&self, _system_prompt: &str, _history: &[ChatTurn]) -> Result<String, LlmError> {
            self.0.clone()
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn api_key_resolution_skips_placeholders() {
        assert_eq!(resolve_api_key(env(&[])), Err(LlmError::MissingApiKey));
        assert_eq!(
            resolve_api_key(env(&[("GEMINI_API_KEY", "your_gemini_api_key_here"), ("API_KEY", "real")])),
            Ok("real".to_string())
        );
        assert_eq!(
            resolve_api_key(env(&[("GEMINI_API_KEY", "first"), ("API_KEY", "second")])),
            Ok("first".to_string())
        );
        assert_eq!(
            resolve_api_key(env(&[("GEMINI_API_KEY", "TU_CLAVE_API_DE_GEMINI_AQUI")])),
            Err(LlmError::MissingApiKey)
        );
        assert!(GeminiClient::new("  ".to_string()).is_err());
    }

    #[test]
    fn error_messages_map_to_kinds() {
        assert_eq!(LlmError::from_message("400 API_KEY_INVALID"), LlmError::InvalidApiKey);
        assert_eq!(LlmError::from_message("API key not valid. Please pass"), LlmError::InvalidApiKey);
        assert_eq!(LlmError::from_message("Quota exceeded for metric"), LlmError::QuotaExceeded);
        assert!(matches!(LlmError::from_message("boom"), LlmError::Other(m) if m == "boom"));
    }

    #[test]
    fn request_bodies() {
        let body = analysis_request_body("p");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);

        let history = vec![ChatTurn::user("hola"), ChatTurn::model("¿Qué tal?")];
        let body = chat_request_body("sys", &history);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hola");
    }

    #[test]
    fn candidate_text_is_joined() {
        let payload = json!({"candidates": [{"content": {"parts": [{"text": "{\"a\""}, {"text": ": 1}"}]}}]});
        assert_eq!(response_text(&payload).as_deref(), Some("{\"a\": 1}"));
        assert_eq!(response_text(&json!({"candidates": []})), None);
    }

    #[tokio::test]
    async fn analyze_chart_maps_outcomes() {
        let ok = Canned(Ok(
            r#"{"analisis_general": {"simbolo": "ETH/USDT"}, "escenarios_probables": []}"#.to_string(),
        ));
        let result = analyze_chart(&ok, "ETH/USDT", "1H", 2650.0, None).await.expect("parsed");
        assert!(!result.is_fallback());

        let garbage = Canned(Ok("lo siento".to_string()));
        let result = analyze_chart(&garbage, "ETH/USDT", "1H", 2650.0, None).await.expect("fallback");
        assert!(result.is_fallback());

        let empty = Canned(Err(LlmError::EmptyResponse));
        assert!(analyze_chart(&empty, "ETH/USDT", "1H", 1.0, None).await.expect("fallback").is_fallback());

        let quota = Canned(Err(LlmError::QuotaExceeded));
        assert_eq!(
            analyze_chart(&quota, "ETH/USDT", "1H", 1.0, None).await.err(),
            Some(LlmError::QuotaExceeded)
        );
    }
}
