// src/ai/models.rs
use crate::extractors::FaqItem;
use crate::sanitize::sanitize_long;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_FAQ_COUNT: usize = 5;

/// Chat-completions provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    OpenRouter,
}

impl Provider {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
            Provider::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "openrouter" => Ok(Provider::OpenRouter),
            other => Err(format!("unknown AI provider '{}' (expected openai or openrouter)", other)),
        }
    }
}

/// Everything the AI client needs for one call.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Overrides the provider's endpoint (self-hosted gateways, local servers).
    pub endpoint: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoint: None,
        }
    }
}

impl AiSettings {
    /// URL the chat request is posted to.
    pub fn url(&self) -> &str {
        self.endpoint.as_deref().unwrap_or_else(|| self.provider.endpoint())
    }
}

// --- Wire types (chat completions) ---

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatMessage>,
}

impl ChatResponse {
    /// Content of the first choice, if non-blank.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.as_str())
            .filter(|content| !content.trim().is_empty())
    }
}

/// Prompt asking for FAQs as a JSON array, built from plain-text content.
pub fn build_prompt(content: &str) -> String {
    format!(
        "Generate {} frequently asked questions and answers based on the following article. \
         Format as structured JSON array with question and answer keys. Content:\n\n{}",
        DEFAULT_FAQ_COUNT, content
    )
}

pub fn build_request(settings: &AiSettings, content: &str) -> ChatRequest {
    ChatRequest {
        model: settings.model.clone(),
        messages: vec![ChatMessage { role: "user".to_string(), content: build_prompt(content) }],
        max_tokens: settings.max_tokens,
    }
}

/// What the model sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiOutput {
    /// A JSON array of question/answer objects.
    Items(Vec<FaqItem>),
    /// Anything else, sanitized to allow-listed HTML.
    Raw(String),
}

#[derive(Debug, Deserialize)]
struct RawFaq {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

/// Interprets a model reply. Code fences around the JSON are tolerated.
pub fn parse_ai_output(output: &str) -> AiOutput {
    let trimmed = strip_code_fence(output.trim());

    match serde_json::from_str::<Vec<RawFaq>>(trimmed) {
        Ok(faqs) => {
            let items = faqs
                .iter()
                .filter_map(|faq| FaqItem::from_plain_text(&faq.question, &faq.answer))
                .collect();
            AiOutput::Items(items)
        }
        Err(e) => {
            tracing::debug!("AI reply is not a FAQ array ({}), keeping it as rich text", e);
            AiOutput::Raw(sanitize_long(output))
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
