//! Gemini-backed chart analysis and chat.

pub mod chat;
pub mod client;
pub mod prompts;
pub mod response;

pub use {
    chat::{ChatRequest, ChatRole, ChatSession, ChatTurn},
    client::{GeminiClient, LlmClient, LlmError, analyze_chart, resolve_api_key, resolve_api_key_from_env},
    prompts::{ChartContext, chat_context, chat_system_prompt, full_analysis_prompt},
    response::{extract_json, parse_analysis, repair_json},
};
