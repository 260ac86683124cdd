use crate::{
    llm::{
        client::{LlmClient, LlmError},
        prompts::chat_system_prompt,
    },
    models::{ChatMessage, Sender},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

/// One turn as the model sees it. User turns carry the full chart context, not just the question.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Everything a worker needs to produce the next reply.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub history: Vec<ChatTurn>,
}

/// The visible transcript plus the model-side history behind it.
///
/// A question goes through `begin` (records it, returns the request) and the
/// answer through `finish`, so the request can run off the UI thread.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_prompt: String,
    messages: Vec<ChatMessage>,
    history: Vec<ChatTurn>,
    pending: bool,
    last_error: Option<String>,
}

impl ChatSession {
    pub fn new(symbol: &str, timeframe: &str) -> Self {
        Self {
            system_prompt: chat_system_prompt(symbol, timeframe),
            messages: Vec::new(),
            history: Vec::new(),
            pending: false,
            last_error: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// New symbol or timeframe: the model context starts over, the transcript stays.
    pub fn retarget(&mut self, symbol: &str, timeframe: &str) {
        self.system_prompt = chat_system_prompt(symbol, timeframe);
        self.history.clear();
    }

    /// Drops the transcript and the model's context.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.history.clear();
        self.pending = false;
        self.last_error = None;
    }

    /// `None` for blank input or while a reply is outstanding.
    pub fn begin(&mut self, question: &str, model_text: String) -> Option<ChatRequest> {
        let question = question.trim();
        if question.is_empty() || self.pending {
            return None;
        }
        self.messages.push(ChatMessage::new(Sender::User, question));
        self.history.push(ChatTurn::user(model_text));
        self.pending = true;
        self.last_error = None;

        Some(ChatRequest {
            system_prompt: self.system_prompt.clone(),
            history: self.history.clone(),
        })
    }

    /// Records the reply. A failed turn is removed from the model history so the
    /// next question is not sent after an unanswered one.
    pub fn finish(&mut self, reply: Result<String, LlmError>) {
        self.pending = false;
        match reply {
            Ok(text) => {
                self.history.push(ChatTurn::model(text.clone()));
                self.messages.push(ChatMessage::new(Sender::Ai, text));
            }
            Err(e) => {
                log::error!("Chat request failed: {}", e);
                if self.history.last().is_some_and(|t| t.role == ChatRole::User) {
                    self.history.pop();
                }
                self.messages.push(ChatMessage::new(Sender::Ai, format!("Error: {}", e)));
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// `begin` + request + `finish` in one go.
    pub async fn ask(&mut self, client: &dyn LlmClient, question: &str, model_text: String) -> Option<&ChatMessage> {
        let request = self.begin(question, model_text)?;
        let reply = client.chat(&request.system_prompt, &request.history).await;
        self.finish(reply);
        self.messages.last()
    }
}
