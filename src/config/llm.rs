//! LLM endpoint and generation parameters.

pub struct LlmConfig {
    pub model_name: &'static str,
    /// `{model}` is substituted with `model_name`.
    pub generate_url: &'static str,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Checked in order; first non-placeholder value wins.
    pub api_key_env_vars: &'static [&'static str],
    pub placeholder_keys: &'static [&'static str],
}

pub const LLM: LlmConfig = LlmConfig {
    model_name: "gemini-2.5-flash",
    generate_url: "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent",
    max_output_tokens: 8192,
    temperature: 0.2,
    request_timeout_secs: 120,
    api_key_env_vars: &["GEMINI_API_KEY", "API_KEY"],
    placeholder_keys: &["TU_CLAVE_API_DE_GEMINI_AQUI", "your_gemini_api_key_here"],
};
