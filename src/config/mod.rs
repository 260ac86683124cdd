//! Configuration module for the TradeRoad dashboard.

// Can all be private now because we have a public re-export.
mod debug;
mod exchange;
mod llm;
mod persistence;

// Public
pub mod constants;

// Can't be private because we don't re-export it
pub mod plot;

// Re-export commonly used items
pub use debug::DF;
pub use exchange::{EXCHANGES, ExchangeConfig};
pub use llm::{LLM, LlmConfig};
pub use persistence::PERSISTENCE;
