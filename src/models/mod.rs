mod analysis_result;
mod chat;
mod preferences;
mod template;

pub use {
    analysis_result::{
        AnalysisPoint, AnalysisResult, Conclusion, ContextualAnalysis, CriticalZones, FibonacciAnalysis,
        FibonacciImpulseAnalysis, FibonacciLevelPayload, GeneralAnalysis, ImportantLiquidity,
        MarketStructureSummary, PriceProjection, ScenarioAnalysis, SetupRating, TradeSetup,
    },
    chat::{ChatMessage, Sender},
    preferences::{Preferences, Theme},
    template::{ChartTemplate, TemplateConfiguration, TemplateStore},
};
