use serde::{Deserialize, Serialize};

use crate::{
    analysis::MovingAverageConfig,
    domain::DataSource,
    models::preferences::Theme,
};

/// Everything a template restores. Field names follow the camelCase layout of
/// exported template files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfiguration {
    pub moving_averages: Vec<MovingAverageConfig>,
    pub theme: Theme,
    pub chart_pane_background_color: String,
    pub volume_pane_height: u32,
    pub w_signal_color: String,
    /// Percent (0-100)
    pub w_signal_opacity: u8,
    pub show_w_signals: bool,
    pub show_ai_analysis_drawings: bool,
    pub favorite_timeframes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_data_source: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_timeframe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub last_modified: String,
    #[serde(default)]
    pub is_default: bool,
    pub configuration: TemplateConfiguration,
}

/// What the template repository persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStore {
    #[serde(default)]
    pub templates: Vec<ChartTemplate>,
    #[serde(default)]
    pub active_template_id: Option<String>,
}

impl TemplateStore {
    pub fn find(&self, id: &str) -> Option<&ChartTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ChartTemplate> {
        self.templates.iter_mut().find(|t| t.id == id)
    }
}
