use serde::{Deserialize, Serialize};

use crate::domain::DataSource;

#[derive(Clone)]
pub(crate) struct RunningState;

/// Waiting for the first history batch of the chart on screen.
#[derive(Clone, Default)]
pub(crate) struct LoadingState {
    pub(crate) key: Option<ChartKey>,
}

pub(crate) enum AppState {
    Loading(LoadingState),
    Running(RunningState),
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Loading(LoadingState::default())
    }
}

/// Identifies one chart. Results tagged with an older key are stale and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChartKey {
    pub(crate) source: DataSource,
    pub(crate) symbol: String,
    pub(crate) timeframe: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) enum SidePanelMode {
    #[default]
    Analysis,
    Chat,
    Hidden,
}

/// Inputs of the "save template" form.
#[derive(Debug, Clone, Default)]
pub(crate) struct TemplateForm {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) is_default: bool,
}
