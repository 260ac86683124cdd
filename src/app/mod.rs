mod phases;
mod root;
mod state;

pub(crate) use phases::PhaseView;
pub(crate) use state::{AppState, ChartKey, LoadingState, RunningState, SidePanelMode, TemplateForm};

pub use root::App;
