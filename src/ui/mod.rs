mod plot_layers;
mod styles;
mod ui_config;
mod ui_panels;
mod ui_plot_view;
mod ui_render;
mod ui_text;
mod utils;
mod windows;

pub(crate) use ui_config::{UI_CONFIG, UI_TEXT};
pub(crate) use ui_plot_view::{PlotView, PlotVisibility};
pub(crate) use utils::setup_custom_visuals;
pub(crate) use windows::TemplateAction;

pub use styles::{color32_to_hex, hex_to_color32, rgba_to_color32};
