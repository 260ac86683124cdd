use eframe::egui::{Context, RichText, Ui, Visuals};

use crate::{
    config::plot::PLOT_CONFIG,
    models::Theme,
    ui::{UI_CONFIG, UI_TEXT},
};

/// Sets up custom visuals for the entire application
pub fn setup_custom_visuals(ctx: &Context, theme: Theme) {
    let mut visuals = match theme {
        Theme::Dark => Visuals::dark(),
        Theme::Light => Visuals::light(),
    };

    if theme == Theme::Dark {
        visuals.panel_fill = UI_CONFIG.colors.side_panel;

        // Make the widgets stand out a bit more
        visuals.widgets.noninteractive.fg_stroke.color = UI_CONFIG.colors.label;
        visuals.widgets.inactive.fg_stroke.color = UI_CONFIG.colors.label;
        visuals.widgets.hovered.fg_stroke.color = UI_CONFIG.colors.heading;
        visuals.widgets.active.fg_stroke.color = UI_CONFIG.colors.heading;
    }

    ctx.set_visuals(visuals);
}

pub fn render_fullscreen_message(ui: &mut Ui, title: &str, subtitle: &str, is_error: bool) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);

        if is_error {
            ui.heading(format!("{} {}", UI_TEXT.icon_warning, title));
        } else {
            ui.spinner();
            ui.add_space(12.0);
            ui.heading(title);
        }

        ui.add_space(6.0);

        let color = if is_error {
            PLOT_CONFIG.color_short
        } else {
            PLOT_CONFIG.color_text_subdued
        };
        ui.label(RichText::new(subtitle).color(color));
    });
}
