use eframe::egui::{Button, Checkbox, ComboBox, Context, DragValue, Grid, RichText, ScrollArea, Slider, TextEdit, Window};
use strum::IntoEnumIterator;

use crate::{
    analysis::MaKind,
    app::TemplateForm,
    config::{constants::AVAILABLE_TIMEFRAMES, plot::PLOT_CONFIG},
    data::{TemplateManager, TemplateRepository},
    models::{Preferences, Theme},
    ui::{
        UI_TEXT,
        styles::{UiStyleExt, color32_to_hex, hex_to_color32},
        ui_plot_view::PlotVisibility,
    },
};

/// What the user asked the template window to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateAction {
    Save,
    Load(String),
    Delete(String),
    SetDefault(String),
    UpdateActive,
}

pub(crate) fn render_template_window<R: TemplateRepository>(
    ctx: &Context,
    open: &mut bool,
    manager: &TemplateManager<R>,
    form: &mut TemplateForm,
) -> Option<TemplateAction> {
    let mut action = None;

    Window::new(UI_TEXT.tw_title.as_str())
        .open(open)
        .collapsible(false)
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| {
            Grid::new("template_form").num_columns(2).show(ui, |ui| {
                ui.label(UI_TEXT.tw_name.as_str());
                ui.add(TextEdit::singleline(&mut form.name).desired_width(220.0));
                ui.end_row();
                ui.label(UI_TEXT.tw_description.as_str());
                ui.add(TextEdit::singleline(&mut form.description).desired_width(220.0));
                ui.end_row();
            });
            ui.horizontal(|ui| {
                ui.checkbox(&mut form.is_default, UI_TEXT.tw_make_default.as_str());
                let can_save = !form.name.trim().is_empty();
                if ui
                    .add_enabled(can_save, Button::new(UI_TEXT.tw_save.as_str()))
                    .clicked()
                {
                    action = Some(TemplateAction::Save);
                }
                if ui
                    .add_enabled(
                        manager.active_template_id().is_some(),
                        Button::new(UI_TEXT.tw_update_active.as_str()),
                    )
                    .clicked()
                {
                    action = Some(TemplateAction::UpdateActive);
                }
            });
            ui.separator();

            if manager.templates().is_empty() {
                ui.label_subdued(UI_TEXT.tw_empty.as_str());
                return;
            }

            ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                Grid::new("template_list").striped(true).num_columns(2).show(ui, |ui| {
                    for template in manager.templates() {
                        ui.vertical(|ui| {
                            let mut title = RichText::new(&template.name).strong();
                            if manager.active_template_id() == Some(template.id.as_str()) {
                                title = title.color(PLOT_CONFIG.color_long);
                            }
                            ui.horizontal(|ui| {
                                ui.label(title);
                                if manager.active_template_id() == Some(template.id.as_str()) {
                                    ui.label_subdued(UI_TEXT.tw_active.as_str());
                                }
                                if template.is_default {
                                    ui.label(RichText::new(&UI_TEXT.icon_star).color(PLOT_CONFIG.color_warning))
                                        .on_hover_text(UI_TEXT.tw_default.as_str());
                                }
                            });
                            if let Some(description) = &template.description {
                                ui.label_subdued(description.as_str());
                            }
                            ui.label_subdued(template.last_modified.as_str());
                        });
                        ui.horizontal(|ui| {
                            if ui.small_button(UI_TEXT.tw_load.as_str()).clicked() {
                                action = Some(TemplateAction::Load(template.id.clone()));
                            }
                            if !template.is_default && ui.small_button(UI_TEXT.tw_set_default.as_str()).clicked() {
                                action = Some(TemplateAction::SetDefault(template.id.clone()));
                            }
                            if ui.small_button(UI_TEXT.icon_trash.as_str()).clicked() {
                                action = Some(TemplateAction::Delete(template.id.clone()));
                            }
                        });
                        ui.end_row();
                    }
                });
            });
        });

    action
}

/// Returns true when a setting the chart overlay depends on changed.
pub(crate) fn render_settings_window(
    ctx: &Context,
    open: &mut bool,
    prefs: &mut Preferences,
    visibility: &mut PlotVisibility,
) -> bool {
    let mut overlay_changed = false;

    Window::new(UI_TEXT.sw_title.as_str())
        .open(open)
        .collapsible(false)
        .resizable(false)
        .default_width(380.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(UI_TEXT.sw_theme.as_str());
                for theme in Theme::iter() {
                    if ui.selectable_label(prefs.theme == theme, theme.to_string()).clicked() {
                        prefs.set_theme(theme);
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label(UI_TEXT.sw_background.as_str());
                let mut color = hex_to_color32(&prefs.chart_pane_background_color);
                if ui.color_edit_button_srgba(&mut color).changed() {
                    prefs.chart_pane_background_color = color32_to_hex(color);
                }
            });

            ui.separator();
            ui.label_subheader(UI_TEXT.sw_moving_averages.as_str());
            Grid::new("ma_grid").num_columns(4).show(ui, |ui| {
                for ma in prefs.moving_averages.iter_mut() {
                    ui.checkbox(&mut ma.visible, "");
                    ComboBox::from_id_salt(("ma_kind", ma.id.as_str()))
                        .selected_text(ma.kind.to_string())
                        .width(60.0)
                        .show_ui(ui, |ui| {
                            for kind in MaKind::iter() {
                                ui.selectable_value(&mut ma.kind, kind, kind.to_string());
                            }
                        });
                    ui.add(DragValue::new(&mut ma.period).range(1..=500).prefix(format!("{} ", UI_TEXT.sw_period)));
                    let mut color = hex_to_color32(&ma.color);
                    if ui
                        .color_edit_button_srgba(&mut color)
                        .on_hover_text(UI_TEXT.sw_color.as_str())
                        .changed()
                    {
                        ma.color = color32_to_hex(color);
                    }
                    ui.end_row();
                }
            });

            ui.separator();
            ui.horizontal_wrapped(|ui| {
                ui.checkbox(&mut visibility.candles, UI_TEXT.sw_candles.as_str());
                ui.checkbox(&mut visibility.volume, UI_TEXT.sw_volume.as_str());
                ui.checkbox(&mut visibility.moving_averages, UI_TEXT.sw_moving_averages.as_str());
                ui.checkbox(&mut visibility.price_line, UI_TEXT.sw_price_line.as_str());
            });
            ui.horizontal(|ui| {
                ui.label(UI_TEXT.sw_volume.as_str());
                ui.add(Slider::new(&mut prefs.volume_pane_height, 0..=50).suffix("%"));
            });

            ui.separator();
            overlay_changed |= ui
                .add(Checkbox::new(&mut prefs.show_ai_analysis_drawings, UI_TEXT.sw_ai_drawings.as_str()))
                .changed();
            overlay_changed |= ui
                .add(Checkbox::new(&mut prefs.show_ltf_fibonacci, UI_TEXT.sw_ltf_fibonacci.as_str()))
                .changed();
            overlay_changed |= ui
                .add(Checkbox::new(&mut prefs.show_w_signals, UI_TEXT.sw_w_signals.as_str()))
                .changed();
            ui.horizontal(|ui| {
                ui.label(UI_TEXT.sw_w_signal_color.as_str());
                let mut color = hex_to_color32(&prefs.w_signal_color);
                if ui.color_edit_button_srgba(&mut color).changed() {
                    prefs.w_signal_color = color32_to_hex(color);
                    overlay_changed = true;
                }
            });
            overlay_changed |= ui
                .add(Slider::new(&mut prefs.w_signal_opacity, 0..=100).text(UI_TEXT.sw_w_signal_opacity.as_str()))
                .changed();
            overlay_changed |= ui
                .add(Slider::new(&mut prefs.signals_opacity, 0..=100).text(UI_TEXT.sw_signals_opacity.as_str()))
                .changed();

            ui.separator();
            ui.label_subheader(UI_TEXT.sw_favorites.as_str());
            ui.horizontal_wrapped(|ui| {
                for tf in AVAILABLE_TIMEFRAMES {
                    let mut on = prefs.favorite_timeframes.iter().any(|f| f == tf);
                    if ui.checkbox(&mut on, *tf).changed() {
                        if on {
                            prefs.favorite_timeframes.push(tf.to_string());
                        } else {
                            prefs.favorite_timeframes.retain(|f| f != tf);
                        }
                    }
                }
            });
        });

    overlay_changed
}
