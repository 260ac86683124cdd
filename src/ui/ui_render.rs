use eframe::egui::{
    Align, Button, CentralPanel, ComboBox, Context, FontId, Key, Layout, RichText, SidePanel, TextEdit, TopBottomPanel, Ui,
};
use strum::IntoEnumIterator;

use crate::{
    app::{App, SidePanelMode},
    config::{
        constants::{AVAILABLE_TIMEFRAMES, QUICK_SELECT_TIMEFRAMES},
        plot::PLOT_CONFIG,
    },
    data::ConnectionStatus,
    domain::DataSource,
    ui::{
        UI_CONFIG, UI_TEXT,
        styles::{UiStyleExt, hex_to_color32},
        ui_panels::{AnalysisPanel, ChatAction, ChatPanel},
        utils::render_fullscreen_message,
        windows::{render_settings_window, render_template_window},
    },
    utils::{format_price, format_volume},
};

impl App {
    pub(crate) fn render_top_panel(&mut self, ctx: &Context) {
        let mut new_source = None;
        let mut new_symbol: Option<String> = None;
        let mut new_timeframe: Option<&'static str> = None;
        let mut commit_typed = false;
        let mut analyze = false;
        let mut reload = false;

        TopBottomPanel::top("top_panel")
            .frame(UI_CONFIG.top_panel_frame())
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new(&UI_TEXT.app_title).strong().color(UI_CONFIG.colors.heading));
                    ui.separator();

                    // Exchange
                    ui.label_subdued(UI_TEXT.tb_source.as_str());
                    let current = self.prefs.data_source;
                    ComboBox::from_id_salt("source_select")
                        .selected_text(current.label())
                        .show_ui(ui, |ui| {
                            for source in DataSource::iter() {
                                if ui.selectable_label(source == current, source.label()).clicked() {
                                    new_source = Some(source);
                                }
                            }
                        });

                    // Symbol: known list or free text
                    ui.label_subdued(UI_TEXT.tb_symbol.as_str());
                    ComboBox::from_id_salt("symbol_select")
                        .selected_text(self.prefs.symbol.as_str())
                        .show_ui(ui, |ui| {
                            for &symbol in current.available_symbols() {
                                if ui.selectable_label(symbol == self.prefs.symbol, symbol).clicked() {
                                    new_symbol = Some(symbol.to_string());
                                }
                            }
                        });
                    let edit = ui.add(
                        TextEdit::singleline(&mut self.symbol_input)
                            .hint_text(UI_TEXT.tb_symbol_hint.as_str())
                            .desired_width(90.0),
                    );
                    if edit.changed() {
                        self.on_symbol_typed();
                    }
                    if edit.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                        commit_typed = true;
                    }
                    ui.separator();

                    // Timeframe
                    ui.label_subdued(UI_TEXT.tb_timeframe.as_str());
                    for tf in quick_timeframes(&self.prefs.favorite_timeframes) {
                        let selected = self.prefs.timeframe == tf;
                        if ui
                            .interactive_label(tf, selected, UI_CONFIG.colors.label, FontId::monospace(13.0))
                            .clicked()
                        {
                            new_timeframe = Some(tf);
                        }
                    }
                    ComboBox::from_id_salt("timeframe_select")
                        .selected_text(self.prefs.timeframe.as_str())
                        .width(50.0)
                        .show_ui(ui, |ui| {
                            for &tf in AVAILABLE_TIMEFRAMES {
                                if ui.selectable_label(self.prefs.timeframe == tf, tf).clicked() {
                                    new_timeframe = Some(tf);
                                }
                            }
                        });
                    ui.separator();

                    // Actions
                    let analyzing = self.is_analyzing();
                    let label = if analyzing { &UI_TEXT.tb_analyzing } else { &UI_TEXT.tb_analyze };
                    let can_analyze = !analyzing && !self.candles.is_empty();
                    let mut response = ui.add_enabled(can_analyze, Button::new(label.as_str()));
                    if let Some(e) = &self.llm_error {
                        response = response.on_hover_text(e.to_string());
                    }
                    if response.clicked() {
                        analyze = true;
                    }
                    if ui
                        .selectable_label(self.side_panel == SidePanelMode::Chat, UI_TEXT.tb_chat.as_str())
                        .clicked()
                    {
                        self.side_panel = match self.side_panel {
                            SidePanelMode::Chat => SidePanelMode::Analysis,
                            _ => SidePanelMode::Chat,
                        };
                    }
                    if ui.selectable_label(self.show_templates, UI_TEXT.tb_templates.as_str()).clicked() {
                        self.show_templates = !self.show_templates;
                    }
                    if ui.selectable_label(self.show_settings, UI_TEXT.tb_settings.as_str()).clicked() {
                        self.show_settings = !self.show_settings;
                    }
                    if ui.button(UI_TEXT.tb_reload.as_str()).clicked() {
                        reload = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        self.render_price_badge(ui);
                    });
                });
            });

        if let Some(source) = new_source {
            self.set_source(source);
        }
        if let Some(symbol) = new_symbol {
            self.set_symbol(&symbol);
        }
        if commit_typed {
            self.commit_symbol_input();
        }
        if let Some(tf) = new_timeframe {
            self.set_timeframe(tf);
        }
        if analyze {
            self.request_analysis();
        }
        if reload {
            self.load_chart();
        }
    }

    fn render_price_badge(&self, ui: &mut Ui) {
        if self.offline {
            ui.label(RichText::new(&UI_TEXT.tb_offline).color(PLOT_CONFIG.color_warning));
            return;
        }
        let (text, color) = match self.stream.status() {
            ConnectionStatus::Connected => (&UI_TEXT.status_connected, PLOT_CONFIG.color_long),
            ConnectionStatus::Connecting => (&UI_TEXT.status_connecting, PLOT_CONFIG.color_warning),
            ConnectionStatus::Disconnected => (&UI_TEXT.status_disconnected, PLOT_CONFIG.color_short),
        };
        ui.label(RichText::new(format!("{} {}", UI_TEXT.icon_live, text)).color(color));
        if let Some(price) = self.current_price() {
            ui.label(RichText::new(format_price(price)).strong().monospace());
        }
    }

    pub(crate) fn render_status_panel(&mut self, ctx: &Context) {
        TopBottomPanel::bottom("status_panel")
            .frame(UI_CONFIG.bottom_panel_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label_subdued(format!(
                        "{} {}",
                        self.prefs.data_source.label(),
                        self.prefs.symbol
                    ));
                    ui.separator();
                    ui.label_subdued(format!("{}: {}", UI_TEXT.status_candles, self.candles.len()));
                    if let Some(volume) = self.current_volume() {
                        ui.separator();
                        ui.label_subdued(format!("{}: {}", UI_TEXT.status_volume, format_volume(volume)));
                    }
                    if let Some(template) = self.templates.active_template() {
                        ui.separator();
                        ui.label_subdued(format!("{} {}", UI_TEXT.icon_templates, template.name));
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(msg) = &self.status_message {
                            ui.label(RichText::new(msg).color(PLOT_CONFIG.color_short));
                        } else if let Some(e) = &self.llm_error {
                            ui.label(
                                RichText::new(format!("{} {}", UI_TEXT.icon_warning, e))
                                    .small()
                                    .color(PLOT_CONFIG.color_warning),
                            );
                        }
                    });
                });
            });
    }

    pub(crate) fn render_side_panel(&mut self, ctx: &Context) {
        if self.side_panel == SidePanelMode::Hidden {
            return;
        }
        let analyzing = self.is_analyzing();
        let mut chat_action = None;

        SidePanel::right("side_panel")
            .frame(UI_CONFIG.side_panel_frame())
            .default_width(UI_CONFIG.side_panel_width)
            .resizable(true)
            .show(ctx, |ui| match self.side_panel {
                SidePanelMode::Analysis => {
                    AnalysisPanel::new(self.analysis.as_ref(), analyzing).render(ui);
                }
                SidePanelMode::Chat => {
                    chat_action = ChatPanel::new(&self.chat, &mut self.chat_input).render(ui);
                }
                SidePanelMode::Hidden => {}
            });

        match chat_action {
            Some(ChatAction::Send) => self.send_chat(),
            Some(ChatAction::Clear) => self.clear_chat(),
            None => {}
        }
    }

    pub(crate) fn render_windows(&mut self, ctx: &Context) {
        if self.show_templates {
            if let Some(action) =
                render_template_window(ctx, &mut self.show_templates, &self.templates, &mut self.template_form)
            {
                self.handle_template_action(action);
            }
        }
        if self.show_settings {
            let overlay_changed =
                render_settings_window(ctx, &mut self.show_settings, &mut self.prefs, &mut self.plot_visibility);
            if overlay_changed {
                self.rebuild_overlay();
            }
        }
    }

    pub(crate) fn render_loading_panel(&mut self, ctx: &Context) {
        let subtitle = format!(
            "{} {} - {}",
            self.prefs.symbol, self.prefs.timeframe, UI_TEXT.cp_loading_sub
        );
        CentralPanel::default().show(ctx, |ui| {
            render_fullscreen_message(ui, &UI_TEXT.cp_loading_history, &subtitle, false);
        });
    }

    pub(crate) fn render_chart_panel(&mut self, ctx: &Context) {
        let fill = hex_to_color32(&self.prefs.chart_pane_background_color);
        let price = self.current_price();

        CentralPanel::default()
            .frame(UI_CONFIG.central_panel_frame(fill))
            .show(ctx, |ui| {
                if self.candles.is_empty() {
                    let (title, subtitle) = if self.offline {
                        (UI_TEXT.tb_offline.as_str(), UI_TEXT.cp_offline_sub.as_str())
                    } else {
                        (
                            UI_TEXT.cp_no_data.as_str(),
                            self.status_message.as_deref().unwrap_or(UI_TEXT.cp_no_data_sub.as_str()),
                        )
                    };
                    render_fullscreen_message(ui, title, subtitle, true);
                    return;
                }

                self.plot_view.show_chart(
                    ui,
                    &self.prefs.symbol,
                    &self.candles,
                    &self.overlay,
                    price,
                    &self.prefs,
                    &self.plot_visibility,
                );
            });
    }
}

/// Favorites when the user has any, else the stock list. Unknown codes are skipped.
fn quick_timeframes(favorites: &[String]) -> Vec<&'static str> {
    let picked: Vec<&'static str> = AVAILABLE_TIMEFRAMES
        .iter()
        .copied()
        .filter(|tf| favorites.iter().any(|f| f == tf))
        .collect();
    if picked.is_empty() {
        QUICK_SELECT_TIMEFRAMES.to_vec()
    } else {
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_timeframes_keep_exchange_order() {
        let favorites = vec!["1d".to_string(), "15m".to_string(), "bogus".to_string()];
        assert_eq!(quick_timeframes(&favorites), vec!["15m", "1d"]);
        assert_eq!(quick_timeframes(&[]), QUICK_SELECT_TIMEFRAMES.to_vec());
    }
}
