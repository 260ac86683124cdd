use eframe::egui::{Align, Button, CollapsingHeader, Grid, Key, Layout, RichText, ScrollArea, TextEdit, Ui};

use crate::{
    analysis::{FibImpulse, FibLevel, fibonacci::finite_levels},
    config::plot::PLOT_CONFIG,
    llm::ChatSession,
    models::{AnalysisResult, GeneralAnalysis, ScenarioAnalysis, Sender, TradeSetup},
    ui::{
        UI_CONFIG, UI_TEXT,
        styles::{UiStyleExt, bias_color},
    },
    utils::{format_price, format_price_plain},
};

pub struct AnalysisPanel<'a> {
    analysis: Option<&'a AnalysisResult>,
    is_pending: bool,
}

impl<'a> AnalysisPanel<'a> {
    pub fn new(analysis: Option<&'a AnalysisResult>, is_pending: bool) -> Self {
        Self { analysis, is_pending }
    }

    pub fn render(&self, ui: &mut Ui) {
        ui.heading(&UI_TEXT.ap_heading);
        ui.separator();

        if self.is_pending {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(&UI_TEXT.tb_analyzing);
            });
        }

        let Some(analysis) = self.analysis else {
            if !self.is_pending {
                ui.label_subdued(UI_TEXT.ap_empty.as_str());
            }
            return;
        };

        if analysis.is_fallback() {
            ui.label(
                RichText::new(format!("{} {}", UI_TEXT.icon_warning, UI_TEXT.ap_fallback))
                    .color(PLOT_CONFIG.color_warning),
            );
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(general) = &analysis.analisis_general {
                    render_general(ui, general);
                }

                if !analysis.scenarios().is_empty() {
                    ui.add_space(8.0);
                    ui.label_subheader(UI_TEXT.ap_scenarios.as_str());
                    for (i, scenario) in analysis.scenarios().iter().enumerate() {
                        render_scenario(ui, i, scenario);
                    }
                }

                if let Some(conclusion) = &analysis.conclusion_recomendacion {
                    ui.add_space(8.0);
                    ui.label_subheader(UI_TEXT.ap_conclusion.as_str());
                    ui.label(&conclusion.resumen_ejecutivo);
                    ui.metric(
                        &UI_TEXT.ap_next_move,
                        &conclusion.proximo_movimiento_esperado,
                        PLOT_CONFIG.color_text_subdued,
                    );
                    if let Some(risks) = &conclusion.advertencias_riesgos {
                        ui.metric(&UI_TEXT.ap_risks, risks, PLOT_CONFIG.color_warning);
                    }
                }

                let impulses = [("HTF", analysis.htf_impulse()), ("LTF", analysis.ltf_impulse())];
                if impulses.iter().any(|(_, i)| i.is_some()) {
                    ui.add_space(8.0);
                    ui.label_subheader(UI_TEXT.ap_fibonacci.as_str());
                    for (scope, impulse) in impulses {
                        if let Some(impulse) = impulse {
                            render_fibonacci(ui, scope, &impulse);
                        }
                    }
                }
            });
    }
}

fn render_general(ui: &mut Ui, general: &GeneralAnalysis) {
    ui.label(RichText::new(format!("{}  {}", general.simbolo, general.temporalidad_principal_analisis)).strong());
    if !general.fecha_analisis.is_empty() {
        ui.label_subdued(general.fecha_analisis.as_str());
    }
    ui.metric(
        &UI_TEXT.ap_bias,
        &general.sesgo_direccional_general,
        bias_color(&general.sesgo_direccional_general),
    );
    if let Some(phase) = &general.fase_wyckoff_actual {
        ui.metric(&UI_TEXT.ap_wyckoff, phase, PLOT_CONFIG.color_text_subdued);
    }
    if let Some(volume) = general
        .interpretacion_volumen_detallada
        .as_ref()
        .or(general.comentario_volumen.as_ref())
    {
        ui.metric(&UI_TEXT.ap_volume, volume, PLOT_CONFIG.color_text_subdued);
    }

    let rows = general.estructura_mercado_resumen.rows();
    if !rows.is_empty() {
        CollapsingHeader::new(&UI_TEXT.ap_structure)
            .default_open(false)
            .show(ui, |ui| {
                Grid::new("structure_grid").striped(true).num_columns(2).show(ui, |ui| {
                    for (tf, summary) in rows {
                        ui.label(RichText::new(tf).strong());
                        ui.label(summary);
                        ui.end_row();
                    }
                });
            });
    }
}

fn render_scenario(ui: &mut Ui, index: usize, scenario: &ScenarioAnalysis) {
    CollapsingHeader::new(format!(
        "{} ({}: {})",
        scenario.nombre_escenario, UI_TEXT.ap_probability, scenario.probabilidad
    ))
        .id_salt(("scenario", index))
        .default_open(index == 0)
        .show(ui, |ui| {
            ui.label(&scenario.descripcion_detallada);
            if let Some(setup) = &scenario.trade_setup_asociado {
                render_setup(ui, setup);
            }
            if let Some(invalidation) = &scenario.niveles_clave_de_invalidacion {
                ui.metric(&UI_TEXT.ap_invalidation, invalidation, PLOT_CONFIG.color_short);
            }
        });
}

fn render_setup(ui: &mut Ui, setup: &TradeSetup) {
    if !setup.is_actionable() {
        ui.metric(&UI_TEXT.ap_setup, &setup.tipo, PLOT_CONFIG.color_text_subdued);
        return;
    }
    let color = bias_color(if setup.tipo.eq_ignore_ascii_case("largo") { "long" } else { "short" });
    let rating = setup
        .calificacion_setup
        .as_ref()
        .map(|r| format!(" [{}]", r.calificacion))
        .unwrap_or_default();
    ui.metric(&UI_TEXT.ap_setup, &format!("{}{}", setup.tipo.to_uppercase(), rating), color);

    if let Some(entry) = setup.punto_entrada_ideal {
        ui.metric(&UI_TEXT.ap_entry, &format_price(entry), PLOT_CONFIG.color_text_subdued);
    }
    if let Some([lo, hi]) = setup.zona_entrada {
        ui.metric(
            &UI_TEXT.ap_entry_zone,
            &format!("{} - {}", format_price_plain(lo), format_price_plain(hi)),
            PLOT_CONFIG.color_text_subdued,
        );
    }
    if let Some(stop) = setup.stop_loss {
        ui.metric(&UI_TEXT.ap_stop, &format_price(stop), PLOT_CONFIG.color_short);
    }
    let targets: Vec<String> = [setup.take_profit_1, setup.take_profit_2, setup.take_profit_3]
        .into_iter()
        .flatten()
        .map(format_price_plain)
        .collect();
    if !targets.is_empty() {
        ui.metric(&UI_TEXT.ap_targets, &targets.join(" / "), PLOT_CONFIG.color_long);
    }
    if let Some(rr) = &setup.ratio_riesgo_beneficio {
        ui.metric(&UI_TEXT.ap_rr, rr, PLOT_CONFIG.color_text_subdued);
    }
}

fn render_fibonacci(ui: &mut Ui, scope: &str, impulse: &FibImpulse) {
    let levels = impulse.levels();
    CollapsingHeader::new(format!("{} {}", scope, impulse.timeframe))
        .id_salt(("fib", scope))
        .default_open(scope == "HTF")
        .show(ui, |ui| {
            ui.metric(
                &UI_TEXT.ap_impulse,
                &format!("{} → {}", format_price_plain(impulse.start), format_price_plain(impulse.end)),
                PLOT_CONFIG.color_text_subdued,
            );
            if !impulse.description.is_empty() {
                ui.label_subdued(impulse.description.as_str());
            }
            render_level_grid(ui, ("fib_ret", scope), &UI_TEXT.ap_retracements, &levels.retracements);
            if !levels.extensions.is_empty() {
                render_level_grid(ui, ("fib_ext", scope), &UI_TEXT.ap_extensions, &levels.extensions);
            }
        });
}

fn render_level_grid(ui: &mut Ui, id: (&str, &str), title: &str, levels: &[FibLevel]) {
    ui.label(RichText::new(title).small().strong());
    Grid::new(id).striped(true).num_columns(2).show(ui, |ui| {
        ui.label_subdued(UI_TEXT.ap_level.as_str());
        ui.label_subdued(UI_TEXT.ap_price.as_str());
        ui.end_row();
        for level in finite_levels(levels) {
            ui.label(&level.label);
            ui.label(format_price(level.price));
            ui.end_row();
        }
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Send,
    Clear,
}

pub struct ChatPanel<'a> {
    session: &'a ChatSession,
    input: &'a mut String,
}

impl<'a> ChatPanel<'a> {
    pub fn new(session: &'a ChatSession, input: &'a mut String) -> Self {
        Self { session, input }
    }

    pub fn render(&mut self, ui: &mut Ui) -> Option<ChatAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.heading(&UI_TEXT.chat_heading);
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.small_button(UI_TEXT.chat_clear.as_str()).clicked() {
                    action = Some(ChatAction::Clear);
                }
            });
        });
        ui.separator();

        // Input pinned to the bottom, transcript fills the rest
        ui.with_layout(Layout::bottom_up(Align::LEFT), |ui| {
            ui.horizontal(|ui| {
                let can_send = !self.session.is_pending() && !self.input.trim().is_empty();
                let send = ui.add_enabled(can_send, Button::new(UI_TEXT.chat_send.as_str()));
                let edit = ui.add(
                    TextEdit::multiline(&mut *self.input)
                        .hint_text(&UI_TEXT.chat_hint)
                        .desired_rows(UI_CONFIG.chat_input_rows)
                        .desired_width(f32::INFINITY),
                );
                // Enter sends, Shift+Enter breaks the line
                let enter = edit.has_focus()
                    && ui.input(|i| i.key_pressed(Key::Enter) && !i.modifiers.shift);
                if send.clicked() || (enter && can_send) {
                    action = Some(ChatAction::Send);
                }
            });

            if self.session.is_pending() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label_subdued(UI_TEXT.chat_thinking.as_str());
                });
            }

            ui.with_layout(Layout::top_down(Align::LEFT), |ui| {
                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for message in self.session.messages() {
                            let (who, fill) = match message.sender {
                                Sender::User => (&UI_TEXT.chat_you, UI_CONFIG.colors.user_bubble),
                                Sender::Ai => (&UI_TEXT.chat_ai, UI_CONFIG.colors.ai_bubble),
                            };
                            UI_CONFIG.bubble_frame(fill).show(ui, |ui| {
                                ui.set_width(ui.available_width());
                                ui.label(RichText::new(who.as_str()).small().strong());
                                ui.label(&message.text);
                            });
                            ui.add_space(4.0);
                        }
                    });
            });
        });

        action
    }
}
