use {
    eframe::{Frame, Storage, egui::Context},
    serde::{Deserialize, Serialize},
    std::{
        mem,
        sync::{
            Arc,
            mpsc::{self, Receiver, TryRecvError},
        },
        thread,
        time::{Duration, Instant},
    },
    tokio::runtime::Runtime,
};

use crate::{
    Cli,
    analysis::{ChartOverlay, build_overlay},
    app::{AppState, ChartKey, LoadingState, PhaseView, RunningState, SidePanelMode, TemplateForm},
    config::{
        DF, PERSISTENCE,
        constants::{HISTORY_LIMIT, SYMBOL_INPUT_DEBOUNCE_MS},
    },
    data::{
        JsonPreferencesRepository, JsonTemplateRepository, KlineStreamManager, PreferencesRepository,
        TemplateManager, fetch_history, load_or_default,
    },
    domain::{Candle, DataSource, LiveCandle, display_symbol, merge_live_candle},
    llm::{ChartContext, ChatSession, GeminiClient, LlmClient, LlmError, analyze_chart, chat_context},
    models::{AnalysisResult, Preferences},
    ui::{PlotView, PlotVisibility, TemplateAction, UI_TEXT, setup_custom_visuals},
    utils::TimeUtils,
};

type HistoryResult = (ChartKey, anyhow::Result<Vec<Candle>>);
type AnalysisReply = (ChartKey, Result<AnalysisResult, LlmError>);

#[derive(Deserialize, Serialize)]
#[serde(default)]
pub struct App {
    pub(crate) side_panel: SidePanelMode,
    pub(crate) plot_visibility: PlotVisibility,
    pub(crate) show_templates: bool,
    pub(crate) show_settings: bool,

    #[serde(skip)]
    pub(crate) prefs: Preferences,
    #[serde(skip)]
    saved_prefs: Preferences,
    #[serde(skip)]
    prefs_repo: JsonPreferencesRepository,
    #[serde(skip)]
    pub(crate) templates: TemplateManager<JsonTemplateRepository>,
    #[serde(skip)]
    pub(crate) template_form: TemplateForm,

    #[serde(skip)]
    pub(crate) candles: Vec<Candle>,
    #[serde(skip)]
    pub(crate) analysis: Option<AnalysisResult>,
    #[serde(skip)]
    pub(crate) overlay: ChartOverlay,
    #[serde(skip)]
    pub(crate) chat: ChatSession,
    #[serde(skip)]
    pub(crate) chat_input: String,
    #[serde(skip)]
    pub(crate) symbol_input: String,
    #[serde(skip)]
    pub(crate) symbol_edited_at: Option<Instant>,

    #[serde(skip)]
    pub(crate) stream: KlineStreamManager,
    #[serde(skip)]
    live_rx: Option<Receiver<LiveCandle>>,
    #[serde(skip)]
    history_rx: Option<Receiver<HistoryResult>>,
    #[serde(skip)]
    analysis_rx: Option<Receiver<AnalysisReply>>,
    #[serde(skip)]
    chat_rx: Option<Receiver<Result<String, LlmError>>>,

    #[serde(skip)]
    llm: Option<Arc<dyn LlmClient>>,
    #[serde(skip)]
    pub(crate) llm_error: Option<LlmError>,
    #[serde(skip)]
    pub(crate) status_message: Option<String>,
    #[serde(skip)]
    pub(crate) offline: bool,
    #[serde(skip)]
    pub(crate) plot_view: PlotView,
    #[serde(skip)]
    state: AppState,
}

impl Default for App {
    fn default() -> Self {
        let prefs = Preferences::default();
        Self {
            side_panel: SidePanelMode::default(),
            plot_visibility: PlotVisibility::default(),
            show_templates: false,
            show_settings: false,
            saved_prefs: prefs.clone(),
            chat: ChatSession::new(&display_symbol(&prefs.symbol), &prefs.timeframe),
            symbol_input: prefs.symbol.clone(),
            prefs,
            prefs_repo: JsonPreferencesRepository::new(PERSISTENCE.preferences.path),
            templates: TemplateManager::new(JsonTemplateRepository::new(PERSISTENCE.templates.path)),
            template_form: TemplateForm::default(),
            candles: Vec::new(),
            analysis: None,
            overlay: ChartOverlay::default(),
            chat_input: String::new(),
            symbol_edited_at: None,
            stream: KlineStreamManager::new(),
            live_rx: None,
            history_rx: None,
            analysis_rx: None,
            chat_rx: None,
            llm: None,
            llm_error: None,
            status_message: None,
            offline: false,
            plot_view: PlotView::new(),
            state: AppState::default(),
        }
    }
}

impl App {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, args: Cli) -> Self {
        let mut app: App = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Self::default()
        };

        app.prefs = load_or_default(&app.prefs_repo);

        // A fresh install picks up the default template, unless the command line chose a market
        let has_market_args = args.symbol.is_some() || args.timeframe.is_some() || args.source.is_some();
        if app.prefs == Preferences::default() && !has_market_args {
            if let Some(template) = app.templates.default_template() {
                log::info!("Applying default template '{}'", template.name);
                let cfg = template.configuration.clone();
                app.prefs.apply_template(&cfg);
            }
        }
        app.apply_cli(&args);
        app.saved_prefs = app.prefs.clone();

        match GeminiClient::from_env() {
            Ok(client) => app.llm = Some(Arc::new(client)),
            Err(e) => {
                log::warn!("LLM disabled: {}", e);
                app.llm_error = Some(e);
            }
        }

        app.chat = ChatSession::new(&display_symbol(&app.prefs.symbol), &app.prefs.timeframe);
        app.symbol_input = app.prefs.symbol.clone();
        app.plot_view = PlotView::new();
        app.load_chart();
        app
    }

    fn apply_cli(&mut self, args: &Cli) {
        self.offline = args.offline;
        if let Some(source) = args.source {
            self.prefs.set_data_source(source);
        }
        if let Some(symbol) = &args.symbol {
            self.prefs.set_symbol(symbol);
        }
        if let Some(tf) = &args.timeframe {
            if TimeUtils::interval_from_str(tf).is_some() {
                self.prefs.timeframe = tf.clone();
            } else {
                log::warn!("Ignoring unknown timeframe '{}'", tf);
            }
        }
    }

    pub(crate) fn chart_key(&self) -> ChartKey {
        ChartKey {
            source: self.prefs.data_source,
            symbol: self.prefs.symbol.clone(),
            timeframe: self.prefs.timeframe.clone(),
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.history_rx.is_some()
    }

    pub(crate) fn is_analyzing(&self) -> bool {
        self.analysis_rx.is_some()
    }

    /// Live price when streaming, else the last close.
    pub(crate) fn current_price(&self) -> Option<f64> {
        price_or_last_close(self.stream.latest_price(), &self.candles)
    }

    pub(crate) fn current_volume(&self) -> Option<f64> {
        self.stream
            .latest_volume()
            .or_else(|| self.candles.last().and_then(|c| c.volume))
    }

    /// Drops the current chart and starts history + live feed for the selected market.
    pub(crate) fn load_chart(&mut self) {
        self.candles.clear();
        self.plot_view.reset();
        self.status_message = None;
        // Dropping the old manager stops its socket
        self.stream = KlineStreamManager::new();
        self.live_rx = None;
        self.history_rx = None;

        if self.offline {
            return;
        }

        let key = self.chart_key();
        let (history_tx, history_rx) = mpsc::channel();
        self.history_rx = Some(history_rx);
        let job_key = key.clone();
        thread::spawn(move || {
            let result = match Runtime::new() {
                Ok(rt) => rt.block_on(fetch_history(
                    job_key.source,
                    &job_key.symbol,
                    &job_key.timeframe,
                    HISTORY_LIMIT,
                )),
                Err(e) => Err(anyhow::Error::new(e).context("Failed to create runtime for history fetch")),
            };
            let _ = history_tx.send((job_key, result));
        });

        let (live_tx, live_rx) = mpsc::channel();
        self.stream.set_candle_sender(live_tx);
        self.stream.start(key.source, &key.symbol, &key.timeframe);
        self.live_rx = Some(live_rx);
    }

    /// Drains every background channel. Results for a chart that is no longer on screen are dropped.
    pub(crate) fn poll_background(&mut self) {
        let key = self.chart_key();

        if let Some((result_key, result)) = take_reply(&mut self.history_rx) {
            if result_key == key {
                match result {
                    Ok(candles) => {
                        self.candles = candles;
                        self.plot_view.reset();
                    }
                    Err(e) => {
                        log::error!("{} for {} {}: {:#}", UI_TEXT.error_history, key.symbol, key.timeframe, e);
                        self.status_message = Some(format!("{}: {:#}", UI_TEXT.error_history, e));
                    }
                }
            }
        }

        if let Some(rx) = &self.live_rx {
            while let Ok(live) = rx.try_recv() {
                merge_live_candle(&mut self.candles, live.candle);
            }
        }

        if let Some((result_key, reply)) = take_reply(&mut self.analysis_rx) {
            if result_key != key {
                log::info!("Discarding analysis for {} {}", result_key.symbol, result_key.timeframe);
            } else {
                match reply {
                    Ok(result) => {
                        self.analysis = Some(result);
                        self.status_message = None;
                        self.rebuild_overlay();
                    }
                    Err(e) => {
                        log::error!("Analysis failed: {}", e);
                        self.status_message = Some(e.to_string());
                    }
                }
            }
        }

        if let Some(reply) = take_reply(&mut self.chat_rx) {
            self.chat.finish(reply);
        } else if self.chat.is_pending() && self.chat_rx.is_none() {
            self.chat.finish(Err(LlmError::Other("request aborted".to_string())));
        }
    }

    pub(crate) fn rebuild_overlay(&mut self) {
        self.overlay = match &self.analysis {
            Some(result) => build_overlay(result, &self.prefs.overlay_settings()),
            None => ChartOverlay::default(),
        };

        #[cfg(debug_assertions)]
        if DF.log_overlay {
            log::info!(
                "Overlay rebuilt: {} lines, {} markers",
                self.overlay.lines.len(),
                self.overlay.markers.len()
            );
        }
    }

    pub(crate) fn request_analysis(&mut self) {
        if self.is_analyzing() {
            return;
        }
        let Some(client) = self.llm.clone() else {
            self.status_message = self.llm_error.as_ref().map(|e| e.to_string());
            return;
        };
        let Some(price) = self.current_price() else {
            self.status_message = Some(UI_TEXT.error_no_price.clone());
            return;
        };
        let volume = self.current_volume();
        let key = self.chart_key();
        let symbol = display_symbol(&key.symbol);
        let timeframe = key.timeframe.to_uppercase();

        self.side_panel = SidePanelMode::Analysis;
        self.status_message = None;

        let (tx, rx) = mpsc::channel();
        self.analysis_rx = Some(rx);
        thread::spawn(move || {
            let reply = match Runtime::new() {
                Ok(rt) => rt.block_on(analyze_chart(client.as_ref(), &symbol, &timeframe, price, volume)),
                Err(e) => Err(LlmError::Other(e.to_string())),
            };
            let _ = tx.send((key, reply));
        });
    }

    pub(crate) fn send_chat(&mut self) {
        let question = mem::take(&mut self.chat_input);
        let question = question.trim();
        if question.is_empty() {
            return;
        }

        let symbol = display_symbol(&self.prefs.symbol);
        let timeframe = self.prefs.timeframe.to_uppercase();
        let context = ChartContext {
            symbol: &symbol,
            timeframe: &timeframe,
            price: self.current_price(),
            volume: self.current_volume(),
            source: self.prefs.data_source,
            moving_averages: &self.prefs.moving_averages,
            theme: self.prefs.theme,
            show_ai_drawings: self.prefs.show_ai_analysis_drawings,
        };
        let model_text = chat_context(&context, self.analysis.as_ref(), question);

        let Some(request) = self.chat.begin(question, model_text) else {
            return;
        };
        let Some(client) = self.llm.clone() else {
            self.chat.finish(Err(self.llm_error.clone().unwrap_or(LlmError::MissingApiKey)));
            return;
        };

        let (tx, rx) = mpsc::channel();
        self.chat_rx = Some(rx);
        thread::spawn(move || {
            let reply = match Runtime::new() {
                Ok(rt) => rt.block_on(client.chat(&request.system_prompt, &request.history)),
                Err(e) => Err(LlmError::Other(e.to_string())),
            };
            let _ = tx.send(reply);
        });
    }

    pub(crate) fn clear_chat(&mut self) {
        self.chat.clear();
        self.chat_rx = None;
    }

    fn on_market_changed(&mut self) {
        self.analysis = None;
        self.analysis_rx = None;
        self.overlay = ChartOverlay::default();
        self.symbol_input = self.prefs.symbol.clone();
        self.symbol_edited_at = None;
        self.chat
            .retarget(&display_symbol(&self.prefs.symbol), &self.prefs.timeframe);
        self.load_chart();
    }

    pub(crate) fn set_source(&mut self, source: DataSource) {
        if source == self.prefs.data_source {
            return;
        }
        self.prefs.set_data_source(source);
        self.on_market_changed();
    }

    pub(crate) fn set_symbol(&mut self, symbol: &str) {
        let symbol = self.prefs.data_source.consistent_symbol(symbol);
        if symbol.is_empty() || symbol == self.prefs.symbol {
            return;
        }
        self.prefs.set_symbol(&symbol);
        self.on_market_changed();
    }

    pub(crate) fn set_timeframe(&mut self, timeframe: &str) {
        if timeframe == self.prefs.timeframe || TimeUtils::interval_from_str(timeframe).is_none() {
            return;
        }
        self.prefs.timeframe = timeframe.to_string();
        self.on_market_changed();
    }

    pub(crate) fn on_symbol_typed(&mut self) {
        self.symbol_edited_at = Some(Instant::now());
    }

    /// Typed symbols are applied once typing pauses.
    fn apply_debounced_symbol(&mut self, ctx: &Context) {
        let Some(edited_at) = self.symbol_edited_at else {
            return;
        };
        let debounce = Duration::from_millis(SYMBOL_INPUT_DEBOUNCE_MS);
        let elapsed = edited_at.elapsed();
        if elapsed >= debounce {
            self.commit_symbol_input();
        } else {
            ctx.request_repaint_after(debounce - elapsed);
        }
    }

    pub(crate) fn commit_symbol_input(&mut self) {
        self.symbol_edited_at = None;
        let input = self.symbol_input.clone();
        if input.trim().is_empty() {
            self.symbol_input = self.prefs.symbol.clone();
            return;
        }
        self.set_symbol(&input);
    }

    pub(crate) fn handle_template_action(&mut self, action: TemplateAction) {
        match action {
            TemplateAction::Save => {
                let form = mem::take(&mut self.template_form);
                let id = self.templates.save_template(
                    &form.name,
                    Some(form.description.as_str()),
                    form.is_default,
                    self.prefs.to_template_configuration(),
                );
                if form.is_default {
                    self.templates.set_as_default(&id);
                }
            }
            TemplateAction::Load(id) => {
                if let Some(cfg) = self.templates.load_template(&id) {
                    let before = self.chart_key();
                    self.prefs.apply_template(&cfg);
                    if self.chart_key() != before {
                        self.on_market_changed();
                    } else {
                        self.rebuild_overlay();
                    }
                }
            }
            TemplateAction::Delete(id) => self.templates.delete_template(&id),
            TemplateAction::SetDefault(id) => self.templates.set_as_default(&id),
            TemplateAction::UpdateActive => self
                .templates
                .update_active_template(self.prefs.to_template_configuration()),
        }
    }

    fn persist_preferences_if_changed(&mut self) {
        if self.prefs == self.saved_prefs {
            return;
        }
        match self.prefs_repo.save(&self.prefs) {
            Ok(()) => self.saved_prefs = self.prefs.clone(),
            Err(e) => {
                log::error!("Failed to save preferences: {:#}", e);
                // Don't retry every frame
                self.saved_prefs = self.prefs.clone();
            }
        }
    }

    fn render_frame(&mut self, ctx: &Context) {
        self.poll_background();
        self.apply_debounced_symbol(ctx);
        self.render_top_panel(ctx);
        self.render_status_panel(ctx);
        self.render_side_panel(ctx);
        self.render_windows(ctx);
    }

    pub(crate) fn tick_loading_state(&mut self, ctx: &Context, state: &mut LoadingState) -> AppState {
        let key = self.chart_key();
        if state.key.as_ref() != Some(&key) {
            state.key = Some(key);
        }

        self.render_frame(ctx);

        if self.is_loading() {
            self.render_loading_panel(ctx);
            ctx.request_repaint_after(Duration::from_millis(100));
            AppState::Loading(state.clone())
        } else {
            self.render_chart_panel(ctx);
            AppState::Running(RunningState)
        }
    }

    pub(crate) fn tick_running_state(&mut self, ctx: &Context) -> AppState {
        self.render_frame(ctx);
        self.persist_preferences_if_changed();

        if self.is_loading() {
            self.render_loading_panel(ctx);
            return AppState::Loading(LoadingState {
                key: Some(self.chart_key()),
            });
        }

        self.render_chart_panel(ctx);
        // Live candles and LLM replies arrive off the UI thread
        ctx.request_repaint_after(Duration::from_millis(250));
        AppState::Running(RunningState)
    }
}

fn price_or_last_close(live: Option<f64>, candles: &[Candle]) -> Option<f64> {
    live.or_else(|| candles.last().map(|c| c.close_price))
}

/// Takes the reply of a one-shot background job. A job that died without
/// replying frees its slot too.
fn take_reply<T>(slot: &mut Option<Receiver<T>>) -> Option<T> {
    let reply = match slot.as_ref()?.try_recv() {
        Ok(reply) => Some(reply),
        Err(TryRecvError::Empty) => return None,
        Err(TryRecvError::Disconnected) => {
            log::error!("Background job ended without a reply");
            None
        }
    };
    *slot = None;
    reply
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        setup_custom_visuals(ctx, self.prefs.theme);
        let current = mem::take(&mut self.state);
        self.state = match current {
            AppState::Loading(mut s) => s.tick(self, ctx),
            AppState::Running(mut s) => s.tick(self, ctx),
        };
    }

    fn save(&mut self, storage: &mut dyn Storage) {
        self.persist_preferences_if_changed();
        eframe::set_value(storage, eframe::APP_KEY, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_falls_back_to_last_close() {
        let candles = vec![
            Candle::new(0, 10.0, 12.0, 9.0, 11.0, Some(5.0)),
            Candle::new(60_000, 11.0, 13.0, 10.5, 12.5, None),
        ];
        assert_eq!(price_or_last_close(Some(12.9), &candles), Some(12.9));
        assert_eq!(price_or_last_close(None, &candles), Some(12.5));
        assert_eq!(price_or_last_close(None, &[]), None);
    }

    #[test]
    fn finished_job_frees_its_slot() {
        let (tx, rx) = mpsc::channel();
        let mut slot = Some(rx);
        assert_eq!(take_reply::<u8>(&mut slot), None);
        assert!(slot.is_some());

        tx.send(7).expect("send");
        assert_eq!(take_reply(&mut slot), Some(7));
        assert!(slot.is_none());

        let (tx, rx) = mpsc::channel::<u8>();
        drop(tx);
        let mut slot = Some(rx);
        assert_eq!(take_reply(&mut slot), None);
        assert!(slot.is_none());
    }
}
