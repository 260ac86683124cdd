use std::{
    hash::{DefaultHasher, Hash, Hasher},
    ops::RangeInclusive,
};

use eframe::egui::{Ui, Vec2b};
use egui_plot::{Axis, AxisHints, GridMark, HPlacement, Plot, VPlacement};

use crate::{
    analysis::{ChartOverlay, MovingAverageConfig},
    config::plot::PLOT_CONFIG,
    domain::Candle,
    models::Preferences,
    ui::{
        UI_TEXT,
        plot_layers::{
            CandlestickLayer, LayerContext, MaSeries, MarkerLayer, MovingAverageLayer, OverlayLineLayer, PlotLayer,
            PriceLineLayer, VolumeLayer, candle_index_at,
        },
        styles::{hex_to_color32, theme_colors},
    },
    utils::{epoch_ms_to_utc, format_price},
};

/// Which layers are drawn. Persisted with the UI session.
#[derive(Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlotVisibility {
    pub candles: bool,
    pub volume: bool,
    pub moving_averages: bool,
    pub price_line: bool,
}

impl Default for PlotVisibility {
    fn default() -> Self {
        Self {
            candles: true,
            volume: true,
            moving_averages: true,
            price_line: true,
        }
    }
}

#[derive(Clone)]
struct PlotCache {
    hash: u64,
    moving_averages: Vec<MaSeries>,
}

#[derive(Default)]
pub struct PlotView {
    cache: Option<PlotCache>,
    fit_pending: bool,
}

// Helper: Calculate a human-friendly step size (1, 2, 5, 10, 20, 50...)
fn calculate_adaptive_step(range: f64, target_count: f64) -> f64 {
    let raw_step = range / target_count.max(1.0);
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return 1.0;
    }
    let mag = 10.0_f64.powi(raw_step.log10().floor() as i32);
    let normalized = raw_step / mag; // 1.0 .. 10.0

    let nice_step = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };

    // Never step less than one candle
    (nice_step * mag).max(1.0)
}

fn create_time_axis(candles: &[Candle]) -> AxisHints<'static> {
    let timestamps: Vec<i64> = candles.iter().map(|c| c.timestamp_ms).collect();

    AxisHints::new(Axis::X)
        .label(UI_TEXT.plot_x_axis.as_str())
        .formatter(move |mark, _range| {
            let idx = mark.value.round();
            if idx < 0.0 {
                return String::new();
            }
            timestamps
                .get(idx as usize)
                .map(|ts| epoch_ms_to_utc(*ts))
                .unwrap_or_default()
        })
        .placement(VPlacement::Bottom)
}

fn create_y_axis(symbol: &str) -> AxisHints<'static> {
    let label = format!("{}  {}", symbol, UI_TEXT.plot_y_axis);
    AxisHints::new_y()
        .label(label)
        .formatter(|grid_mark, _range| format_price(grid_mark.value))
        .placement(HPlacement::Right)
}

/// Price range of the candles plus the live price, padded.
pub fn calculate_y_bounds(candles: &[Candle], current_price: Option<f64>) -> Option<RangeInclusive<f64>> {
    let (mut lo, mut hi) = candles
        .iter()
        .filter(|c| c.is_valid())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.low_price), hi.max(c.high_price))
        });
    if let Some(price) = current_price.filter(|p| p.is_finite()) {
        lo = lo.min(price);
        hi = hi.max(price);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }

    let range = hi - lo;
    let pad = if range > 0.0 {
        range * PLOT_CONFIG.plot_y_padding_pct
    } else {
        hi.abs().max(1.0) * PLOT_CONFIG.plot_y_padding_pct
    };
    Some((lo - pad).max(0.0)..=(hi + pad))
}

fn map_to_indices(candles: &[Candle], config: &MovingAverageConfig) -> MaSeries {
    let points = config
        .compute(candles)
        .into_iter()
        .filter_map(|p| candle_index_at(candles, p.timestamp_ms).map(|i| [i as f64, p.value]))
        .collect();
    MaSeries {
        title: config.title(),
        color: hex_to_color32(&config.color),
        points,
    }
}

impl PlotView {
    pub fn new() -> Self {
        Self {
            cache: None,
            fit_pending: true,
        }
    }

    /// New series on screen: drop cached lines and refit the view on the next frame.
    pub fn reset(&mut self) {
        self.cache = None;
        self.fit_pending = true;
    }

    fn moving_averages(&mut self, candles: &[Candle], configs: &[MovingAverageConfig]) -> Vec<MaSeries> {
        let mut hasher = DefaultHasher::new();
        candles.len().hash(&mut hasher);
        if let Some(last) = candles.last() {
            last.timestamp_ms.hash(&mut hasher);
            last.close_price.to_bits().hash(&mut hasher);
        }
        for cfg in configs {
            (&cfg.id, cfg.period, cfg.visible, &cfg.color, cfg.kind.to_string()).hash(&mut hasher);
        }
        let hash = hasher.finish();

        if let Some(cache) = &self.cache {
            if cache.hash == hash {
                return cache.moving_averages.clone();
            }
        }

        let moving_averages: Vec<MaSeries> = configs
            .iter()
            .filter(|cfg| cfg.visible)
            .map(|cfg| map_to_indices(candles, cfg))
            .collect();
        self.cache = Some(PlotCache {
            hash,
            moving_averages: moving_averages.clone(),
        });
        moving_averages
    }

    pub fn show_chart(
        &mut self,
        ui: &mut Ui,
        symbol: &str,
        candles: &[Candle],
        overlay: &ChartOverlay,
        current_price: Option<f64>,
        prefs: &Preferences,
        visibility: &PlotVisibility,
    ) {
        let Some(y_bounds) = calculate_y_bounds(candles, current_price) else {
            return;
        };
        let (y_min, y_max) = (*y_bounds.start(), *y_bounds.end());

        let count = candles.len() as f64;
        let x_pad = (count * PLOT_CONFIG.plot_x_padding_pct).max(1.0);
        let x_bounds = -x_pad..=(count - 1.0 + x_pad * 2.0);

        let moving_averages = if visibility.moving_averages {
            self.moving_averages(candles, &prefs.moving_averages)
        } else {
            Vec::new()
        };

        let volume_height_pct = match prefs.volume_pane_height {
            0 => PLOT_CONFIG.volume_height_pct,
            pct => f64::from(pct.clamp(5, 50)) / 100.0,
        };

        let ctx = LayerContext {
            candles,
            moving_averages: &moving_averages,
            overlay,
            theme: theme_colors(prefs.theme),
            current_price,
            y_bounds: (y_min, y_max),
            volume_height_pct,
        };

        let mut layers: Vec<Box<dyn PlotLayer>> = Vec::with_capacity(6);
        if visibility.volume {
            layers.push(Box::new(VolumeLayer));
        }
        if visibility.candles {
            layers.push(Box::new(CandlestickLayer));
        }
        if visibility.moving_averages {
            layers.push(Box::new(MovingAverageLayer));
        }
        if !overlay.is_empty() {
            layers.push(Box::new(OverlayLineLayer));
            layers.push(Box::new(MarkerLayer));
        }
        if visibility.price_line {
            layers.push(Box::new(PriceLineLayer));
        }

        let fit = std::mem::take(&mut self.fit_pending);

        Plot::new(format!("chart_{}_{}", symbol, prefs.timeframe))
            .custom_x_axes(vec![create_time_axis(candles)])
            .custom_y_axes(vec![create_y_axis(symbol)])
            .label_formatter(|name, value| {
                if name.is_empty() {
                    format_price(value.y)
                } else {
                    format!("{}\n{}", name, format_price(value.y))
                }
            })
            .x_grid_spacer(move |input| {
                let (min, max) = input.bounds;
                let step = calculate_adaptive_step(max - min, 8.0);
                let start = (min / step).ceil() as i64;
                let end = (max / step).floor() as i64;
                (start..=end)
                    .map(|i| GridMark {
                        value: i as f64 * step,
                        step_size: step,
                    })
                    .collect()
            })
            .allow_double_click_reset(false)
            .allow_scroll(Vec2b { x: true, y: false })
            .allow_drag(Vec2b { x: true, y: true })
            .allow_zoom(Vec2b { x: true, y: true })
            .show(ui, |plot_ui| {
                // Fit once per series and on double click; otherwise the user owns the view
                if fit || plot_ui.response().double_clicked() {
                    plot_ui.set_plot_bounds_x(x_bounds.clone());
                    plot_ui.set_plot_bounds_y(y_bounds.clone());
                }
                for layer in layers {
                    layer.render(plot_ui, &ctx);
                }
            });
    }
}
