use eframe::egui::{Align2, Color32, RichText, Stroke};

use egui_plot::{
    HLine, Line, LineStyle as PlotLineStyle, MarkerShape as PlotMarkerShape, PlotPoint, PlotPoints, PlotUi, Points,
    Polygon, Text,
};

use crate::{
    analysis::{ChartOverlay, LineStyle, MarkerPosition, MarkerShape},
    config::plot::{PLOT_CONFIG, ThemeColors},
    domain::{Candle, CandleType},
    ui::{UI_TEXT, styles::rgba_to_color32},
};

/// A moving average already mapped onto candle indices.
#[derive(Clone)]
pub struct MaSeries {
    pub title: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

/// Context passed to every layer during rendering.
/// This prevents argument explosion.
pub struct LayerContext<'a> {
    pub candles: &'a [Candle],
    pub moving_averages: &'a [MaSeries],
    pub overlay: &'a ChartOverlay,
    pub theme: &'a ThemeColors,
    pub current_price: Option<f64>,
    /// Visible price range (min, max) after padding
    pub y_bounds: (f64, f64),
    /// Fraction of the visible price range the tallest volume bar may take
    pub volume_height_pct: f64,
}

/// A standardized layer in the plot stack.
pub trait PlotLayer {
    fn render(&self, ui: &mut PlotUi, ctx: &LayerContext);
}

/// Candle index whose bar contains `time_ms` (the last bar opened at or before it).
pub fn candle_index_at(candles: &[Candle], time_ms: i64) -> Option<usize> {
    let after = candles.partition_point(|c| c.timestamp_ms <= time_ms);
    after.checked_sub(1)
}

// ============================================================================
// 1. VOLUME LAYER
// ============================================================================
pub struct VolumeLayer;

impl PlotLayer for VolumeLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        let max_volume = ctx
            .candles
            .iter()
            .filter_map(|c| c.volume)
            .fold(0.0_f64, f64::max);
        if max_volume <= 0.0 {
            return;
        }

        let (y_min, y_max) = ctx.y_bounds;
        let scale = (y_max - y_min) * ctx.volume_height_pct / max_volume;

        for (i, candle) in ctx.candles.iter().enumerate() {
            let Some(volume) = candle.volume.filter(|v| *v > 0.0) else {
                continue;
            };
            let color = match candle.get_type() {
                CandleType::Bullish => PLOT_CONFIG.volume_bullish_color,
                CandleType::Bearish => PLOT_CONFIG.volume_bearish_color,
            };
            draw_body_rect(plot_ui, i as f64, y_min + volume * scale, y_min, color);
        }
    }
}

// ============================================================================
// 2. CANDLESTICK LAYER
// ============================================================================
pub struct CandlestickLayer;

impl PlotLayer for CandlestickLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        for (i, candle) in ctx.candles.iter().enumerate() {
            let x = i as f64;
            let color = match candle.get_type() {
                CandleType::Bullish => PLOT_CONFIG.candle_bullish_color,
                CandleType::Bearish => PLOT_CONFIG.candle_bearish_color,
            };

            if candle.high_price > candle.low_price {
                draw_wick_line(plot_ui, x, candle.high_price, candle.low_price, color);
            }

            let (body_bot, body_top_raw) = candle.body_range();
            // Doji: give the body a visible sliver
            let body_top = if (body_top_raw - body_bot).abs() < f64::EPSILON {
                body_bot * 1.0001
            } else {
                body_top_raw
            };
            draw_body_rect(plot_ui, x, body_top, body_bot, color);
        }
    }
}

#[inline]
fn draw_wick_line(ui: &mut PlotUi, x: f64, top: f64, bottom: f64, color: Color32) {
    ui.line(
        Line::new("", PlotPoints::new(vec![[x, bottom], [x, top]]))
            .color(color)
            .width(PLOT_CONFIG.candle_wick_width),
    );
}

#[inline]
fn draw_body_rect(ui: &mut PlotUi, x: f64, top: f64, bottom: f64, color: Color32) {
    let half_w = PLOT_CONFIG.candle_width_pct / 2.0;
    let pts = vec![
        [x - half_w, bottom],
        [x + half_w, bottom],
        [x + half_w, top],
        [x - half_w, top],
    ];

    // No stroke: borders blur thin candles
    ui.polygon(
        Polygon::new("", PlotPoints::new(pts))
            .fill_color(color)
            .stroke(Stroke::NONE),
    );
}

// ============================================================================
// 3. MOVING AVERAGE LAYER
// ============================================================================
pub struct MovingAverageLayer;

impl PlotLayer for MovingAverageLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        for series in ctx.moving_averages {
            if series.points.len() < 2 {
                continue;
            }
            plot_ui.line(
                Line::new(series.title.clone(), PlotPoints::new(series.points.clone()))
                    .color(series.color)
                    .width(PLOT_CONFIG.moving_average_line_width),
            );
        }
    }
}

// ============================================================================
// 4. ANALYSIS OVERLAY LINES
// ============================================================================
pub struct OverlayLineLayer;

fn plot_line_style(style: LineStyle) -> PlotLineStyle {
    match style {
        LineStyle::Solid => PlotLineStyle::Solid,
        LineStyle::Dashed => PlotLineStyle::Dashed { length: 8.0 },
        LineStyle::Dotted => PlotLineStyle::dotted_dense(),
    }
}

impl PlotLayer for OverlayLineLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        for line in &ctx.overlay.lines {
            if !line.price.is_finite() {
                continue;
            }
            plot_ui.hline(
                HLine::new(line.title.clone(), line.price)
                    .color(rgba_to_color32(line.color))
                    .width(line.width)
                    .style(plot_line_style(line.style)),
            );
        }
    }
}

// ============================================================================
// 5. ANALYSIS MARKERS
// ============================================================================
pub struct MarkerLayer;

fn plot_marker_shape(shape: MarkerShape) -> PlotMarkerShape {
    match shape {
        MarkerShape::ArrowUp => PlotMarkerShape::Up,
        MarkerShape::ArrowDown => PlotMarkerShape::Down,
        MarkerShape::Circle => PlotMarkerShape::Circle,
        MarkerShape::Square => PlotMarkerShape::Square,
    }
}

impl PlotLayer for MarkerLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        let (y_min, y_max) = ctx.y_bounds;
        let offset = (y_max - y_min) * 0.015;

        for marker in &ctx.overlay.markers {
            let Some(idx) = candle_index_at(ctx.candles, marker.time_ms) else {
                continue;
            };
            let candle = &ctx.candles[idx];
            let x = idx as f64;
            let (y, anchor) = match marker.position {
                MarkerPosition::AboveBar => (candle.high_price + offset, Align2::CENTER_BOTTOM),
                MarkerPosition::BelowBar => (candle.low_price - offset, Align2::CENTER_TOP),
                MarkerPosition::InBar => (candle.close_price, Align2::LEFT_CENTER),
            };
            let color = rgba_to_color32(marker.color);

            plot_ui.points(
                Points::new(marker.text.clone(), PlotPoints::new(vec![[x, y]]))
                    .shape(plot_marker_shape(marker.shape))
                    .radius(PLOT_CONFIG.overlay_marker_radius)
                    .color(color)
                    .filled(true),
            );

            if !marker.text.is_empty() {
                let text_y = match marker.position {
                    MarkerPosition::AboveBar => y + offset,
                    MarkerPosition::BelowBar => y - offset,
                    MarkerPosition::InBar => y,
                };
                plot_ui.text(
                    Text::new(
                        "",
                        PlotPoint::new(x, text_y),
                        RichText::new(&marker.text).small().color(ctx.theme.text),
                    )
                    .anchor(anchor),
                );
            }
        }
    }
}

// ============================================================================
// 6. CURRENT PRICE
// ============================================================================
pub struct PriceLineLayer;

impl PlotLayer for PriceLineLayer {
    fn render(&self, plot_ui: &mut PlotUi, ctx: &LayerContext) {
        if let Some(price) = ctx.current_price.filter(|p| p.is_finite()) {
            plot_ui.hline(
                HLine::new(UI_TEXT.plot_current_price.as_str(), price)
                    .color(PLOT_CONFIG.current_price_color)
                    .width(PLOT_CONFIG.current_price_line_width)
                    .style(PlotLineStyle::dashed_loose()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64) -> Candle {
        Candle::new(ts, 1.0, 2.0, 0.5, 1.5, Some(1.0))
    }

    #[test]
    fn marker_time_maps_to_containing_candle() {
        let candles = vec![bar(1_000), bar(2_000), bar(3_000)];
        assert_eq!(candle_index_at(&candles, 999), None);
        assert_eq!(candle_index_at(&candles, 1_000), Some(0));
        assert_eq!(candle_index_at(&candles, 2_500), Some(1));
        assert_eq!(candle_index_at(&candles, 9_000), Some(2));
        assert_eq!(candle_index_at(&[], 1_000), None);
    }
}
