//! Turns an `AnalysisResult` into horizontal lines and bar markers.
//!
//! Pure data: the plot layers decide how a line or marker is actually painted.

use crate::{
    analysis::{
        fibonacci::{FibImpulse, finite_levels},
        signal_color::{Rgba, classify, hex_to_rgba},
    },
    config::constants::{
        DEFAULT_SIGNALS_OPACITY, DEFAULT_W_SIGNAL_COLOR, DEFAULT_W_SIGNAL_OPACITY, FIB_COLORS_DARK, FIB_LINE_OPACITY,
    },
    models::{AnalysisPoint, AnalysisResult},
};

#[cfg(debug_assertions)]
use crate::config::DF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine {
    pub price: f64,
    pub color: Rgba,
    pub width: f32,
    pub style: LineStyle,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
    InBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
    Circle,
    Square,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMarker {
    pub time_ms: i64,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: Rgba,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartOverlay {
    pub lines: Vec<OverlayLine>,
    pub markers: Vec<OverlayMarker>,
}

impl ChartOverlay {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.markers.is_empty()
    }
}

/// Display switches and colors the overlay depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    pub show_ai_drawings: bool,
    pub show_w_signals: bool,
    pub show_ltf_fibonacci: bool,
    pub w_signal_color: String,
    /// 0.0..=1.0
    pub w_signal_alpha: f64,
    /// 0.0..=1.0, applied to every classified signal
    pub signals_alpha: f64,
    pub fib_htf_color: Rgba,
    pub fib_ltf_color: Rgba,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show_ai_drawings: true,
            show_w_signals: true,
            show_ltf_fibonacci: false,
            w_signal_color: DEFAULT_W_SIGNAL_COLOR.to_string(),
            w_signal_alpha: f64::from(DEFAULT_W_SIGNAL_OPACITY) / 100.0,
            signals_alpha: f64::from(DEFAULT_SIGNALS_OPACITY) / 100.0,
            fib_htf_color: hex_to_rgba(FIB_COLORS_DARK.0, FIB_LINE_OPACITY),
            fib_ltf_color: hex_to_rgba(FIB_COLORS_DARK.1, FIB_LINE_OPACITY),
        }
    }
}

const THIN: f32 = 1.0;
const THICK: f32 = 2.0;

/// Unix seconds from the model; values already in ms pass through.
fn marker_time_ms(seconds: i64) -> i64 {
    if seconds.abs() >= 100_000_000_000 { seconds } else { seconds * 1000 }
}

struct Builder<'a> {
    settings: &'a OverlaySettings,
    out: ChartOverlay,
}

impl Builder<'_> {
    fn color(&self, kind: &str, p: &AnalysisPoint) -> Rgba {
        classify(kind, p.timeframe(), p.importance(), &p.label, self.settings.signals_alpha)
    }

    fn line(&mut self, price: f64, color: Rgba, width: f32, style: LineStyle, title: String) {
        if !price.is_finite() {
            return;
        }
        self.out.lines.push(OverlayLine {
            price,
            color,
            width,
            style,
            title,
        });
    }

    /// A zone is two dashed lines in the order the model gave them.
    fn zone(&mut self, [a, b]: [f64; 2], color: Rgba, title: &str) {
        let (bottom, top) = if title.is_empty() {
            ("Zone Bottom".to_string(), "Zone Top".to_string())
        } else {
            (format!("{} (Bottom)", title), format!("{} (Top)", title))
        };
        self.line(a, color, THIN, LineStyle::Dashed, bottom);
        self.line(b, color, THIN, LineStyle::Dashed, top);
    }

    fn marker(&mut self, p: &AnalysisPoint, color: Rgba, shape: MarkerShape, position: MarkerPosition) {
        let Some(t) = p.marker_time else { return };
        let text = match p.marker_text.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => p.label.chars().take(3).collect(),
        };
        self.out.markers.push(OverlayMarker {
            time_ms: marker_time_ms(t),
            position,
            shape,
            color,
            text,
        });
    }

    fn key_points(&mut self, points: &[AnalysisPoint]) {
        for p in points {
            let color = self.color(&p.tipo, p);
            if let Some(level) = p.nivel {
                self.line(level, color, THIN, LineStyle::Dashed, p.label.clone());
            }
            if let Some(zone) = p.zona {
                self.zone(zone, color, &p.label);
            }
        }
    }

    fn liquidity(&mut self, result: &AnalysisResult) {
        for p in &result.liquidez_importante.buy_side {
            let color = self.color("buy_side", p);
            if let Some(level) = p.nivel {
                self.line(level, color, THICK, LineStyle::Solid, format!("BSL: {}", p.label));
            }
            self.marker(p, color, MarkerShape::ArrowUp, MarkerPosition::BelowBar);
        }
        for p in &result.liquidez_importante.sell_side {
            let color = self.color("sell_side", p);
            if let Some(level) = p.nivel {
                self.line(level, color, THICK, LineStyle::Solid, format!("SSL: {}", p.label));
            }
            self.marker(p, color, MarkerShape::ArrowDown, MarkerPosition::AboveBar);
        }
    }

    /// Order blocks draw as zones when a range is given, otherwise as a single line.
    fn order_blocks(&mut self, points: &[AnalysisPoint], fallback_kind: &str, name: &str, position: MarkerPosition) {
        for p in points {
            let kind = if p.tipo.is_empty() { fallback_kind } else { p.tipo.as_str() };
            let color = self.color(kind, p);
            if let Some(zone) = p.zona {
                self.zone(zone, color, &format!("OB {}: {}", name, p.label));
            } else if let Some(level) = p.nivel {
                self.line(level, color, THIN, LineStyle::Dashed, format!("{}: {}", name, p.label));
            }
            self.marker(p, color, MarkerShape::Circle, position);
        }
    }

    fn fair_value_gaps(&mut self, points: &[AnalysisPoint]) {
        for p in points {
            let color = self.color("fvg", p);
            if let Some(zone) = p.zona {
                self.zone(zone, color, &format!("FVG: {}", p.label));
            }
            self.marker(p, color, MarkerShape::Square, MarkerPosition::InBar);
        }
    }

    fn w_signals(&mut self, result: &AnalysisResult) {
        let color = hex_to_rgba(&self.settings.w_signal_color, self.settings.w_signal_alpha);
        let w_points: Vec<&AnalysisPoint> = result
            .all_points()
            .filter(|p| p.tipo.contains("w_signal") || p.tipo.contains("AI_W_SIGNAL"))
            .collect();

        for p in w_points {
            let Some(t) = p.marker_time else { continue };
            let bullish = p.tipo.contains("bullish") || p.tipo.contains("alcista");
            let (shape, position) = if bullish {
                (MarkerShape::ArrowUp, MarkerPosition::BelowBar)
            } else {
                (MarkerShape::ArrowDown, MarkerPosition::AboveBar)
            };
            self.out.markers.push(OverlayMarker {
                time_ms: marker_time_ms(t),
                position,
                shape,
                color,
                text: "W".to_string(),
            });
        }
    }

    fn fibonacci(&mut self, impulse: Option<FibImpulse>, color: Rgba, tag: &str) {
        let Some(impulse) = impulse else { return };
        for level in finite_levels(&impulse.levels().retracements) {
            self.line(
                level.price,
                color,
                THIN,
                LineStyle::Dotted,
                format!("Retracement {} {}", level.label, tag),
            );
        }
    }
}

pub fn build_overlay(result: &AnalysisResult, settings: &OverlaySettings) -> ChartOverlay {
    if !settings.show_ai_drawings {
        return ChartOverlay::default();
    }

    let mut b = Builder {
        settings,
        out: ChartOverlay::default(),
    };

    b.key_points(&result.puntos_clave_grafico);
    b.liquidity(result);

    let zones = &result.zonas_criticas_oferta_demanda;
    b.order_blocks(&zones.oferta_clave, "oferta", "Supply", MarkerPosition::AboveBar);
    b.order_blocks(&zones.demanda_clave, "demanda", "Demand", MarkerPosition::BelowBar);
    b.fair_value_gaps(&zones.fvg_importantes);

    if settings.show_w_signals {
        b.w_signals(result);
    }

    b.fibonacci(result.htf_impulse(), settings.fib_htf_color, "HTF");
    if settings.show_ltf_fibonacci {
        b.fibonacci(result.ltf_impulse(), settings.fib_ltf_color, "LTF");
    }

    #[cfg(debug_assertions)]
    if DF.log_overlay {
        log::info!(
            "Overlay built: {} lines, {} markers",
            b.out.lines.len(),
            b.out.markers.len()
        );
    }

    b.out
}
