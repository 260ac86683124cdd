//! Colors for analysis overlays, picked from the free-text tags the LLM emits.
//!
//! Tags are matched as lowercase substrings of `"{kind} {label}"`, never as a
//! closed enum: LLM output drifts (`bos_alcista`, `BOS 4H`, `Break (BOS)`) and
//! all of those must still land in the same color family. Rules are checked in
//! order and the first hit wins, so a label tagged both FVG and BSL is blue.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = if self.a.is_finite() { self.a.clamp(0.0, 1.0) } else { self.a };
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, a)
    }
}

/// Parses `#RRGGBB` (leading `#` optional). Bad hex digits read as 0.
pub fn hex_to_rgba(hex: &str, opacity: f64) -> Rgba {
    let digits = hex.trim().trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    Rgba {
        r: channel(0),
        g: channel(2),
        b: channel(4),
        a: opacity,
    }
}

/// Four shades for one hue, darkest for the shortest timeframes.
#[derive(Debug)]
pub struct TimeframeLadder {
    pub scalp: &'static str,    // 1m, 5m
    pub intraday: &'static str, // 15m, 30m
    pub swing: &'static str,    // 1h, 4h
    pub position: &'static str, // 1d, 1w
    pub fallback: &'static str,
}

impl TimeframeLadder {
    pub fn shade(&self, timeframe: &str) -> &'static str {
        match timeframe.trim().to_lowercase().as_str() {
            "1m" | "5m" => self.scalp,
            "15m" | "30m" => self.intraday,
            "1h" | "4h" => self.swing,
            "1d" | "1w" => self.position,
            _ => self.fallback,
        }
    }
}

pub const GOLD: &str = "#FFD700";
pub const NEUTRAL_GRAY: &str = "#6B7280";
pub const PURPLE: &str = "#7C3AED";
pub const SUPPLY_RED: &str = "#DC2626";
pub const DEMAND_GREEN: &str = "#16A34A";

pub const FVG_BLUES: TimeframeLadder = TimeframeLadder {
    scalp: "#1E3A8A",
    intraday: "#1E40AF",
    swing: "#2563EB",
    position: "#3B82F6",
    fallback: "#1E40AF",
};

pub const BUY_SIDE_GREENS: TimeframeLadder = TimeframeLadder {
    scalp: "#047857",
    intraday: "#059669",
    swing: "#10B981",
    position: "#22C55E",
    fallback: "#10B981",
};

pub const SELL_SIDE_REDS: TimeframeLadder = TimeframeLadder {
    scalp: "#991B1B",
    intraday: "#B91C1C",
    swing: "#DC2626",
    position: "#EF4444",
    fallback: "#DC2626",
};

/// Inputs of one classification, pre-normalised once.
pub struct SignalText {
    /// `"{kind} {label}"`, lowercased
    pub text: String,
    pub importance: String,
}

impl SignalText {
    pub fn new(kind: &str, importance: &str, label: &str) -> Self {
        SignalText {
            text: format!("{} {}", kind, label).to_lowercase(),
            importance: importance.trim().to_lowercase(),
        }
    }

    fn has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.text.contains(n))
    }
}

#[derive(Debug)]
pub enum Paint {
    Fixed(&'static str),
    Ladder(&'static TimeframeLadder),
}

pub struct SignalRule {
    pub name: &'static str,
    pub matches: fn(&SignalText) -> bool,
    pub paint: Paint,
}

pub const SIGNAL_RULES: &[SignalRule] = &[
    SignalRule {
        name: "high-importance",
        matches: |s| s.importance == "alta",
        paint: Paint::Fixed(GOLD),
    },
    SignalRule {
        name: "structure-break",
        matches: |s| s.has_any(&["bos", "choch"]),
        paint: Paint::Fixed(NEUTRAL_GRAY),
    },
    SignalRule {
        name: "fair-value-gap",
        matches: |s| s.has_any(&["fvg"]),
        paint: Paint::Ladder(&FVG_BLUES),
    },
    SignalRule {
        name: "equilibrium",
        // "eq" already covers "equilibrium"
        matches: |s| s.has_any(&["eq"]),
        paint: Paint::Fixed(PURPLE),
    },
    SignalRule {
        name: "buy-side-liquidity",
        matches: |s| s.has_any(&["bsl", "buy_side", "buy-side", "liquidez_compradora"]),
        paint: Paint::Ladder(&BUY_SIDE_GREENS),
    },
    SignalRule {
        name: "sell-side-liquidity",
        matches: |s| s.has_any(&["ssl", "sell_side", "sell-side", "liquidez_vendedora"]),
        paint: Paint::Ladder(&SELL_SIDE_REDS),
    },
    SignalRule {
        name: "supply",
        matches: |s| s.has_any(&["supply", "oferta"]),
        paint: Paint::Fixed(SUPPLY_RED),
    },
    SignalRule {
        name: "demand",
        matches: |s| s.has_any(&["demand", "demanda"]),
        paint: Paint::Fixed(DEMAND_GREEN),
    },
];

/// Name of the first rule that matches, or `None` for the neutral default.
pub fn matching_rule(kind: &str, importance: &str, label: &str) -> Option<&'static SignalRule> {
    let text = SignalText::new(kind, importance, label);
    SIGNAL_RULES.iter().find(|rule| (rule.matches)(&text))
}

pub fn classify(kind: &str, timeframe: &str, importance: &str, label: &str, opacity: f64) -> Rgba {
    let hex = match matching_rule(kind, importance, label) {
        Some(rule) => match rule.paint {
            Paint::Fixed(hex) => hex,
            Paint::Ladder(ladder) => ladder.shade(timeframe),
        },
        None => NEUTRAL_GRAY,
    };
    hex_to_rgba(hex, opacity)
}

/// [`classify`] rendered as a CSS `rgba(...)` string.
pub fn classify_css(kind: &str, timeframe: &str, importance: &str, label: &str, opacity: f64) -> String {
    classify(kind, timeframe, importance, label, opacity).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(c: Rgba) -> (u8, u8, u8) {
        (c.r, c.g, c.b)
    }

    fn hex_rgb(hex: &str) -> (u8, u8, u8) {
        rgb(hex_to_rgba(hex, 1.0))
    }

    // Rec. 601 luma, scaled by 1000
    fn luminance(c: (u8, u8, u8)) -> u32 {
        299 * c.0 as u32 + 587 * c.1 as u32 + 114 * c.2 as u32
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(hex_to_rgba("#FFD700", 0.5).to_string(), "rgba(255, 215, 0, 0.5)");
        assert_eq!(hex_to_rgba("6B7280", 1.0).to_string(), "rgba(107, 114, 128, 1)");
    }

    #[test]
    fn fvg_beats_bsl() {
        let c = classify("", "1h", "media", "FVG BSL zone", 0.65);
        assert_eq!(rgb(c), hex_rgb(FVG_BLUES.swing));
        assert_eq!(matching_rule("", "media", "FVG BSL zone").map(|r| r.name), Some("fair-value-gap"));
    }

    #[test]
    fn high_importance_always_gold() {
        for label in ["FVG", "BOS 4H", "BSL", "anything", ""] {
            let c = classify("liquidez_vendedora", "5m", "alta", label, 0.65);
            assert_eq!(rgb(c), hex_rgb(GOLD));
        }
        assert_eq!(rgb(classify("x", "", " ALTA ", "", 1.0)), hex_rgb(GOLD));
    }

    #[test]
    fn structure_breaks_are_gray_before_fvg() {
        let c = classify("bos_alcista", "1h", "media", "FVG retest", 1.0);
        assert_eq!(rgb(c), hex_rgb(NEUTRAL_GRAY));
        assert_eq!(rgb(classify("x", "", "", "ChoCh 15M", 1.0)), hex_rgb(NEUTRAL_GRAY));
    }

    #[test]
    fn ladders_lighten_with_timeframe() {
        for ladder_kind in ["bsl", "ssl", "fvg"] {
            let shades: Vec<u32> = ["5m", "30m", "4h", "1d"]
                .iter()
                .map(|tf| luminance(rgb(classify(ladder_kind, tf, "", "", 1.0))))
                .collect();
            assert!(shades.windows(2).all(|w| w[0] < w[1]), "{}: {:?}", ladder_kind, shades);
        }
        assert_ne!(classify("bsl", "5m", "", "", 1.0), classify("bsl", "1d", "", "", 1.0));
    }

    #[test]
    fn bucket_boundaries_and_case() {
        assert_eq!(rgb(classify("bsl", "1M", "", "", 1.0)), hex_rgb(BUY_SIDE_GREENS.scalp));
        assert_eq!(rgb(classify("bsl", "4H", "", "", 1.0)), hex_rgb(BUY_SIDE_GREENS.swing));
        assert_eq!(rgb(classify("bsl", "1W", "", "", 1.0)), hex_rgb(BUY_SIDE_GREENS.position));
        assert_eq!(rgb(classify("bsl", "2h", "", "", 1.0)), hex_rgb(BUY_SIDE_GREENS.fallback));
        assert_eq!(rgb(classify("ssl", "", "", "", 1.0)), hex_rgb(SELL_SIDE_REDS.fallback));
    }

    #[test]
    fn spanish_and_hyphenated_tags() {
        assert_eq!(rgb(classify("liquidez_compradora", "15m", "", "", 1.0)), hex_rgb(BUY_SIDE_GREENS.intraday));
        assert_eq!(rgb(classify("", "1m", "", "Sell-Side pool", 1.0)), hex_rgb(SELL_SIDE_REDS.scalp));
        assert_eq!(rgb(classify("poi_oferta", "", "", "", 1.0)), hex_rgb(SUPPLY_RED));
        assert_eq!(rgb(classify("poi_demanda", "", "", "", 1.0)), hex_rgb(DEMAND_GREEN));
        assert_eq!(rgb(classify("equilibrium", "", "", "", 1.0)), hex_rgb(PURPLE));
    }

    #[test]
    fn unknown_text_is_neutral() {
        assert_eq!(classify_css("nota_general", "1h", "baja", "note", 0.3), "rgba(107, 114, 128, 0.3)");
    }

    #[test]
    fn opacity_is_kept_and_clamped_for_display() {
        let c = classify("x", "", "", "", 1.7);
        assert_eq!(c.a, 1.7);
        assert!(c.to_string().ends_with(", 1)"));
    }
}
