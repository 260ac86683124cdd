//! Fibonacci retracement and extension levels for a price impulse.
//!
//! Every function here is total: degenerate anchors (A == B) or NaN inputs are
//! not rejected, they just flow through into the computed prices. Callers that
//! draw the levels filter with [`finite_levels`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_RETRACEMENT_RATIOS: [f64; 4] = [0.382, 0.5, 0.618, 0.786];
pub const DEFAULT_EXTENSION_RATIOS: [f64; 3] = [1.272, 1.618, 2.618];
pub const DEFAULT_ALTERNATIVE_EXTENSION_RATIOS: [f64; 3] = [-0.272, -0.618, -1.272];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
    pub label: String,
}

impl FibLevel {
    fn new(ratio: f64, price: f64) -> Self {
        FibLevel {
            ratio,
            price,
            label: ratio_label(ratio),
        }
    }
}

/// `0.618` -> `"61.8%"`
pub fn ratio_label(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpulseDirection {
    Up,
    Down,
}

impl ImpulseDirection {
    /// Only a strictly rising move counts as `Up`. Flat impulses sort like `Down`.
    pub fn of(start: f64, end: f64) -> Self {
        if end > start { Self::Up } else { Self::Down }
    }
}

/// `price = b - (b - a) * r` for each ratio. Works for either impulse direction.
pub fn retracements(a: f64, b: f64, ratios: &[f64]) -> Vec<FibLevel> {
    let range = b - a;
    ratios.iter().map(|&r| FibLevel::new(r, b - range * r)).collect()
}

/// Projects the impulse length from the retracement end: `price = c + (b - a) * r`.
pub fn extensions(a: f64, b: f64, c: f64, ratios: &[f64]) -> Vec<FibLevel> {
    let range = b - a;
    ratios.iter().map(|&r| FibLevel::new(r, c + range * r)).collect()
}

/// Older projection measured from `b` with negative ratios: `price = b + (b - a) * r`.
/// `c` is accepted for signature parity with [`extensions`] and ignored.
pub fn extensions_alternative(a: f64, b: f64, _c: f64, ratios: &[f64]) -> Vec<FibLevel> {
    let range = b - a;
    ratios.iter().map(|&r| FibLevel::new(r, b + range * r)).collect()
}

fn cmp_f64(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

/// Orders retracements from the level nearest `b` to the furthest.
pub fn sort_retracements_for_display(levels: &mut [FibLevel], direction: ImpulseDirection) {
    match direction {
        ImpulseDirection::Up => levels.sort_by(|x, y| cmp_f64(y.price, x.price)),
        ImpulseDirection::Down => levels.sort_by(|x, y| cmp_f64(x.price, y.price)),
    }
}

pub fn sort_extensions_for_display(levels: &mut [FibLevel]) {
    levels.sort_by(|x, y| cmp_f64(x.ratio, y.ratio));
}

pub fn finite_levels(levels: &[FibLevel]) -> Vec<FibLevel> {
    levels.iter().filter(|l| l.price.is_finite()).cloned().collect()
}

/// One analysed swing, as reported for a timeframe.
#[derive(Debug, Clone, PartialEq)]
pub struct FibImpulse {
    pub timeframe: String,
    pub description: String,
    pub start: f64,
    pub end: f64,
    pub retracement_end: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FibLevelSet {
    pub retracements: Vec<FibLevel>,
    pub extensions: Vec<FibLevel>,
}

impl FibImpulse {
    pub fn direction(&self) -> ImpulseDirection {
        ImpulseDirection::of(self.start, self.end)
    }

    /// Default-ratio levels, display-sorted. Extensions need a retracement end.
    pub fn levels(&self) -> FibLevelSet {
        let mut retr = retracements(self.start, self.end, &DEFAULT_RETRACEMENT_RATIOS);
        sort_retracements_for_display(&mut retr, self.direction());

        let mut ext = match self.retracement_end {
            Some(c) => extensions(self.start, self.end, c, &DEFAULT_EXTENSION_RATIOS),
            None => Vec::new(),
        };
        sort_extensions_for_display(&mut ext);

        FibLevelSet {
            retracements: retr,
            extensions: ext,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retracement_formula_both_directions() {
        for (a, b) in [(100.0, 200.0), (200.0, 100.0), (-3.5, 7.25)] {
            for r in [0.0, 0.236, 0.5, 0.786, 1.0, 1.5] {
                let lvl = &retracements(a, b, &[r])[0];
                assert_eq!(lvl.price, b - (b - a) * r);
                assert_eq!(lvl.ratio, r);
            }
        }
    }

    #[test]
    fn boundary_ratios_hit_the_anchors() {
        assert_eq!(retracements(40.0, 90.0, &[0.0])[0].price, 90.0);
        assert_eq!(retracements(40.0, 90.0, &[1.0])[0].price, 40.0);
    }

    #[test]
    fn extension_is_linear_in_the_ratio() {
        assert_eq!(extensions(1.0, 9.0, 5.0, &[0.0])[0].price, 5.0);
        assert_eq!(extensions(100.0, 200.0, 150.0, &[1.618])[0].price, 150.0 + 100.0 * 1.618);
        let down = &extensions(200.0, 100.0, 150.0, &[1.0])[0];
        assert_eq!(down.price, 50.0);
    }

    #[test]
    fn default_retracements_contain_midpoint() {
        let levels = retracements(100.0, 200.0, &DEFAULT_RETRACEMENT_RATIOS);
        assert_eq!(levels.len(), 4);
        let mid = levels.iter().find(|l| l.ratio == 0.5).expect("0.5 level");
        assert_eq!(mid.price, 150.0);
        assert_eq!(mid.label, "50.0%");
    }

    #[test]
    fn degenerate_impulse_collapses() {
        for l in retracements(50.0, 50.0, &DEFAULT_RETRACEMENT_RATIOS) {
            assert_eq!(l.price, 50.0);
        }
        for l in extensions(50.0, 50.0, 42.0, &DEFAULT_EXTENSION_RATIOS) {
            assert_eq!(l.price, 42.0);
        }
    }

    #[test]
    fn nan_propagates_and_gets_filtered() {
        let levels = retracements(f64::NAN, 10.0, &[0.5, 0.0]);
        assert!(levels[0].price.is_nan());
        // r = 0 still multiplies NaN
        assert!(levels[1].price.is_nan());
        assert!(finite_levels(&levels).is_empty());
    }

    #[test]
    fn alternative_extension_ignores_c() {
        let a = extensions_alternative(100.0, 200.0, 1e9, &DEFAULT_ALTERNATIVE_EXTENSION_RATIOS);
        let b = extensions_alternative(100.0, 200.0, -5.0, &DEFAULT_ALTERNATIVE_EXTENSION_RATIOS);
        assert_eq!(a, b);
        assert!((a[1].price - (200.0 - 61.8)).abs() < 1e-9);
        assert_eq!(a[0].label, "-27.2%");
    }

    #[test]
    fn labels_use_one_decimal() {
        assert_eq!(ratio_label(0.618), "61.8%");
        assert_eq!(ratio_label(1.272), "127.2%");
        assert_eq!(ratio_label(2.618), "261.8%");
    }

    #[test]
    fn display_order_follows_direction() {
        let up = FibImpulse {
            timeframe: "4H".into(),
            description: String::new(),
            start: 100.0,
            end: 200.0,
            retracement_end: Some(150.0),
        };
        let set = up.levels();
        let prices: Vec<f64> = set.retracements.iter().map(|l| l.price).collect();
        assert!(prices.windows(2).all(|w| w[0] >= w[1]));
        let ratios: Vec<f64> = set.extensions.iter().map(|l| l.ratio).collect();
        assert_eq!(ratios, DEFAULT_EXTENSION_RATIOS.to_vec());

        let down = FibImpulse { start: 200.0, end: 100.0, retracement_end: None, ..up };
        let set = down.levels();
        let prices: Vec<f64> = set.retracements.iter().map(|l| l.price).collect();
        assert!(prices.windows(2).all(|w| w[0] <= w[1]));
        assert!(set.extensions.is_empty());
    }

    #[test]
    fn flat_impulse_sorts_like_down() {
        assert_eq!(ImpulseDirection::of(5.0, 5.0), ImpulseDirection::Down);
    }
}
