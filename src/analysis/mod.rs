// Chart analysis: Fibonacci levels, overlay colors and drawings, moving averages
pub mod fibonacci;
pub mod moving_average;
pub mod overlay;
pub mod signal_color;

pub use fibonacci::{FibImpulse, FibLevel, FibLevelSet, ImpulseDirection};
pub use moving_average::{LinePoint, MaKind, MovingAverageConfig};
pub use overlay::{
    ChartOverlay, LineStyle, MarkerPosition, MarkerShape, OverlayLine, OverlayMarker, OverlaySettings,
    build_overlay,
};
pub use signal_color::{Rgba, classify, classify_css, hex_to_rgba};
