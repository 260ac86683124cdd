//! Model text in, chart drawings out, through the public API only.

use traderoad::analysis::overlay::{LineStyle, MarkerPosition, MarkerShape};
use traderoad::analysis::signal_color::{GOLD, SUPPLY_RED};
use traderoad::analysis::{ImpulseDirection, build_overlay, classify, classify_css, hex_to_rgba};
use traderoad::llm::parse_analysis;
use traderoad::models::Preferences;

const FENCED_RESPONSE: &str = r#"```json
{
  "analisis_general": {
    "simbolo": "ETH/USDT",
    "temporalidad_principal_analisis": "1H",
    "sesgo_direccional_general": "alcista",
    "estructura_mercado_resumen": { "htf_1D": "Higher highs", "ltf_1H": "Pullback" }
  },
  "puntos_clave_grafico": [
    { "tipo": "resistencia", "nivel": "2450.5", "label": "Range top", "importancia": "alta" }
  ],
  "liquidez_importante": {
    "buy_side": [
      { "nivel": 2500, "label": "Weekly high", "temporalidad": "1h", "marker_time": 1700000000 }
    ],
    "sell_side": null
  },
  "zonas_criticas_oferta_demanda": {
    "oferta_clave": [ { "zona": [2480, 2495], "label": "4H block" } ]
  },
  "analisis_fibonacci": {
    "htf": {
      "temporalidad_analizada": "4H",
      "precio_inicio_impulso": 2000,
      "precio_fin_impulso": 2500,
      "precio_fin_retroceso": 2300
    },
    "ltf": {
      "temporalidad_analizada": "15M",
      "precio_inicio_impulso": 2400,
      "precio_fin_impulso": 2450
    }
  },
  "escenarios_probables": [
    { "nombre_escenario": "Continuation", "probabilidad": "alta", "descripcion_detallada": "Break of range top" }
  ]
}
```"#;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fenced_response_becomes_drawings() {
    let result = parse_analysis(FENCED_RESPONSE, "ETH/USDT", "1H");
    assert!(!result.is_fallback());
    assert_eq!(result.symbol(), Some("ETH/USDT"));
    assert_eq!(result.scenarios().len(), 1);

    let prefs = Preferences::default();
    let settings = prefs.overlay_settings();
    let overlay = build_overlay(&result, &settings);
    let titles: Vec<&str> = overlay.lines.iter().map(|l| l.title.as_str()).collect();

    // High importance wins over every other tag
    let key = overlay
        .lines
        .iter()
        .find(|l| l.title == "Range top")
        .expect("key level drawn");
    assert!(approx(key.price, 2450.5));
    assert_eq!(key.color, hex_to_rgba(GOLD, settings.signals_alpha));

    let bsl = overlay
        .lines
        .iter()
        .find(|l| l.title == "BSL: Weekly high")
        .expect("buy-side line drawn");
    assert_eq!(bsl.style, LineStyle::Solid);
    assert_eq!(bsl.width, 2.0);
    assert_eq!(
        bsl.color,
        classify("buy_side", "1h", "", "Weekly high", settings.signals_alpha)
    );

    assert!(titles.contains(&"OB Supply: 4H block (Bottom)"));
    assert!(titles.contains(&"OB Supply: 4H block (Top)"));
    let supply = overlay
        .lines
        .iter()
        .find(|l| l.title.starts_with("OB Supply"))
        .expect("supply zone drawn");
    assert_eq!(supply.color, hex_to_rgba(SUPPLY_RED, settings.signals_alpha));

    let marker = overlay.markers.first().expect("liquidity marker");
    assert_eq!(marker.time_ms, 1_700_000_000_000);
    assert_eq!(marker.shape, MarkerShape::ArrowUp);
    assert_eq!(marker.position, MarkerPosition::BelowBar);
    assert_eq!(marker.text, "Wee");

    // HTF retracements only, unless LTF is switched on
    assert!(titles.contains(&"Retracement 61.8% HTF"));
    assert!(!titles.iter().any(|t| t.ends_with("LTF")));

    let mut with_ltf = prefs.clone();
    with_ltf.show_ltf_fibonacci = true;
    let overlay = build_overlay(&result, &with_ltf.overlay_settings());
    let ltf_lines = overlay.lines.iter().filter(|l| l.title.ends_with("LTF")).count();
    assert_eq!(ltf_lines, 4);

    let mut hidden = prefs;
    hidden.show_ai_analysis_drawings = false;
    assert!(build_overlay(&result, &hidden.overlay_settings()).is_empty());
}

#[test]
fn fibonacci_levels_from_analysis() {
    let result = parse_analysis(FENCED_RESPONSE, "ETH/USDT", "1H");
    let htf = result.htf_impulse().expect("htf impulse");
    assert_eq!(htf.direction(), ImpulseDirection::Up);

    let levels = htf.levels();
    let prices: Vec<f64> = levels.retracements.iter().map(|l| l.price).collect();
    // Nearest to the impulse end first
    assert!(approx(prices[0], 2500.0 - 500.0 * 0.382));
    assert!(approx(prices[3], 2500.0 - 500.0 * 0.786));
    assert!(prices.windows(2).all(|w| w[0] > w[1]));

    let labels: Vec<&str> = levels.extensions.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["127.2%", "161.8%", "261.8%"]);
    assert!(approx(levels.extensions[1].price, 2300.0 + 500.0 * 1.618));

    // No retracement end, no extensions
    let ltf = result.ltf_impulse().expect("ltf impulse");
    assert!(ltf.levels().extensions.is_empty());
}

#[test]
fn truncated_response_is_repaired() {
    let truncated = r#"{"analisis_general": {"simbolo": "BTC/USDT", "sesgo_direccional_general": "bajista"}, "escenarios_probables": [{"nombre_escenario": "Rejection"},"#;
    let result = parse_analysis(truncated, "BTC/USDT", "4H");
    assert!(!result.is_fallback());
    assert_eq!(result.scenarios()[0].nombre_escenario, "Rejection");
}

#[test]
fn unusable_response_falls_back() {
    for text in ["", "not json at all", r#"{"analisis_general": {"simbolo": "X"}}"#] {
        let result = parse_analysis(text, "SOL/USDT", "15M");
        assert!(result.is_fallback(), "expected fallback for {:?}", text);
        assert_eq!(result.symbol(), Some("SOL/USDT"));
        assert_eq!(result.timeframe(), Some("15M"));
    }
}

#[test]
fn classifier_tags_and_ladders() {
    // Same family, different shade per timeframe
    let fvg_15m = classify_css("fvg", "15m", "", "", 1.0);
    let fvg_1d = classify_css("fvg", "1d", "", "", 1.0);
    assert_ne!(fvg_15m, fvg_1d);

    // First matching rule wins: FVG before buy-side liquidity
    assert_eq!(classify_css("fvg", "15m", "", "BSL sweep", 1.0), fvg_15m);

    // Free-text drift lands in the same family
    assert_eq!(
        classify("bos_alcista", "", "", "", 0.5),
        classify("estructura", "", "", "Break (BOS) 4H", 0.5)
    );
    assert!(classify_css("", "", "", "", 0.3).ends_with("0.3)"));
}
