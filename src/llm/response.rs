//! Turning raw model text into an `AnalysisResult`.
//!
//! The model is asked for bare JSON but still wraps it in Markdown fences now and
//! then, and long answers can be cut off at the token limit. Both are handled here;
//! anything still unusable becomes the fallback result.

use crate::models::AnalysisResult;

#[cfg(debug_assertions)]
use crate::config::DF;

/// Strips one surrounding ```` ``` ```` / ```` ```json ```` fence. Text without a
/// complete fence is returned trimmed and otherwise untouched.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Optional language tag directly after the opening fence
    let tag_len = inner
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    let body = inner[tag_len..].trim();
    if body.is_empty() { trimmed } else { body }
}

/// Best-effort fix for a truncated object: drops a trailing comma, then closes
/// open arrays followed by open objects. Counts are naive and ignore string contents.
pub fn repair_json(text: &str) -> String {
    let mut repaired = text.trim().to_string();
    if repaired.ends_with(',') {
        repaired.pop();
    }

    let count = |c: char| repaired.matches(c).count();
    let missing_brackets = count('[').saturating_sub(count(']'));
    let missing_braces = count('{').saturating_sub(count('}'));

    repaired.push_str(&"]".repeat(missing_brackets));
    repaired.push_str(&"}".repeat(missing_braces));
    repaired
}

/// Parse, then repair-and-parse, then fall back. A parsed result without the
/// general analysis or the scenarios is also replaced by the fallback.
pub fn parse_analysis(text: &str, symbol: &str, timeframe: &str) -> AnalysisResult {
    #[cfg(debug_assertions)]
    if DF.log_llm_raw_response {
        log::info!("Raw analysis response: {}", text);
    }

    let json = extract_json(text);
    if json.is_empty() {
        log::warn!("Empty analysis response, using fallback");
        return AnalysisResult::fallback(symbol, timeframe);
    }

    let parsed = match serde_json::from_str::<AnalysisResult>(json) {
        Ok(result) => Ok(result),
        Err(first) => {
            log::warn!("Initial analysis JSON parse failed ({}), attempting repair", first);
            serde_json::from_str::<AnalysisResult>(&repair_json(json))
        }
    };

    match parsed {
        Ok(result) if result.has_required_sections() => result,
        Ok(_) => {
            log::warn!("Analysis response is missing key sections, using fallback");
            AnalysisResult::fallback(symbol, timeframe)
        }
        Err(e) => {
            log::error!("Analysis JSON repair also failed: {}", e);
            AnalysisResult::fallback(symbol, timeframe)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"analisis_general": {"simbolo": "ETH/USDT", "temporalidad_principal_analisis": "1H"}, "escenarios_probables": []}"#;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("  ```\n{\"a\": 1}```  "), "{\"a\": 1}");
        assert_eq!(extract_json("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(extract_json(" {\"a\": 1} "), "{\"a\": 1}");
        // Unterminated fence is left alone
        assert_eq!(extract_json("```json\n{\"a\": 1}"), "```json\n{\"a\": 1}");
    }

    #[test]
    fn repair_closes_arrays_then_objects() {
        assert_eq!(repair_json(r#"{"a": [1, 2,"#), r#"{"a": [1, 2]}"#);
        assert_eq!(repair_json(r#"{"a": {"b": [{"c": 1}"#), r#"{"a": {"b": [{"c": 1}]}}"#);
        assert_eq!(repair_json("{}"), "{}");
    }

    #[test]
    fn valid_fenced_response_parses() {
        let text = format!("```json\n{}\n```", MINIMAL);
        let result = parse_analysis(&text, "ETH/USDT", "1H");
        assert!(!result.is_fallback());
        assert_eq!(result.symbol(), Some("ETH/USDT"));
    }

    #[test]
    fn truncated_response_is_repaired() {
        let truncated = r#"{"analisis_general": {"simbolo": "ETH/USDT"}, "escenarios_probables": [{"nombre_escenario": "Principal"},"#;
        let result = parse_analysis(truncated, "ETH/USDT", "1H");
        assert!(!result.is_fallback());
        assert_eq!(result.scenarios()[0].nombre_escenario, "Principal");
    }

    #[test]
    fn unusable_responses_fall_back() {
        for text in ["", "not json at all", r#"{"analisis_general": {"simbolo": "X"}}"#, r#"{"a": "unterminated"#] {
            let result = parse_analysis(text, "ETH/USDT", "1H");
            assert!(result.is_fallback(), "expected fallback for {:?}", text);
            assert_eq!(result.symbol(), Some("ETH/USDT"));
            assert_eq!(result.timeframe(), Some("1H"));
        }
    }

    #[test]
    fn odd_shaped_text_keeps_the_drawings() {
        let text = r#"{
            "analisis_general": {"simbolo": "ETH/USDT", "temporalidad_principal_analisis": "1H"},
            "puntos_clave_grafico": [{"tipo": "fvg_alcista", "zona": [2400, 2410], "label": "FVG 1H"}],
            "escenarios_probables": [{"nombre_escenario": "Principal", "trade_setup_asociado": {
                "tipo": "largo", "calificacion_setup": {"calificacion": "A", "confluencias": ["OB 4H", 0.618]}}}],
            "conclusion_recomendacion": {"advertencias_riesgos": ["volatilidad", "noticias"]}
        }"#;
        let result = parse_analysis(text, "ETH/USDT", "1H");
        assert!(!result.is_fallback());
        assert_eq!(result.puntos_clave_grafico[0].label, "FVG 1H");

        let rating = result.scenarios()[0]
            .trade_setup_asociado
            .as_ref()
            .and_then(|s| s.calificacion_setup.as_ref())
            .expect("rating");
        assert_eq!(rating.confluencias, vec!["OB 4H", "0.618"]);
    }
}
