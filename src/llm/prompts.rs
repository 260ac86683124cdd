//! Prompt assembly for the analysis request and the chat assistant.

use crate::{
    analysis::MovingAverageConfig,
    domain::DataSource,
    models::{AnalysisResult, Theme},
    utils::{format_price, format_volume, now_rfc3339},
};

const ANALYSIS_CORE: &str = include_str!("prompts/analysis_core.txt");
const MARKET_CONTEXT: &str = include_str!("prompts/market_context.txt");
const JSON_STRUCTURE: &str = include_str!("prompts/json_structure.txt");
const CHAT_SYSTEM: &str = include_str!("prompts/chat_system.txt");

const TIMESTAMP_PLACEHOLDER: &str = "AUTO_GENERATED_TIMESTAMP_ISO8601";

/// The price as the model sees it: whole numbers lose the `.0`.
fn price_literal(price: f64) -> String {
    if price.fract() == 0.0 && price.is_finite() {
        format!("{}", price as i64)
    } else {
        price.to_string()
    }
}

/// Complete analysis prompt. `symbol` is already in display form and
/// `timeframe` uppercased, as the answer is matched against both later.
pub fn full_analysis_prompt(symbol: &str, timeframe: &str, price: f64, volume: Option<f64>) -> String {
    let price = price_literal(price);
    let fill = |template: &str| {
        template
            .replace("{{SYMBOL}}", symbol)
            .replace("{{TIMEFRAME}}", timeframe)
            .replace("{{CURRENT_PRICE}}", &price)
    };

    let volume_sentence = match volume {
        Some(v) => format!("El volumen de la última vela fue {}", format_volume(v)),
        None => "Información de volumen no disponible para la última vela.".to_string(),
    };
    let volume_value = volume.map(format_volume).unwrap_or_else(|| "N/A".to_string());

    let core = fill(ANALYSIS_CORE);
    let context = fill(MARKET_CONTEXT).replace("{{VOLUME_SENTENCE}}", &volume_sentence);
    let structure = fill(JSON_STRUCTURE)
        .replace("{VOLUME_VALUE}", &volume_value)
        .replace(TIMESTAMP_PLACEHOLDER, &now_rfc3339());

    format!("{}\n\n{}\n\n{}", core.trim_end(), context.trim_end(), structure.trim_end())
}

pub fn chat_system_prompt(symbol: &str, timeframe: &str) -> String {
    CHAT_SYSTEM
        .replace("{{SYMBOL}}", symbol)
        .replace("{{TIMEFRAME}}", &timeframe.to_uppercase())
}

/// What the user is looking at when they ask a question.
#[derive(Debug, Clone)]
pub struct ChartContext<'a> {
    /// Display form, e.g. `ETH/USDT`
    pub symbol: &'a str,
    pub timeframe: &'a str,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub source: DataSource,
    pub moving_averages: &'a [MovingAverageConfig],
    pub theme: Theme,
    pub show_ai_drawings: bool,
}

impl ChartContext<'_> {
    fn block(&self) -> String {
        // A zero reading means "not loaded yet" and prints as N/A
        let price = self
            .price
            .filter(|p| *p != 0.0)
            .map(format_price)
            .unwrap_or_else(|| "N/A".to_string());
        let volume = self
            .volume
            .filter(|v| *v != 0.0)
            .map(format_volume)
            .unwrap_or_else(|| "N/A".to_string());
        let mas = self
            .moving_averages
            .iter()
            .filter(|ma| ma.visible)
            .map(|ma| format!("{}{}", ma.kind, ma.period))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "--- CONTEXTO DEL GRÁFICO ACTUAL ---\n\
             Símbolo: {}\n\
             Temporalidad: {}\n\
             Precio Actual: {}\n\
             Volumen Última Vela: {}\n\
             Exchange: {}\n\
             \n\
             El usuario está viendo un gráfico de trading en tiempo real con las siguientes configuraciones:\n\
             - Medias móviles activas: {}\n\
             - Tema: {}\n\
             - Dibujos de análisis IA: {}\n\
             --- FIN DEL CONTEXTO DEL GRÁFICO ---\n",
            self.symbol,
            self.timeframe.to_uppercase(),
            price,
            volume,
            self.source.to_string().to_uppercase(),
            mas,
            self.theme.to_string().to_lowercase(),
            if self.show_ai_drawings { "Visibles" } else { "Ocultos" },
        )
    }

    /// The analysis only applies when it was made for this exact symbol and timeframe.
    fn matches(&self, analysis: &AnalysisResult) -> bool {
        analysis.symbol() == Some(self.symbol)
            && analysis.timeframe() == Some(self.timeframe.to_uppercase().as_str())
    }
}

/// The text actually sent to the model for one user question.
pub fn chat_context(ctx: &ChartContext, analysis: Option<&AnalysisResult>, question: &str) -> String {
    let question = question.trim();
    let chart = ctx.block();

    match analysis.filter(|a| ctx.matches(a)) {
        Some(analysis) => {
            let json = serde_json::to_string_pretty(analysis).unwrap_or_default();
            format!(
                "--- INICIO DEL CONTEXTO DE ANÁLISIS ---\n{}\n\nANÁLISIS TÉCNICO PREVIO DISPONIBLE:\n{}\n\
                 --- FIN DEL CONTEXTO DE ANÁLISIS ---\n\nPregunta del usuario: {}",
                chart, json, question
            )
        }
        None => format!("{}\n\nPregunta del usuario: {}", chart, question),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneralAnalysis;

    fn ctx(mas: &[MovingAverageConfig]) -> ChartContext<'_> {
        ChartContext {
            symbol: "ETH/USDT",
            timeframe: "1h",
            price: Some(2650.456),
            volume: Some(1234.5),
            source: DataSource::Bingx,
            moving_averages: mas,
            theme: Theme::Dark,
            show_ai_drawings: false,
        }
    }

    fn analysis_for(symbol: &str, tf: &str) -> AnalysisResult {
        AnalysisResult {
            analisis_general: Some(GeneralAnalysis {
                simbolo: symbol.to_string(),
                temporalidad_principal_analisis: tf.to_string(),
                ..Default::default()
            }),
            escenarios_probables: Some(Vec::new()),
            ..Default::default()
        }
    }

    #[test]
    fn analysis_prompt_is_fully_substituted() {
        let p = full_analysis_prompt("ETH/USDT", "1H", 2650.0, Some(1234567.0));
        assert!(!p.contains("{{"));
        assert!(!p.contains(TIMESTAMP_PLACEHOLDER));
        assert!(!p.contains("{VOLUME_VALUE}"));
        assert!(p.contains("\"simbolo\": \"ETH/USDT\""));
        assert!(p.contains("\"temporalidad_principal_analisis\": \"1H\""));
        assert!(p.contains("[2650, 2670.0"));
        assert!(p.contains("El volumen de la última vela fue 1,234,567"));

        let no_volume = full_analysis_prompt("ETH/USDT", "1H", 0.5, None);
        assert!(no_volume.contains("no disponible para la última vela"));
        assert!(no_volume.contains("Volumen de la última vela: N/A"));
    }

    #[test]
    fn chat_system_uses_uppercase_timeframe() {
        let p = chat_system_prompt("BTC/USDT", "4h");
        assert!(p.contains("BTC/USDT en 4H"));
    }

    #[test]
    fn context_block_lists_visible_averages() {
        let mut mas = MovingAverageConfig::defaults();
        mas[1].visible = false;
        let text = chat_context(&ctx(&mas), None, "  ¿Dónde entro?  ");

        assert!(text.contains("Símbolo: ETH/USDT"));
        assert!(text.contains("Temporalidad: 1H"));
        assert!(text.contains("Precio Actual: $2650.46"));
        assert!(text.contains("Volumen Última Vela: 1,234.5"));
        assert!(text.contains("Exchange: BINGX"));
        assert!(text.contains("- Tema: dark"));
        assert!(text.contains("Dibujos de análisis IA: Ocultos"));
        assert!(!text.contains("EMA20"));
        assert!(text.ends_with("Pregunta del usuario: ¿Dónde entro?"));
        assert!(!text.contains("ANÁLISIS TÉCNICO PREVIO"));
    }

    #[test]
    fn analysis_attached_only_when_it_matches() {
        let mas = MovingAverageConfig::defaults();
        let matching = analysis_for("ETH/USDT", "1H");
        let text = chat_context(&ctx(&mas), Some(&matching), "q");
        assert!(text.starts_with("--- INICIO DEL CONTEXTO DE ANÁLISIS ---"));
        assert!(text.contains("\"simbolo\": \"ETH/USDT\""));

        for other in [analysis_for("ETHUSDT", "1H"), analysis_for("ETH/USDT", "4H")] {
            let text = chat_context(&ctx(&mas), Some(&other), "q");
            assert!(!text.contains("ANÁLISIS TÉCNICO PREVIO"));
        }
    }

    #[test]
    fn missing_price_reads_na() {
        let mas = Vec::new();
        let mut c = ctx(&mas);
        c.price = None;
        c.volume = Some(0.0);
        let text = chat_context(&c, None, "q");
        assert!(text.contains("Precio Actual: N/A"));
        assert!(text.contains("Volumen Última Vela: N/A"));
    }
}
