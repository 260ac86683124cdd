//! Typed view of the LLM's chart analysis.
//!
//! The payload is produced by a model with no schema enforcement, so every field
//! goes through a lenient reader: prices may arrive as numbers or numeric strings,
//! text may arrive as lists or objects, and a malformed list item or section is
//! dropped on its own instead of failing the whole reply. Keys keep the Spanish
//! names the prompt asks for.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::analysis::fibonacci::FibImpulse;
use crate::utils::now_rfc3339;

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_f64))
}

fn lenient_i64<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_f64).filter(|f| f.is_finite()).map(|f| f as i64))
}

fn lenient_pair<'de, D>(d: D) -> Result<Option<[f64; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) if items.len() >= 2 => {
            match (value_to_f64(&items[0]), value_to_f64(&items[1])) {
                (Some(lo), Some(hi)) => Some([lo, hi]),
                _ => None,
            }
        }
        _ => None,
    })
}

fn lenient_prices<'de, D>(d: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_f64).collect(),
        _ => Vec::new(),
    })
}

/// Display text out of whatever shape the model used. Lists are joined with ", ",
/// objects become `key: value` pairs, `null` and empty text read as nothing.
fn value_to_text(v: &Value) -> Option<String> {
    let text = match v {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().filter_map(value_to_text).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| value_to_text(v).map(|t| format!("{}: {}", k, t)))
            .collect::<Vec<_>>()
            .join(", "),
    };
    Some(text).filter(|t| !t.is_empty())
}

/// Scalars the model sometimes sends as numbers (`"probabilidad": 0.6`) end up as text.
fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_text).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(value_to_text))
}

/// A bare string counts as a one-item list; elements of any scalar type become text.
fn lenient_strings<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

/// Keeps the elements that parse and drops the rest. A lone object counts as a one-item list.
fn parse_list<T: DeserializeOwned>(v: Value) -> Vec<T> {
    match v {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        item @ Value::Object(_) => serde_json::from_value(item).ok().into_iter().collect(),
        _ => Vec::new(),
    }
}

fn lenient_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(d)?.map(parse_list).unwrap_or_default())
}

/// Like `lenient_list`, but a missing or `null` list stays `None`.
fn lenient_opt_list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(d)?.map(parse_list))
}

/// A section of the wrong shape reads as absent instead of failing the whole payload.
fn lenient_section<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_section_or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_section(d)?.unwrap_or_default())
}

fn lenient_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "si" | "sí" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// One drawable item: a level (`nivel`), a zone (`zona`), or both, plus an optional bar marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPoint {
    #[serde(deserialize_with = "lenient_string")]
    pub tipo: String,
    #[serde(deserialize_with = "lenient_pair", skip_serializing_if = "Option::is_none")]
    pub zona: Option<[f64; 2]>,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub nivel: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub temporalidad: Option<String>,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub mitigado: Option<bool>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub importancia: Option<String>,

    /// Unix seconds of the bar the marker sits on
    #[serde(deserialize_with = "lenient_i64", skip_serializing_if = "Option::is_none")]
    pub marker_time: Option<i64>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub marker_position: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub marker_shape: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub marker_text: Option<String>,
}

impl AnalysisPoint {
    pub fn timeframe(&self) -> &str {
        self.temporalidad.as_deref().unwrap_or("")
    }

    pub fn importance(&self) -> &str {
        self.importancia.as_deref().unwrap_or("")
    }

    /// Zone as `(low, high)` whatever order the model wrote it in.
    pub fn zone_bounds(&self) -> Option<(f64, f64)> {
        self.zona.map(|[a, b]| if a <= b { (a, b) } else { (b, a) })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketStructureSummary {
    #[serde(deserialize_with = "lenient_opt_string", rename = "htf_1W", skip_serializing_if = "Option::is_none")]
    pub htf_1w: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", rename = "htf_1D", skip_serializing_if = "Option::is_none")]
    pub htf_1d: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", rename = "mtf_4H", skip_serializing_if = "Option::is_none")]
    pub mtf_4h: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", rename = "ltf_1H", skip_serializing_if = "Option::is_none")]
    pub ltf_1h: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", rename = "ltf_15M", skip_serializing_if = "Option::is_none")]
    pub ltf_15m: Option<String>,
}

impl MarketStructureSummary {
    /// `(timeframe, summary)` rows, highest timeframe first.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        [
            ("1W", &self.htf_1w),
            ("1D", &self.htf_1d),
            ("4H", &self.mtf_4h),
            ("1H", &self.ltf_1h),
            ("15M", &self.ltf_15m),
        ]
        .into_iter()
        .filter_map(|(tf, s)| s.as_deref().map(|s| (tf, s)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralAnalysis {
    #[serde(deserialize_with = "lenient_string")]
    pub simbolo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub temporalidad_principal_analisis: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fecha_analisis: String,
    #[serde(deserialize_with = "lenient_section_or_default")]
    pub estructura_mercado_resumen: MarketStructureSummary,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub fase_wyckoff_actual: Option<String>,
    /// `alcista` | `bajista` | `lateral` | `indefinido`
    #[serde(deserialize_with = "lenient_string")]
    pub sesgo_direccional_general: String,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub comentario_volumen: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub interpretacion_volumen_detallada: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub comentario_funding_rate_oi: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextualAnalysis {
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub correlacion_mercado: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub liquidez_sesiones: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub comentario_funding_rate_oi: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportantLiquidity {
    #[serde(deserialize_with = "lenient_list")]
    pub buy_side: Vec<AnalysisPoint>,
    #[serde(deserialize_with = "lenient_list")]
    pub sell_side: Vec<AnalysisPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalZones {
    #[serde(deserialize_with = "lenient_list")]
    pub oferta_clave: Vec<AnalysisPoint>,
    #[serde(deserialize_with = "lenient_list")]
    pub demanda_clave: Vec<AnalysisPoint>,
    #[serde(deserialize_with = "lenient_list")]
    pub fvg_importantes: Vec<AnalysisPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciImpulseAnalysis {
    #[serde(deserialize_with = "lenient_string")]
    pub temporalidad_analizada: String,
    #[serde(deserialize_with = "lenient_string")]
    pub descripcion_impulso: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub precio_inicio_impulso: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub precio_fin_impulso: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub precio_fin_retroceso: Option<f64>,
}

impl FibonacciImpulseAnalysis {
    /// `None` when either anchor price is missing.
    pub fn impulse(&self) -> Option<FibImpulse> {
        Some(FibImpulse {
            timeframe: self.temporalidad_analizada.clone(),
            description: self.descripcion_impulso.clone(),
            start: self.precio_inicio_impulso?,
            end: self.precio_fin_impulso?,
            retracement_end: self.precio_fin_retroceso,
        })
    }
}

/// A precomputed level, as some responses include them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciLevelPayload {
    #[serde(deserialize_with = "lenient_f64")]
    pub level: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciAnalysis {
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub htf: Option<FibonacciImpulseAnalysis>,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub ltf: Option<FibonacciImpulseAnalysis>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub niveles_retroceso: Vec<FibonacciLevelPayload>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub niveles_extension: Vec<FibonacciLevelPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupRating {
    /// `A` | `B` | `C`
    #[serde(deserialize_with = "lenient_string")]
    pub calificacion: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub confluencias: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeSetup {
    /// `largo` | `corto` | `ninguno`
    #[serde(deserialize_with = "lenient_string")]
    pub tipo: String,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub estilo_trade: Option<String>,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub calificacion_setup: Option<SetupRating>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub descripcion_entrada: Option<String>,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub punto_entrada_ideal: Option<f64>,
    #[serde(deserialize_with = "lenient_pair", skip_serializing_if = "Option::is_none")]
    pub zona_entrada: Option<[f64; 2]>,
    #[serde(deserialize_with = "lenient_f64")]
    pub stop_loss: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub gestion_stop_loss: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub take_profit_1: Option<f64>,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub take_profit_2: Option<f64>,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub take_profit_3: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub gestion_take_profit: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub razon_fundamental: String,
    #[serde(deserialize_with = "lenient_strings", skip_serializing_if = "Vec::is_empty")]
    pub confirmaciones_adicionales: Vec<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub ratio_riesgo_beneficio: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub calificacion_confianza: Option<String>,
}

impl TradeSetup {
    fn unavailable() -> Self {
        TradeSetup {
            tipo: "ninguno".to_string(),
            descripcion_entrada: Some("No disponible".to_string()),
            stop_loss: Some(0.0),
            take_profit_1: Some(0.0),
            calificacion_confianza: Some("baja".to_string()),
            razon_fundamental: "Error técnico".to_string(),
            ..Default::default()
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self.tipo.trim().to_lowercase().as_str(), "largo" | "corto")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioAnalysis {
    #[serde(deserialize_with = "lenient_string")]
    pub nombre_escenario: String,
    #[serde(deserialize_with = "lenient_string")]
    pub probabilidad: String,
    #[serde(deserialize_with = "lenient_string")]
    pub descripcion_detallada: String,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub trade_setup_asociado: Option<TradeSetup>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub niveles_clave_de_invalidacion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conclusion {
    #[serde(deserialize_with = "lenient_string")]
    pub resumen_ejecutivo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub proximo_movimiento_esperado: String,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub mejor_oportunidad_actual: Option<TradeSetup>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub advertencias_riesgos: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub oportunidades_reentrada_detectadas: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub consideraciones_salida_trade: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub senales_confluencia_avanzada: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceProjection {
    #[serde(deserialize_with = "lenient_prices", skip_serializing_if = "Vec::is_empty")]
    pub camino_probable_1: Vec<f64>,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub descripcion_camino_1: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "lenient_section")]
    pub analisis_general: Option<GeneralAnalysis>,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub analisis_contextual: Option<ContextualAnalysis>,
    #[serde(deserialize_with = "lenient_list")]
    pub puntos_clave_grafico: Vec<AnalysisPoint>,
    #[serde(deserialize_with = "lenient_section_or_default")]
    pub liquidez_importante: ImportantLiquidity,
    #[serde(deserialize_with = "lenient_section_or_default")]
    pub zonas_criticas_oferta_demanda: CriticalZones,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub analisis_fibonacci: Option<FibonacciAnalysis>,
    #[serde(deserialize_with = "lenient_opt_list")]
    pub escenarios_probables: Option<Vec<ScenarioAnalysis>>,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub conclusion_recomendacion: Option<Conclusion>,
    #[serde(deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub proyeccion_precio_visual: Option<PriceProjection>,
}

impl AnalysisResult {
    /// A result carries the two sections every panel relies on.
    pub fn has_required_sections(&self) -> bool {
        self.analisis_general.is_some() && self.escenarios_probables.is_some()
    }

    /// The "analysis unavailable" result shown when the model reply is unusable.
    pub fn fallback(symbol: &str, timeframe: &str) -> Self {
        AnalysisResult {
            analisis_general: Some(GeneralAnalysis {
                simbolo: symbol.to_string(),
                temporalidad_principal_analisis: timeframe.to_string(),
                fecha_analisis: now_rfc3339(),
                estructura_mercado_resumen: MarketStructureSummary {
                    ltf_1h: Some("Análisis no disponible debido a error de parsing".to_string()),
                    ..Default::default()
                },
                sesgo_direccional_general: "indefinido".to_string(),
                interpretacion_volumen_detallada: Some(
                    "No se pudo procesar el análisis de volumen debido a un error técnico.".to_string(),
                ),
                ..Default::default()
            }),
            escenarios_probables: Some(vec![ScenarioAnalysis {
                nombre_escenario: "Análisis de Fallback".to_string(),
                probabilidad: "baja".to_string(),
                descripcion_detallada:
                    "No se pudo completar el análisis debido a un error técnico. Por favor, intenta de nuevo."
                        .to_string(),
                trade_setup_asociado: Some(TradeSetup::unavailable()),
                niveles_clave_de_invalidacion: None,
            }]),
            conclusion_recomendacion: Some(Conclusion {
                resumen_ejecutivo: "El análisis no pudo completarse debido a un error técnico. \
                                    Recomendamos intentar el análisis nuevamente."
                    .to_string(),
                proximo_movimiento_esperado: "Indeterminado".to_string(),
                mejor_oportunidad_actual: Some(TradeSetup::unavailable()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.scenarios()
            .first()
            .is_some_and(|s| s.nombre_escenario == "Análisis de Fallback")
    }

    pub fn symbol(&self) -> Option<&str> {
        self.analisis_general.as_ref().map(|g| g.simbolo.as_str())
    }

    pub fn timeframe(&self) -> Option<&str> {
        self.analisis_general
            .as_ref()
            .map(|g| g.temporalidad_principal_analisis.as_str())
    }

    pub fn scenarios(&self) -> &[ScenarioAnalysis] {
        self.escenarios_probables.as_deref().unwrap_or(&[])
    }

    /// Every point across all sections, key points first.
    pub fn all_points(&self) -> impl Iterator<Item = &AnalysisPoint> {
        self.puntos_clave_grafico
            .iter()
            .chain(&self.liquidez_importante.buy_side)
            .chain(&self.liquidez_importante.sell_side)
            .chain(&self.zonas_criticas_oferta_demanda.oferta_clave)
            .chain(&self.zonas_criticas_oferta_demanda.demanda_clave)
            .chain(&self.zonas_criticas_oferta_demanda.fvg_importantes)
    }

    pub fn htf_impulse(&self) -> Option<FibImpulse> {
        self.analisis_fibonacci.as_ref()?.htf.as_ref()?.impulse()
    }

    pub fn ltf_impulse(&self) -> Option<FibImpulse> {
        self.analisis_fibonacci.as_ref()?.ltf.as_ref()?.impulse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "analisis_general": {
            "simbolo": "ETHUSDT",
            "temporalidad_principal_analisis": "1h",
            "fecha_analisis": "2024-05-01T10:00:00Z",
            "estructura_mercado_resumen": { "htf_1D": "Bajista", "ltf_1H": "Rango" },
            "sesgo_direccional_general": "bajista"
        },
        "puntos_clave_grafico": [
            { "tipo": "poi_oferta", "zona": ["2680", 2650.0], "label": "Bearish OB 4H", "temporalidad": "4H", "importancia": "alta" },
            { "tipo": "ai_w_signal_bullish", "nivel": 2425, "label": "W Bullish", "marker_time": 1678886400, "marker_text": "W" }
        ],
        "liquidez_importante": { "buy_side": [ { "tipo": "liquidez_compradora", "nivel": "2,800.5", "label": "EQH" } ], "sell_side": null },
        "zonas_criticas_oferta_demanda": { "fvg_importantes": [ { "tipo": "fvg_alcista", "zona": [1, "x"], "label": "FVG" } ] },
        "analisis_fibonacci": {
            "htf": { "temporalidad_analizada": "4H", "descripcion_impulso": "down", "precio_inicio_impulso": 3200, "precio_fin_impulso": "2800", "precio_fin_retroceso": 2950 },
            "ltf": { "temporalidad_analizada": "1h", "precio_inicio_impulso": 2850, "precio_fin_impulso": null }
        },
        "escenarios_probables": [
            { "nombre_escenario": "Principal", "probabilidad": "alta", "descripcion_detallada": "...",
              "trade_setup_asociado": { "tipo": "corto", "stop_loss": 3210, "take_profit_1": "2950" } }
        ],
        "conclusion_recomendacion": { "resumen_ejecutivo": "x", "proximo_movimiento_esperado": "y", "mejor_oportunidad_actual": null },
        "proyeccion_precio_visual": { "camino_probable_1": [2700, "2600", null] }
    }"#;

    #[test]
    fn parses_loose_payload() {
        let result: AnalysisResult = serde_json::from_str(SAMPLE).expect("sample parses");
        assert!(result.has_required_sections());
        assert_eq!(result.symbol(), Some("ETHUSDT"));

        let ob = &result.puntos_clave_grafico[0];
        assert_eq!(ob.zona, Some([2680.0, 2650.0]));
        assert_eq!(ob.zone_bounds(), Some((2650.0, 2680.0)));
        assert_eq!(ob.importance(), "alta");

        assert_eq!(result.liquidez_importante.buy_side[0].nivel, Some(2800.5));
        assert!(result.liquidez_importante.sell_side.is_empty());
        assert_eq!(result.zonas_criticas_oferta_demanda.fvg_importantes[0].zona, None);

        let setup = result.scenarios()[0].trade_setup_asociado.as_ref().expect("setup");
        assert_eq!(setup.take_profit_1, Some(2950.0));
        assert!(setup.is_actionable());

        let projection = result.proyeccion_precio_visual.as_ref().expect("projection");
        assert_eq!(projection.camino_probable_1, vec![2700.0, 2600.0]);
    }

    #[test]
    fn all_points_walks_every_section() {
        let result: AnalysisResult = serde_json::from_str(SAMPLE).expect("sample parses");
        let tipos: Vec<&str> = result.all_points().map(|p| p.tipo.as_str()).collect();
        assert_eq!(tipos, vec!["poi_oferta", "ai_w_signal_bullish", "liquidez_compradora", "fvg_alcista"]);
    }

    #[test]
    fn impulses_need_both_anchors() {
        let result: AnalysisResult = serde_json::from_str(SAMPLE).expect("sample parses");
        let htf = result.htf_impulse().expect("htf impulse");
        assert_eq!((htf.start, htf.end, htf.retracement_end), (3200.0, 2800.0, Some(2950.0)));
        assert!(result.ltf_impulse().is_none());
    }

    #[test]
    fn fallback_is_complete() {
        let fb = AnalysisResult::fallback("BTC-USDT", "4h");
        assert!(fb.has_required_sections());
        assert!(fb.is_fallback());
        assert_eq!(fb.timeframe(), Some("4h"));
        assert_eq!(fb.all_points().count(), 0);
    }

    #[test]
    fn missing_sections_are_detected() {
        let partial: AnalysisResult =
            serde_json::from_str(r#"{ "analisis_general": { "simbolo": "X" }, "escenarios_probables": null }"#)
                .expect("partial parses");
        assert!(!partial.has_required_sections());
    }

    #[test]
    fn text_fields_accept_lists_and_numbers() {
        let json = r#"{
            "analisis_general": { "simbolo": "BTCUSDT", "fase_wyckoff_actual": ["Fase C", "spring"], "comentario_volumen": 1.5 },
            "escenarios_probables": [
                { "nombre_escenario": "A", "trade_setup_asociado": {
                    "tipo": "largo", "estilo_trade": ["swing"], "descripcion_entrada": { "zona": "OB 4H" },
                    "confirmaciones_adicionales": "RSI divergence" } }
            ],
            "conclusion_recomendacion": { "advertencias_riesgos": ["volatilidad", "noticias"] }
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).expect("loose text parses");
        let general = result.analisis_general.as_ref().expect("general");
        assert_eq!(general.fase_wyckoff_actual.as_deref(), Some("Fase C, spring"));
        assert_eq!(general.comentario_volumen.as_deref(), Some("1.5"));

        let setup = result.scenarios()[0].trade_setup_asociado.as_ref().expect("setup");
        assert_eq!(setup.estilo_trade.as_deref(), Some("swing"));
        assert_eq!(setup.descripcion_entrada.as_deref(), Some("zona: OB 4H"));
        assert_eq!(setup.confirmaciones_adicionales, vec!["RSI divergence"]);

        let conclusion = result.conclusion_recomendacion.as_ref().expect("conclusion");
        assert_eq!(conclusion.advertencias_riesgos.as_deref(), Some("volatilidad, noticias"));
    }

    #[test]
    fn string_lists_keep_every_scalar() {
        let json = r#"{ "calificacion": "A", "confluencias": ["OB 4H", 0.618, null, "", true] }"#;
        let rating: SetupRating = serde_json::from_str(json).expect("rating parses");
        assert_eq!(rating.confluencias, vec!["OB 4H", "0.618", "true"]);
    }

    #[test]
    fn malformed_items_and_sections_are_dropped_alone() {
        let json = r#"{
            "analisis_general": { "simbolo": "X", "estructura_mercado_resumen": "alcista" },
            "puntos_clave_grafico": [ "not a point", { "tipo": "fvg", "nivel": 10, "label": "kept" } ],
            "liquidez_importante": { "buy_side": { "tipo": "bsl", "nivel": 12, "label": "single" } },
            "analisis_fibonacci": "n/a",
            "escenarios_probables": [ 42, { "nombre_escenario": "B" } ]
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).expect("mixed payload parses");
        assert!(result.has_required_sections());
        assert_eq!(
            result.analisis_general.as_ref().map(|g| g.estructura_mercado_resumen.clone()),
            Some(MarketStructureSummary::default())
        );
        let labels: Vec<&str> = result.all_points().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["kept", "single"]);
        assert!(result.analisis_fibonacci.is_none());
        assert_eq!(result.scenarios().len(), 1);
        assert_eq!(result.scenarios()[0].nombre_escenario, "B");
    }
}
