//! Clients for the three detail-panel services: country metadata, current
//! weather and the AI summary. Each call is independent and best-effort;
//! the caller decides how a failure shows up in the panel.

use foundation::math::LonLat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};

use crate::config::ServiceConfig;
use crate::error::DetailError;
use crate::http::HttpClient;

pub const AI_FALLBACK_TEXT: &str = "AI summary is unavailable right now.";

/// Latitude/longitude in degrees as shown in the panel.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<LonLat> for Coordinates {
    fn from(p: LonLat) -> Self {
        Self::new(p.lat_deg, p.lon_deg)
    }
}

// --- country metadata ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryInfo {
    pub common_name: String,
    pub official_name: String,
    pub code: String,
    pub capital: Option<String>,
    pub capital_coords: Option<Coordinates>,
    /// Country reference point reported by the service.
    pub coords: Option<Coordinates>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<u64>,
    pub area_km2: Option<f64>,
    pub languages: Vec<String>,
    pub currencies: Vec<String>,
    pub flag_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    name: RawName,
    #[serde(default)]
    cca2: String,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default, rename = "capitalInfo")]
    capital_info: Option<RawCapitalInfo>,
    #[serde(default)]
    latlng: Vec<f64>,
    region: Option<String>,
    subregion: Option<String>,
    population: Option<u64>,
    area: Option<f64>,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    currencies: BTreeMap<String, RawCurrency>,
    flags: Option<RawFlags>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: String,
    #[serde(default)]
    official: String,
}

#[derive(Debug, Deserialize)]
struct RawCapitalInfo {
    #[serde(default)]
    latlng: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFlags {
    png: Option<String>,
    svg: Option<String>,
}

/// `[lat, lon]` as the service orders it.
fn coords_from_pair(pair: &[f64]) -> Option<Coordinates> {
    match pair {
        [lat, lon, ..] if lat.is_finite() && lon.is_finite() => Some(Coordinates::new(*lat, *lon)),
        _ => None,
    }
}

impl From<RawCountry> for CountryInfo {
    fn from(raw: RawCountry) -> Self {
        let currencies = raw
            .currencies
            .into_iter()
            .map(|(code, c)| match (c.name, c.symbol) {
                (Some(name), Some(symbol)) => format!("{name} ({symbol})"),
                (Some(name), None) => name,
                _ => code,
            })
            .collect();
        Self {
            official_name: if raw.name.official.is_empty() {
                raw.name.common.clone()
            } else {
                raw.name.official
            },
            common_name: raw.name.common,
            code: raw.cca2,
            capital: raw.capital.into_iter().next(),
            capital_coords: raw
                .capital_info
                .as_ref()
                .and_then(|info| coords_from_pair(&info.latlng)),
            coords: coords_from_pair(&raw.latlng),
            region: raw.region.filter(|r| !r.is_empty()),
            subregion: raw.subregion.filter(|r| !r.is_empty()),
            population: raw.population,
            area_km2: raw.area,
            languages: raw.languages.into_values().collect(),
            currencies,
            flag_url: raw.flags.and_then(|f| f.svg.or(f.png)),
        }
    }
}

/// Parses a metadata response. The service answers with an array; the
/// first entry wins.
pub fn parse_country_info(body: &str, query: &str) -> Result<CountryInfo, DetailError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let first = match value {
        serde_json::Value::Array(items) => items.into_iter().next(),
        obj @ serde_json::Value::Object(_) => Some(obj),
        _ => None,
    }
    .ok_or_else(|| DetailError::NotFound(query.to_string()))?;
    let raw: RawCountry = serde_json::from_value(first)?;
    Ok(raw.into())
}

// --- weather ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    /// WMO weather interpretation code.
    pub fn from_wmo(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 | 77 => Self::Snow,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::RainShowers => "Rain showers",
            Self::SnowShowers => "Snow showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub temperature_c: f64,
    pub windspeed_kmh: f64,
    pub wind_direction_deg: f64,
    pub weather_code: i32,
    pub condition: WeatherCondition,
    pub description: &'static str,
    pub is_day: bool,
    pub time: String,
    /// Where the reading was taken.
    pub at: Coordinates,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    #[serde(default)]
    winddirection: f64,
    weathercode: i32,
    #[serde(default)]
    is_day: i32,
    #[serde(default)]
    time: String,
}

pub fn parse_weather(body: &str, at: Coordinates) -> Result<Weather, DetailError> {
    let response: WeatherResponse = serde_json::from_str(body)?;
    let current = response
        .current_weather
        .ok_or_else(|| DetailError::Decode("missing current_weather".to_string()))?;
    let condition = WeatherCondition::from_wmo(current.weathercode);
    Ok(Weather {
        temperature_c: current.temperature,
        windspeed_kmh: current.windspeed,
        wind_direction_deg: current.winddirection,
        weather_code: current.weathercode,
        condition,
        description: condition.description(),
        is_day: current.is_day != 0,
        time: current.time,
        at,
    })
}

// --- AI summary ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiSummary {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl AiSummary {
    pub fn fallback() -> Self {
        Self {
            text: AI_FALLBACK_TEXT.to_string(),
            citations: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.text == AI_FALLBACK_TEXT && self.citations.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

pub fn summary_prompt(country: &str) -> String {
    format!(
        "Write exactly two sentences about the country {country}: one on its geography \
         and one on something notable happening there recently. Plain text only."
    )
}

/// Citations keep first-seen order; repeated URIs are dropped.
pub fn dedup_citations(citations: impl IntoIterator<Item = Citation>) -> Vec<Citation> {
    let mut seen = HashSet::new();
    citations
        .into_iter()
        .filter(|c| seen.insert(c.uri.clone()))
        .collect()
}

pub fn parse_ai_summary(body: &str) -> Result<AiSummary, DetailError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| DetailError::Decode("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(DetailError::Decode("empty summary".to_string()));
    }

    let chunks = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default();
    let citations = dedup_citations(chunks.into_iter().filter_map(|chunk| {
        let web = chunk.web?;
        let uri = web.uri.filter(|u| !u.is_empty())?;
        Some(Citation {
            title: web.title.unwrap_or_else(|| uri.clone()),
            uri,
        })
    }));

    Ok(AiSummary {
        text: text.to_string(),
        citations,
    })
}

// --- client ---

/// The three services behind one HTTP client.
#[derive(Debug, Clone)]
pub struct RemoteServices<H> {
    http: H,
    config: ServiceConfig,
}

impl<H: HttpClient> RemoteServices<H> {
    pub fn new(http: H, config: ServiceConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn country_by_name_url(&self, name: &str) -> String {
        format!(
            "{}/v3.1/name/{}?fullText=true",
            self.config.countries_base_url.trim_end_matches('/'),
            urlencoding::encode(name)
        )
    }

    pub fn country_by_code_url(&self, code: &str) -> String {
        format!(
            "{}/v3.1/alpha/{}",
            self.config.countries_base_url.trim_end_matches('/'),
            urlencoding::encode(code)
        )
    }

    pub fn weather_url(&self, at: Coordinates) -> String {
        format!(
            "{}/v1/forecast?latitude={:.4}&longitude={:.4}&current_weather=true",
            self.config.weather_base_url.trim_end_matches('/'),
            at.lat,
            at.lon
        )
    }

    pub fn ai_url(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.ai_base_url.trim_end_matches('/'),
            self.config.ai_model,
            urlencoding::encode(key)
        )
    }

    /// Name lookup first; on any failure falls back to the code lookup
    /// when a code is known.
    pub async fn country_info(&self, name: &str, code: &str) -> Result<CountryInfo, DetailError> {
        let by_name = match self.http.get_text(&self.country_by_name_url(name)).await {
            Ok(body) => parse_country_info(&body, name),
            Err(err) => Err(err),
        };
        match by_name {
            Ok(info) => Ok(info),
            Err(err) if code.trim().is_empty() => Err(err),
            Err(err) => {
                tracing::debug!(name, code, error = %err, "name lookup failed, trying code");
                let body = self.http.get_text(&self.country_by_code_url(code)).await?;
                parse_country_info(&body, code)
            }
        }
    }

    pub async fn weather(&self, at: Coordinates) -> Result<Weather, DetailError> {
        let body = self.http.get_text(&self.weather_url(at)).await?;
        parse_weather(&body, at)
    }

    pub async fn ai_summary(&self, country: &str) -> Result<AiSummary, DetailError> {
        let key = self
            .config
            .ai_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(DetailError::MissingApiKey)?;
        let body = json!({
            "contents": [{ "parts": [{ "text": summary_prompt(country) }] }],
            "tools": [{ "google_search": {} }],
        });
        let text = self.http.post_json(&self.ai_url(key), &body).await?;
        parse_ai_summary(&text)
    }
}
