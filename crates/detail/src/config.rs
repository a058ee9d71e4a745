use serde::Deserialize;

/// Endpoints and credentials for the detail panel's services.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub countries_base_url: String,
    pub weather_base_url: String,
    pub ai_base_url: String,
    pub ai_model: String,
    /// Without a key the summary shows the fallback text and no request is made.
    pub ai_api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            countries_base_url: "https://restcountries.com".to_string(),
            weather_base_url: "https://api.open-meteo.com".to_string(),
            ai_base_url: "https://generativelanguage.googleapis.com".to_string(),
            ai_model: "gemini-2.5-flash".to_string(),
            ai_api_key: None,
        }
    }
}
