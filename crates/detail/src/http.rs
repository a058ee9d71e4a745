use crate::error::DetailError;

/// Minimal async HTTP surface the detail services need.
///
/// Implemented over `gloo-net` in the browser and `reqwest` in the CLI.
/// Non-2xx responses must come back as [`DetailError::Status`].
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, DetailError>;
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, DetailError>;
}
