use detail::{DetailError, HttpClient};
use gloo_net::http::{Request, Response};

/// Browser `fetch` through gloo-net.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooHttp;

async fn text_of(url: &str, resp: Response) -> Result<String, DetailError> {
    if !resp.ok() {
        return Err(DetailError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    resp.text()
        .await
        .map_err(|e| DetailError::Transport(e.to_string()))
}

impl HttpClient for GlooHttp {
    async fn get_text(&self, url: &str) -> Result<String, DetailError> {
        let resp = Request::get(url)
            .send()
            .await
            .map_err(|e| DetailError::Transport(e.to_string()))?;
        text_of(url, resp).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, DetailError> {
        let resp = Request::post(url)
            .json(body)
            .map_err(|e| DetailError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| DetailError::Transport(e.to_string()))?;
        text_of(url, resp).await
    }
}

/// Plain GET for assets such as the topology file.
pub async fn fetch_text(url: &str) -> Result<String, DetailError> {
    GlooHttp.get_text(url).await
}
