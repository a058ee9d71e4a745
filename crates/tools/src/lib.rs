//! Offline helpers behind the `globe-tools` binary: inspecting a country
//! topology, probing the picking buffer, and running the detail lookups
//! outside the browser.

use std::cell::RefCell;

use detail::{
    DetailError, DetailPanel, DetailRequest, DetailSnapshot, HttpClient, RemoteServices,
    SelectedCountry, fetch_detail,
};
use formats::{CountryPath, TopologyError, country_paths_from_topojson, find_country};
use scene::picking::{PickingBuffer, PickingError};
use serde::Serialize;

#[derive(Debug)]
pub enum ToolError {
    Topology(TopologyError),
    Picking(PickingError),
    Uv { u: f64, v: f64 },
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Topology(e) => write!(f, "topology: {e}"),
            ToolError::Picking(e) => write!(f, "picking: {e}"),
            ToolError::Uv { u, v } => write!(f, "uv ({u}, {v}) outside [0,1]"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<TopologyError> for ToolError {
    fn from(e: TopologyError) -> Self {
        ToolError::Topology(e)
    }
}

impl From<PickingError> for ToolError {
    fn from(e: PickingError) -> Self {
        ToolError::Picking(e)
    }
}

/// One line of `inspect` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRow {
    pub index: usize,
    pub name: String,
    pub id: String,
    pub polygons: usize,
    pub rings: usize,
    /// `[lon, lat]` in degrees.
    pub centroid: [f64; 2],
}

impl CountryRow {
    fn new(index: usize, country: &CountryPath) -> Self {
        Self {
            index,
            name: country.name.clone(),
            id: country.id.clone(),
            polygons: country.polygons.len(),
            rings: country.rings().count(),
            centroid: [country.centroid.lon_deg, country.centroid.lat_deg],
        }
    }
}

pub fn country_table(topology: &str, object: &str) -> Result<Vec<CountryRow>, ToolError> {
    let paths = country_paths_from_topojson(topology, object)?;
    Ok(paths
        .iter()
        .enumerate()
        .map(|(i, c)| CountryRow::new(i, c))
        .collect())
}

/// Builds the picking buffer at `width x height` and reads the country under
/// texture coordinate `(u, v)`.
pub fn pick_uv(
    topology: &str,
    object: &str,
    uv: [f64; 2],
    width: u32,
    height: u32,
) -> Result<Option<CountryRow>, ToolError> {
    let [u, v] = uv;
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return Err(ToolError::Uv { u, v });
    }
    let paths = country_paths_from_topojson(topology, object)?;
    let buffer = PickingBuffer::build(&paths, width, height)?;
    Ok(buffer
        .lookup_uv(uv)
        .and_then(|i| paths.get(i).map(|c| CountryRow::new(i, c))))
}

/// Resolves a country name against an optional topology so the lookups get
/// the same code and centroid the globe would pass.
pub fn detail_request(
    name: &str,
    code: Option<&str>,
    paths: &[CountryPath],
) -> (SelectedCountry, DetailRequest) {
    let found = find_country(paths, name);
    let index = found.map_or(0, |(i, _)| i);
    let id = code
        .map(str::to_string)
        .or_else(|| found.map(|(_, c)| c.id.clone()))
        .unwrap_or_default();
    let display = found.map_or_else(|| name.trim().to_string(), |(_, c)| c.name.clone());
    let centroid = found.map(|(_, c)| c.centroid.into());
    (
        SelectedCountry {
            index,
            name: display.clone(),
            id: id.clone(),
        },
        DetailRequest {
            name: display,
            code: id,
            centroid,
        },
    )
}

/// Runs one full detail fetch against the services and returns the settled
/// panel.
pub async fn run_detail<H: HttpClient>(
    services: &RemoteServices<H>,
    selected: SelectedCountry,
    request: &DetailRequest,
) -> DetailSnapshot {
    let panel = RefCell::new(DetailPanel::new());
    let ticket = panel.borrow_mut().select(selected);
    fetch_detail(services, &panel, ticket, request).await;
    panel.into_inner().snapshot()
}

/// `detail::HttpClient` over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read(resp: reqwest::Response, url: &str) -> Result<String, DetailError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(DetailError::Status {
                url: redact_key(url),
                status: status.as_u16(),
            });
        }
        resp.text()
            .await
            .map_err(|e| DetailError::Transport(e.to_string()))
    }
}

impl HttpClient for ReqwestHttp {
    async fn get_text(&self, url: &str) -> Result<String, DetailError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DetailError::Transport(e.without_url().to_string()))?;
        Self::read(resp, url).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, DetailError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DetailError::Transport(e.without_url().to_string()))?;
        Self::read(resp, url).await
    }
}

/// Drops the `key=` query value so API keys never reach logs.
pub fn redact_key(url: &str) -> String {
    match url.find("key=") {
        Some(at) => {
            let start = at + "key=".len();
            let end = url[start..].find('&').map_or(url.len(), |e| start + e);
            format!("{}***{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detail::{Section, ServiceConfig};
    use pretty_assertions::assert_eq;

    // Two squares: Testland spans lon 30..50, lat -10..10.
    const WORLD: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[30,-10],[50,-10],[50,10],[30,10],[30,-10]],
            [[-50,-10],[-30,-10],[-30,10],[-50,10],[-50,-10]]
        ],
        "objects": {"countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "arcs": [[0]], "id": "TL", "properties": {"name": "Testland"}},
            {"type": "Polygon", "arcs": [[1]], "id": "OL", "properties": {"name": "Otherland"}}
        ]}}
    }"#;

    struct Offline;

    impl HttpClient for Offline {
        async fn get_text(&self, url: &str) -> Result<String, DetailError> {
            Err(DetailError::Transport(format!("offline: {url}")))
        }

        async fn post_json(&self, url: &str, _: &serde_json::Value) -> Result<String, DetailError> {
            Err(DetailError::Transport(format!("offline: {url}")))
        }
    }

    #[test]
    fn table_lists_countries_in_order() {
        let rows = country_table(WORLD, "countries").expect("table");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Testland");
        assert_eq!(rows[0].id, "TL");
        assert_eq!(rows[0].polygons, 1);
        assert!((rows[0].centroid[0] - 40.0).abs() < 1e-6);
        assert_eq!(rows[1].index, 1);
    }

    #[test]
    fn table_reports_missing_object() {
        assert!(matches!(
            country_table(WORLD, "land"),
            Err(ToolError::Topology(_))
        ));
    }

    #[test]
    fn pick_finds_country_at_its_centroid() {
        // lon 40 -> u = (40 + 180) / 360, lat 0 -> v = 0.5
        let u = 220.0 / 360.0;
        let hit = pick_uv(WORLD, "countries", [u, 0.5], 720, 360).expect("pick");
        assert_eq!(hit.map(|r| r.id), Some("TL".to_string()));
        let ocean = pick_uv(WORLD, "countries", [0.5, 0.5], 720, 360).expect("pick");
        assert_eq!(ocean, None);
    }

    #[test]
    fn pick_rejects_out_of_range_uv() {
        assert!(matches!(
            pick_uv(WORLD, "countries", [1.5, 0.5], 64, 32),
            Err(ToolError::Uv { .. })
        ));
    }

    #[test]
    fn detail_request_borrows_code_and_centroid_from_topology() {
        let paths = country_paths_from_topojson(WORLD, "countries").expect("paths");
        let (selected, request) = detail_request("testland", None, &paths);
        assert_eq!(selected.index, 0);
        assert_eq!(request.name, "Testland");
        assert_eq!(request.code, "TL");
        assert!(request.centroid.is_some());

        let (_, request) = detail_request("Nowhere", Some("NW"), &paths);
        assert_eq!(request.code, "NW");
        assert_eq!(request.centroid, None);
    }

    #[test]
    fn offline_detail_settles_every_section() {
        let services = RemoteServices::new(Offline, ServiceConfig::default());
        let (selected, request) = detail_request("Nowhere", None, &[]);
        let snap = pollster::block_on(run_detail(&services, selected, &request));
        assert_eq!(snap.country, Section::Unavailable);
        assert_eq!(snap.weather, Section::Unavailable);
        assert!(snap.summary.ready().is_some_and(|s| s.is_fallback()));
    }

    #[test]
    fn keys_are_redacted() {
        assert_eq!(
            redact_key("https://x/v1beta/models/m:generateContent?key=secret"),
            "https://x/v1beta/models/m:generateContent?key=***"
        );
        assert_eq!(redact_key("https://x/a?key=s&b=1"), "https://x/a?key=***&b=1");
        assert_eq!(redact_key("https://x/a"), "https://x/a");
    }
}
