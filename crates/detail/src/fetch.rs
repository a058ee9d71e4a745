//! The per-selection fetch: metadata then weather, alongside the AI summary.

use std::cell::RefCell;

use futures_util::future::join;

use crate::http::HttpClient;
use crate::panel::{DetailPanel, Ticket};
use crate::services::{Coordinates, CountryInfo, RemoteServices};

/// What the globe knows about the clicked country.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRequest {
    pub name: String,
    /// Country code from the geometry id; may be empty.
    pub code: String,
    /// Geometric centroid of the country outline.
    pub centroid: Option<Coordinates>,
}

/// Capital first, then the service's reference point, then our own centroid.
pub fn weather_coordinates(
    info: Option<&CountryInfo>,
    centroid: Option<Coordinates>,
) -> Option<Coordinates> {
    info.and_then(|i| i.capital_coords)
        .or_else(|| info.and_then(|i| i.coords))
        .or(centroid)
}

/// Runs every lookup for `ticket` and applies results to `panel` as they
/// land. Nothing is applied once the ticket is stale, and the weather call
/// is skipped entirely if the selection changed while metadata was loading.
///
/// The panel is only borrowed between awaits.
pub async fn fetch_detail<H: HttpClient>(
    services: &RemoteServices<H>,
    panel: &RefCell<DetailPanel>,
    ticket: Ticket,
    request: &DetailRequest,
) {
    let metadata_then_weather = async {
        let info = match services.country_info(&request.name, &request.code).await {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!(name = %request.name, error = %err, "country lookup failed");
                None
            }
        };
        let at = weather_coordinates(info.as_ref(), request.centroid);
        if !panel.borrow_mut().apply_country(ticket, info) {
            tracing::debug!(ticket = ticket.0, "selection changed, skipping weather");
            return;
        }

        let weather = match at {
            Some(at) => match services.weather(at).await {
                Ok(weather) => Some(weather),
                Err(err) => {
                    tracing::warn!(name = %request.name, error = %err, "weather lookup failed");
                    None
                }
            },
            None => {
                tracing::warn!(name = %request.name, "no coordinates for weather");
                None
            }
        };
        panel.borrow_mut().apply_weather(ticket, weather);
    };

    let summary = async {
        let summary = match services.ai_summary(&request.name).await {
            Ok(summary) => Some(summary),
            Err(err) => {
                tracing::warn!(name = %request.name, error = %err, "AI summary unavailable");
                None
            }
        };
        panel.borrow_mut().apply_summary(ticket, summary);
    };

    join(metadata_then_weather, summary).await;
}

#[cfg(test)]
mod tests {
    use super::{DetailRequest, fetch_detail, weather_coordinates};
    use crate::config::ServiceConfig;
    use crate::error::DetailError;
    use crate::http::HttpClient;
    use crate::panel::{DetailPanel, Section, SelectedCountry};
    use crate::services::{AI_FALLBACK_TEXT, Coordinates, RemoteServices};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const TESTLAND: &str = r#"[{"name": {"common": "Testland", "official": "Republic of Testland"},
        "cca2": "TL", "capital": ["Testville"], "capitalInfo": {"latlng": [12.5, 34.25]},
        "latlng": [10.0, 30.0]}]"#;
    const WEATHER: &str = r#"{"current_weather": {"temperature": 21.0, "windspeed": 5.0,
        "winddirection": 90.0, "weathercode": 2, "is_day": 1, "time": "2026-10-16T09:00"}}"#;
    const SUMMARY: &str = r#"{"candidates": [{"content": {"parts": [{"text": "One. Two."}]},
        "groundingMetadata": {"groundingChunks": [{"web": {"uri": "https://t.example", "title": "T"}}]}}]}"#;

    /// Routes by URL and records every request. `on_country` runs when the
    /// metadata endpoint is hit.
    #[derive(Default)]
    struct Routes {
        country_by_name: Option<&'static str>,
        country_by_code: Option<&'static str>,
        requests: RefCell<Vec<String>>,
        on_country: Option<Rc<dyn Fn()>>,
    }

    impl Routes {
        fn requested(&self, fragment: &str) -> Vec<String> {
            self.requests
                .borrow()
                .iter()
                .filter(|u| u.contains(fragment))
                .cloned()
                .collect()
        }
    }

    impl HttpClient for Routes {
        async fn get_text(&self, url: &str) -> Result<String, DetailError> {
            self.requests.borrow_mut().push(url.to_string());
            let not_found = || DetailError::Status {
                url: url.to_string(),
                status: 404,
            };
            if url.contains("/v3.1/") {
                if let Some(hook) = &self.on_country {
                    hook();
                }
                let body = if url.contains("/name/") {
                    self.country_by_name
                } else {
                    self.country_by_code
                };
                return body.map(str::to_string).ok_or_else(not_found);
            }
            if url.contains("/v1/forecast") {
                return Ok(WEATHER.to_string());
            }
            Err(not_found())
        }

        async fn post_json(
            &self,
            url: &str,
            _body: &serde_json::Value,
        ) -> Result<String, DetailError> {
            self.requests.borrow_mut().push(url.to_string());
            Ok(SUMMARY.to_string())
        }
    }

    fn config_with_key() -> ServiceConfig {
        ServiceConfig {
            ai_api_key: Some("k".to_string()),
            ..ServiceConfig::default()
        }
    }

    fn testland_request() -> DetailRequest {
        DetailRequest {
            name: "Testland".to_string(),
            code: "TL".to_string(),
            centroid: Some(Coordinates::new(1.0, 2.0)),
        }
    }

    fn select(panel: &RefCell<DetailPanel>) -> crate::panel::Ticket {
        panel.borrow_mut().select(SelectedCountry {
            index: 0,
            name: "Testland".to_string(),
            id: "TL".to_string(),
        })
    }

    #[test]
    fn fills_every_section_and_fetches_weather_once_at_the_capital() {
        let services = RemoteServices::new(
            Routes {
                country_by_name: Some(TESTLAND),
                ..Routes::default()
            },
            config_with_key(),
        );
        let panel = RefCell::new(DetailPanel::new());
        let ticket = select(&panel);
        pollster::block_on(fetch_detail(&services, &panel, ticket, &testland_request()));

        let weather_calls = services.http().requested("/v1/forecast");
        assert_eq!(weather_calls.len(), 1);
        assert!(weather_calls[0].contains("latitude=12.5000&longitude=34.2500"));

        let panel = panel.borrow();
        assert_eq!(panel.country().ready().map(|c| c.code.as_str()), Some("TL"));
        assert_eq!(panel.weather().ready().map(|w| w.description), Some("Partly cloudy"));
        let summary = panel.summary().ready().expect("summary");
        assert_eq!(summary.text, "One. Two.");
        assert_eq!(summary.citations.len(), 1);
    }

    #[test]
    fn name_lookup_falls_back_to_code() {
        let services = RemoteServices::new(
            Routes {
                country_by_code: Some(TESTLAND),
                ..Routes::default()
            },
            ServiceConfig::default(),
        );
        let panel = RefCell::new(DetailPanel::new());
        let ticket = select(&panel);
        pollster::block_on(fetch_detail(&services, &panel, ticket, &testland_request()));

        assert_eq!(services.http().requested("/v3.1/alpha/TL").len(), 1);
        assert!(panel.borrow().country().ready().is_some());
    }

    #[test]
    fn failed_metadata_uses_centroid_and_missing_key_uses_fallback_text() {
        let services = RemoteServices::new(Routes::default(), ServiceConfig::default());
        let panel = RefCell::new(DetailPanel::new());
        let ticket = select(&panel);
        pollster::block_on(fetch_detail(&services, &panel, ticket, &testland_request()));

        let panel = panel.borrow();
        assert_eq!(panel.country(), &Section::Unavailable);
        assert_eq!(
            panel.weather().ready().map(|w| w.at),
            Some(Coordinates::new(1.0, 2.0))
        );
        assert_eq!(panel.summary().ready().map(|s| s.text.as_str()), Some(AI_FALLBACK_TEXT));
        // No key, no AI request.
        assert!(services.http().requested("generateContent").is_empty());
    }

    #[test]
    fn deselecting_mid_fetch_discards_results_and_skips_weather() {
        let panel = Rc::new(RefCell::new(DetailPanel::new()));
        let hook_panel = Rc::clone(&panel);
        let services = RemoteServices::new(
            Routes {
                country_by_name: Some(TESTLAND),
                on_country: Some(Rc::new(move || hook_panel.borrow_mut().clear())),
                ..Routes::default()
            },
            config_with_key(),
        );
        let ticket = select(&panel);
        pollster::block_on(fetch_detail(&services, &panel, ticket, &testland_request()));

        assert!(services.http().requested("/v1/forecast").is_empty());
        let snap = panel.borrow().snapshot();
        assert_eq!(snap.selected, None);
        assert_eq!(snap.country, Section::Idle);
        assert_eq!(snap.weather, Section::Idle);
        assert_eq!(snap.summary, Section::Idle);
    }

    #[test]
    fn reselecting_mid_fetch_keeps_only_the_new_selection() {
        let panel = Rc::new(RefCell::new(DetailPanel::new()));
        let hook_panel = Rc::clone(&panel);
        let services = RemoteServices::new(
            Routes {
                country_by_name: Some(TESTLAND),
                on_country: Some(Rc::new(move || {
                    let mut p = hook_panel.borrow_mut();
                    if p.selected().map(|s| s.index) == Some(0) {
                        p.select(SelectedCountry {
                            index: 1,
                            name: "Otherland".to_string(),
                            id: "OL".to_string(),
                        });
                    }
                })),
                ..Routes::default()
            },
            config_with_key(),
        );
        let ticket = select(&panel);
        pollster::block_on(fetch_detail(&services, &panel, ticket, &testland_request()));

        let snap = panel.borrow().snapshot();
        assert_eq!(snap.selected.map(|s| s.id), Some("OL".to_string()));
        assert!(snap.country.is_loading());
        assert!(snap.summary.is_loading());
    }

    #[test]
    fn weather_coordinates_prefer_the_capital() {
        assert_eq!(weather_coordinates(None, None), None);
        assert_eq!(
            weather_coordinates(None, Some(Coordinates::new(1.0, 1.0))),
            Some(Coordinates::new(1.0, 1.0))
        );
    }
}
