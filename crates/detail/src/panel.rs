use serde::Serialize;

use crate::services::{AiSummary, CountryInfo, Weather};

/// Identifies one selection. Results carrying an older ticket are dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Section<T> {
    Idle,
    Loading,
    Ready(T),
    Unavailable,
}

impl<T> Section<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Section::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedCountry {
    pub index: usize,
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSnapshot {
    pub selected: Option<SelectedCountry>,
    pub country: Section<CountryInfo>,
    pub weather: Section<Weather>,
    pub summary: Section<AiSummary>,
}

/// State behind the floating detail panel.
#[derive(Debug, Clone)]
pub struct DetailPanel {
    next_ticket: u64,
    current: Option<Ticket>,
    selected: Option<SelectedCountry>,
    country: Section<CountryInfo>,
    weather: Section<Weather>,
    summary: Section<AiSummary>,
}

impl Default for DetailPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailPanel {
    pub fn new() -> Self {
        Self {
            next_ticket: 0,
            current: None,
            selected: None,
            country: Section::Idle,
            weather: Section::Idle,
            summary: Section::Idle,
        }
    }

    /// Starts a new selection: every section goes to `Loading` and any
    /// earlier ticket becomes stale.
    pub fn select(&mut self, country: SelectedCountry) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        tracing::debug!(
            index = country.index,
            name = %country.name,
            ticket = ticket.0,
            "detail selected"
        );
        self.current = Some(ticket);
        self.selected = Some(country);
        self.country = Section::Loading;
        self.weather = Section::Loading;
        self.summary = Section::Loading;
        ticket
    }

    /// Drops the selection and all fetched data right away.
    pub fn clear(&mut self) {
        if self.selected.is_some() {
            tracing::debug!("detail cleared");
        }
        self.current = None;
        self.selected = None;
        self.country = Section::Idle;
        self.weather = Section::Idle;
        self.summary = Section::Idle;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.selected.is_some() && self.current == Some(ticket)
    }

    pub fn selected(&self) -> Option<&SelectedCountry> {
        self.selected.as_ref()
    }

    pub fn country(&self) -> &Section<CountryInfo> {
        &self.country
    }

    pub fn weather(&self) -> &Section<Weather> {
        &self.weather
    }

    pub fn summary(&self) -> &Section<AiSummary> {
        &self.summary
    }

    /// Each `apply_*` returns whether the result was taken.
    pub fn apply_country(&mut self, ticket: Ticket, result: Option<CountryInfo>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.country = result.map_or(Section::Unavailable, Section::Ready);
        true
    }

    pub fn apply_weather(&mut self, ticket: Ticket, result: Option<Weather>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.weather = result.map_or(Section::Unavailable, Section::Ready);
        true
    }

    /// A failed summary is shown as the fixed fallback text, not as unavailable.
    pub fn apply_summary(&mut self, ticket: Ticket, result: Option<AiSummary>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.summary = Section::Ready(result.unwrap_or_else(AiSummary::fallback));
        true
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            selected: self.selected.clone(),
            country: self.country.clone(),
            weather: self.weather.clone(),
            summary: self.summary.clone(),
        }
    }
}
