//! Search-and-resolve flow: debounced autocomplete, weather fetch, result state.
//!
//! The controller owns an explicit [`SearchState`]. Operations that talk to the
//! network are `async` and write their outcome into that state instead of
//! returning errors. Debounced suggestion lookups run on the tokio runtime and
//! report back through [`SearchEvents`]; the owner feeds each event into
//! [`SearchController::apply`], which drops anything that is no longer the latest
//! lookup.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    debounce::Debouncer,
    error::WeatherError,
    model::{DisplayUnit, Suggestion, WeatherPayload, WeatherQuery},
    provider::WeatherProvider,
};

pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(500);
/// Shortest trimmed query that triggers a suggestion lookup.
pub const MIN_SUGGESTION_QUERY: usize = 3;
pub const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    pub weather: Option<WeatherPayload>,
    pub unit: DisplayUnit,
    pub error: Option<String>,
}

/// Completed background work, to be passed to [`SearchController::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    SuggestionsLoaded { seq: u64, suggestions: Vec<Suggestion> },
}

/// Receiving half for background results of one controller.
#[derive(Debug)]
pub struct SearchEvents {
    rx: mpsc::UnboundedReceiver<SearchEvent>,
}

impl SearchEvents {
    /// Waits for the next event. Returns `None` once the controller is dropped.
    pub async fn next(&mut self) -> Option<SearchEvent> {
        self.rx.recv().await
    }
}

#[derive(Debug)]
pub struct SearchController {
    provider: Arc<dyn WeatherProvider>,
    state: SearchState,
    debounce: Debouncer,
    delay: Duration,
    /// Latest suggestion lookup issued; older results are stale.
    suggestion_seq: u64,
    events: mpsc::UnboundedSender<SearchEvent>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> (Self, SearchEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            provider,
            state: SearchState::default(),
            debounce: Debouncer::new(),
            delay: SUGGESTION_DEBOUNCE,
            suggestion_seq: 0,
            events: tx,
        };
        (controller, SearchEvents { rx })
    }

    pub fn with_unit(mut self, unit: DisplayUnit) -> Self {
        self.state.unit = unit;
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Update the query and (re)schedule the debounced suggestion lookup.
    ///
    /// Needs a tokio runtime when the query is long enough to schedule a lookup.
    pub fn on_query_change(&mut self, text: impl Into<String>) {
        self.state.query = text.into();
        let query = self.state.query.trim().to_string();

        if query.chars().count() < MIN_SUGGESTION_QUERY || self.state.weather.is_some() {
            self.debounce.cancel();
            self.invalidate_suggestions();
            self.state.suggestions.clear();
            return;
        }

        // Completing a row writes its label into the input; keep the rows so the
        // pick still resolves by coordinates.
        if self.suggestion_by_label(&query).is_some() {
            self.debounce.cancel();
            self.invalidate_suggestions();
            return;
        }

        let seq = self.invalidate_suggestions();
        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();

        self.debounce.schedule(self.delay, async move {
            let suggestions = lookup_suggestions(provider.as_ref(), &query).await;
            // Receiver gone means the session ended.
            let _ = events.send(SearchEvent::SuggestionsLoaded { seq, suggestions });
        });
    }

    /// The current suggestion whose dropdown label is `label`, if any.
    pub fn suggestion_by_label(&self, label: &str) -> Option<&Suggestion> {
        let label = label.trim();
        self.state.suggestions.iter().find(|s| s.label() == label)
    }

    /// Look up suggestions for `query` right away, bypassing the debounce.
    pub async fn fetch_suggestions(&mut self, query: &str) {
        let seq = self.invalidate_suggestions();
        let suggestions = lookup_suggestions(self.provider.as_ref(), query).await;
        self.apply(SearchEvent::SuggestionsLoaded { seq, suggestions });
    }

    /// Fold a background result into the state. Returns whether the state changed.
    pub fn apply(&mut self, event: SearchEvent) -> bool {
        match event {
            SearchEvent::SuggestionsLoaded { seq, suggestions } => {
                if seq != self.suggestion_seq || self.state.weather.is_some() {
                    debug!(seq, latest = self.suggestion_seq, "discarding stale suggestions");
                    return false;
                }
                self.state.suggestions = suggestions;
                true
            }
        }
    }

    /// Fetch current weather for `target`, recording the outcome in the state.
    ///
    /// On success the query becomes `display_name`, or the payload's own location
    /// name when none is given.
    pub async fn fetch_weather(&mut self, target: WeatherQuery, display_name: Option<String>) {
        self.debounce.cancel();
        self.invalidate_suggestions();
        self.state.error = None;
        self.state.weather = None;

        match self.provider.current_weather(&target).await {
            Ok(payload) => {
                self.state.query = display_name.unwrap_or_else(|| payload.name.clone());
                self.state.weather = Some(payload);
            }
            Err(err) => {
                warn!(query = ?target, error = %err, "weather fetch failed");
                self.state.error = Some(err.to_string());
            }
        }

        self.state.suggestions.clear();
    }

    /// Resolve the current query by city name.
    pub async fn submit_search(&mut self) {
        let city = self.state.query.trim();
        if city.is_empty() {
            self.state.error = Some(WeatherError::EmptyQuery.to_string());
            return;
        }

        let target = WeatherQuery::City(city.to_string());
        self.fetch_weather(target, None).await;
    }

    /// Resolve a picked suggestion by its coordinates.
    pub async fn select_suggestion(&mut self, suggestion: &Suggestion) {
        let target = WeatherQuery::Coordinates { lat: suggestion.lat, lon: suggestion.lon };
        self.fetch_weather(target, Some(suggestion.display_name())).await;
        self.state.suggestions.clear();
    }

    /// Drop the current result and go back to an empty search.
    pub fn clear_result(&mut self) {
        self.state.weather = None;
        self.state.query.clear();
    }

    pub fn toggle_unit(&mut self) {
        self.state.unit = self.state.unit.toggled();
    }

    fn invalidate_suggestions(&mut self) -> u64 {
        self.suggestion_seq += 1;
        self.suggestion_seq
    }
}

/// Suggestion lookups fail silently: any error yields an empty list.
async fn lookup_suggestions(provider: &dyn WeatherProvider, query: &str) -> Vec<Suggestion> {
    let query = query.trim();
    if query.chars().count() < MIN_SUGGESTION_QUERY {
        return Vec::new();
    }

    match provider.geocode(query, SUGGESTION_LIMIT).await {
        Ok(mut suggestions) => {
            suggestions.truncate(SUGGESTION_LIMIT);
            suggestions
        }
        Err(err) => {
            debug!(query, error = %err, "suggestion lookup failed");
            Vec::new()
        }
    }
}
