//! Interactive search: city prompt with live suggestions, then a results menu.
//!
//! inquire prompts block, so each one runs on the blocking pool while this task
//! keeps driving the controller: keystrokes come in over a channel, debounced
//! suggestions go back out through a `watch` the autocompleter reads.

use std::{fmt, time::Duration};

use anyhow::Context;
use inquire::{
    Autocomplete, CustomUserError, InquireError, Select, Text, autocompletion::Replacement,
};
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
};
use tracing::debug;
use weather_core::{
    DisplayUnit, SearchController, SearchEvents, Suggestion,
    search::{MIN_SUGGESTION_QUERY, SUGGESTION_DEBOUNCE, SUGGESTION_LIMIT},
};

use crate::render;

/// How long a geocoding request may take once the debounce fires.
const LOOKUP_BUDGET: Duration = Duration::from_secs(2);

pub async fn run(mut controller: SearchController, mut events: SearchEvents) -> anyhow::Result<()> {
    loop {
        if let Some(payload) = &controller.state().weather {
            print!("{}", render::report(payload, controller.state().unit));

            match result_menu(controller.state().unit).await? {
                ResultAction::SwitchUnit(_) => controller.toggle_unit(),
                ResultAction::NewSearch => controller.clear_result(),
                ResultAction::Quit => return Ok(()),
            }
            continue;
        }

        let Some(input) = prompt_city(&mut controller, &mut events).await? else {
            return Ok(());
        };
        resolve(&mut controller, &input).await;

        if let Some(error) = &controller.state().error {
            eprintln!("{}", render::error(error));
        }
    }
}

/// A picked dropdown row resolves by coordinates; anything else by name.
async fn resolve(controller: &mut SearchController, input: &str) {
    match controller.suggestion_by_label(input).cloned() {
        Some(suggestion) => {
            debug!(city = %suggestion.display_name(), "resolving picked suggestion");
            controller.select_suggestion(&suggestion).await;
        }
        None => {
            debug!(city = input, "resolving by name");
            controller.on_query_change(input);
            controller.submit_search().await;
        }
    }
}

/// Returns `None` when the user escapes or interrupts the prompt.
async fn prompt_city(
    controller: &mut SearchController,
    events: &mut SearchEvents,
) -> anyhow::Result<Option<String>> {
    let (keystroke_tx, mut keystrokes) = mpsc::unbounded_channel();
    let (rows_tx, rows_rx) = watch::channel(SuggestionRows::of(controller));
    let initial = controller.state().query.clone();
    let completer = CityCompleter::new(
        keystroke_tx,
        rows_rx,
        initial.clone(),
        Handle::current(),
        SUGGESTION_DEBOUNCE + LOOKUP_BUDGET,
    );

    let mut prompt = tokio::task::spawn_blocking(move || {
        Text::new("City:")
            .with_initial_value(&initial)
            .with_placeholder("Enter city name")
            .with_autocomplete(completer)
            .with_page_size(SUGGESTION_LIMIT)
            .prompt_skippable()
    });

    loop {
        tokio::select! {
            answer = &mut prompt => {
                return match answer.context("City prompt task failed")? {
                    Ok(city) => Ok(city),
                    Err(InquireError::OperationInterrupted) => Ok(None),
                    Err(err) => Err(err.into()),
                };
            }
            Some(text) = keystrokes.recv() => {
                let had_rows = !controller.state().suggestions.is_empty();
                controller.on_query_change(text);
                // A scheduled lookup publishes when it lands; only a cleared list is final now.
                if had_rows && controller.state().suggestions.is_empty() {
                    rows_tx.send_replace(SuggestionRows::of(controller));
                }
            }
            Some(event) = events.next() => {
                if controller.apply(event) {
                    rows_tx.send_replace(SuggestionRows::of(controller));
                }
            }
        }
    }
}

/// Suggestion rows together with the query they were looked up for.
#[derive(Debug, Clone, Default, PartialEq)]
struct SuggestionRows {
    query: String,
    rows: Vec<Suggestion>,
}

impl SuggestionRows {
    fn of(controller: &SearchController) -> Self {
        let state = controller.state();
        Self { query: state.query.trim().to_string(), rows: state.suggestions.clone() }
    }

    /// Labels to list under `input`, or `None` when the rows answer some other query.
    fn labels_for(&self, input: &str) -> Option<Vec<String>> {
        let input = input.trim();
        let labels: Vec<String> = self.rows.iter().map(Suggestion::label).collect();

        if self.query == input || labels.iter().any(|label| label == input) {
            Some(labels)
        } else {
            None
        }
    }
}

/// Forwards each edit to the controller and lists the suggestions looked up for it.
///
/// inquire asks for suggestions only when the input changes, so after forwarding
/// an edit that triggers a lookup the completer blocks (up to `wait`) until the
/// session publishes rows for that exact input. Rows for an older input are
/// never listed.
#[derive(Debug, Clone)]
struct CityCompleter {
    keystrokes: mpsc::UnboundedSender<String>,
    rows: watch::Receiver<SuggestionRows>,
    last_input: String,
    runtime: Handle,
    wait: Duration,
}

impl CityCompleter {
    fn new(
        keystrokes: mpsc::UnboundedSender<String>,
        rows: watch::Receiver<SuggestionRows>,
        last_input: String,
        runtime: Handle,
        wait: Duration,
    ) -> Self {
        Self { keystrokes, rows, last_input, runtime, wait }
    }

    fn wait_for_rows(&mut self, query: &str) {
        let rows = &mut self.rows;
        let waited = self.runtime.block_on(tokio::time::timeout(self.wait, async {
            loop {
                if rows.borrow_and_update().query == query {
                    return;
                }
                if rows.changed().await.is_err() {
                    return;
                }
            }
        }));

        if waited.is_err() {
            debug!(query, "no suggestions published in time");
        }
    }
}

impl Autocomplete for CityCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let query = input.trim();

        if input != self.last_input {
            self.last_input = input.to_string();
            // Session loop gone means the prompt is about to be torn down.
            let _ = self.keystrokes.send(input.to_string());

            let pending = self.rows.borrow().labels_for(query).is_none();
            if pending && query.chars().count() >= MIN_SUGGESTION_QUERY {
                self.wait_for_rows(query);
            }
        }

        if query.chars().count() < MIN_SUGGESTION_QUERY {
            return Ok(Vec::new());
        }
        Ok(self.rows.borrow().labels_for(query).unwrap_or_default())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultAction {
    SwitchUnit(DisplayUnit),
    NewSearch,
    Quit,
}

impl fmt::Display for ResultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultAction::SwitchUnit(unit) => write!(f, "Show in {unit}"),
            ResultAction::NewSearch => f.write_str("New search"),
            ResultAction::Quit => f.write_str("Quit"),
        }
    }
}

async fn result_menu(unit: DisplayUnit) -> anyhow::Result<ResultAction> {
    let options = vec![
        ResultAction::SwitchUnit(unit.toggled()),
        ResultAction::NewSearch,
        ResultAction::Quit,
    ];

    let answer = tokio::task::spawn_blocking(move || Select::new("Next:", options).prompt_skippable())
        .await
        .context("Menu prompt task failed")?;

    match answer {
        Ok(choice) => Ok(choice.unwrap_or(ResultAction::Quit)),
        Err(InquireError::OperationInterrupted) => Ok(ResultAction::Quit),
        Err(err) => Err(err.into()),
    }
}
