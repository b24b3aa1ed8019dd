//! Interactive session: explicit form state, chat transcript and the actions
//! a user can take, each producing a freshly rendered [`Page`].

use std::fmt;
use std::sync::Arc;

use crate::error::TourError;
use crate::formatters::{
    format_chat_reply, format_forecast, format_saved_preferences, format_session_itinerary,
};
use crate::models::{Interest, PreferenceRecord};
use crate::store::PreferenceStore;
use crate::weather::WeatherClient;

const LOGIN_PROMPT: &str = "Enter your name to log in.";
const LOGIN_REQUIRED: &str = "Log in first.";
const WEATHER_FAILED: &str = "Failed to fetch weather information.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.speaker {
            Speaker::User => write!(f, "User: {}", self.text),
            Speaker::System => write!(f, "System: {}", self.text),
        }
    }
}

/// Everything one session remembers between actions
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// `None` while anonymous
    pub user_id: Option<String>,
    pub city: String,
    pub budget: u32,
    pub interests: Vec<Interest>,
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone)]
pub enum Action {
    LogIn { name: String },
    UpdateTrip {
        city: String,
        budget: u32,
        interests: Vec<Interest>,
    },
    RetrievePreferences,
    SubmitPreferences,
    Send { message: String },
    Close,
}

/// One render of the session
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub header: String,
    pub messages: Vec<String>,
    pub transcript: Vec<String>,
    pub weather: Option<String>,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for line in self.messages.iter().chain(&self.transcript) {
            writeln!(f, "{}", line)?;
        }
        if let Some(weather) = &self.weather {
            writeln!(f, "{}", weather)?;
        }
        Ok(())
    }
}

pub struct SessionController {
    state: SessionState,
    store: Arc<dyn PreferenceStore>,
    weather: Option<WeatherClient>,
    store_closed: bool,
}

impl SessionController {
    pub fn new(store: Arc<dyn PreferenceStore>, weather: Option<WeatherClient>) -> Self {
        Self {
            state: SessionState::default(),
            store,
            weather,
            store_closed: false,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies `action` and renders the resulting page.
    pub async fn handle(&mut self, action: Action) -> Page {
        let messages = match action {
            Action::LogIn { name } => self.log_in(&name),
            Action::UpdateTrip {
                city,
                budget,
                interests,
            } => {
                self.state.city = city.trim().to_string();
                self.state.budget = budget;
                self.state.interests = interests;
                Vec::new()
            }
            Action::RetrievePreferences => self.retrieve_preferences().await,
            Action::SubmitPreferences => self.submit_preferences().await,
            Action::Send { message } => {
                self.send(&message);
                Vec::new()
            }
            Action::Close => self.close().await,
        };
        self.render(messages).await
    }

    /// Closes the store unless the user already did. Called once at shutdown.
    pub async fn shutdown(&mut self) {
        if !self.store_closed {
            if let Err(e) = self.store.close().await {
                tracing::warn!("Failed to close preference store: {}", e);
            }
            self.store_closed = true;
        }
    }

    /// Anonymous to Identified. Ignores blank names and repeat logins.
    fn log_in(&mut self, name: &str) -> Vec<String> {
        if self.state.user_id.is_some() {
            return Vec::new();
        }
        let name = name.trim();
        if name.is_empty() {
            return Vec::new();
        }
        let user_id = name.to_lowercase();
        tracing::info!("Session identified as {}", user_id);
        self.state.user_id = Some(user_id);
        vec![format!("Welcome, {}!", name)]
    }

    /// Reads the saved record for the current user
    async fn retrieve_preferences(&self) -> Vec<String> {
        let Some(user_id) = self.state.user_id.as_deref() else {
            return vec![LOGIN_REQUIRED.to_string()];
        };
        match self.store.get_preferences(user_id).await {
            Ok(Some(record)) => vec![format_saved_preferences(&record)],
            Ok(None) => vec!["No previous preferences found.".to_string()],
            Err(e) => vec![failure("retrieve preferences", e)],
        }
    }

    /// Overwrites the saved record with the current form, then renders the
    /// placeholder itinerary.
    async fn submit_preferences(&self) -> Vec<String> {
        let Some(user_id) = self.state.user_id.as_deref() else {
            return vec![LOGIN_REQUIRED.to_string()];
        };
        let record = PreferenceRecord {
            name: user_id.to_string(),
            city: self.state.city.clone(),
            budget: self.state.budget,
            interests: self.state.interests.clone(),
        };
        if let Err(e) = self.store.store_preferences(user_id, &record).await {
            return vec![failure("save preferences", e)];
        }
        vec![
            "Preferences saved!".to_string(),
            "Generating itinerary...".to_string(),
            format_session_itinerary(&record),
        ]
    }

    /// Appends the user message and its canned reply, in that order
    fn send(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.state.transcript.push(TranscriptEntry {
            speaker: Speaker::User,
            text: message.to_string(),
        });
        self.state.transcript.push(TranscriptEntry {
            speaker: Speaker::System,
            text: format_chat_reply(message),
        });
    }

    /// Releases the store; later store actions render the closed error.
    async fn close(&mut self) -> Vec<String> {
        match self.store.close().await {
            Ok(()) => {
                self.store_closed = true;
                vec!["Preference store connection closed.".to_string()]
            }
            Err(e) => vec![failure("close the preference store", e)],
        }
    }

    /// Header, action messages, full transcript, then weather
    async fn render(&self, messages: Vec<String>) -> Page {
        let header = match &self.state.user_id {
            Some(user_id) => format!("Logged in as: {}", user_id),
            None => LOGIN_PROMPT.to_string(),
        };
        Page {
            header,
            messages,
            transcript: self.state.transcript.iter().map(|e| e.to_string()).collect(),
            weather: self.render_weather().await,
        }
    }

    /// Looks the weather up on every render while a city is set.
    async fn render_weather(&self) -> Option<String> {
        let client = self.weather.as_ref()?;
        let city = self.state.city.as_str();
        if city.is_empty() {
            return None;
        }
        match client.get_weather(city).await {
            Ok(forecast) => Some(format_forecast(city, &forecast)),
            Err(e) => {
                tracing::warn!("Weather lookup for {} failed: {}", city, e);
                Some(WEATHER_FAILED.to_string())
            }
        }
    }
}

fn failure(what: &str, err: TourError) -> String {
    tracing::warn!("Failed to {}: {}", what, err);
    format!("Could not {}: {}", what, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryPreferenceStore;
    use crate::weather::tests::{client_for, failing_router, spawn_stub, sunny_router};
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn controller() -> (SessionController, Arc<InMemoryPreferenceStore>) {
        let store = Arc::new(InMemoryPreferenceStore::new());
        (SessionController::new(store.clone(), None), store)
    }

    fn trip(city: &str, budget: u32, interests: Vec<Interest>) -> Action {
        Action::UpdateTrip {
            city: city.to_string(),
            budget,
            interests,
        }
    }

    #[tokio::test]
    async fn starts_anonymous_and_prompts_for_name() {
        let (mut session, _) = controller();
        let page = session
            .handle(Action::LogIn {
                name: "   ".to_string(),
            })
            .await;
        assert_eq!(page.header, LOGIN_PROMPT);
        assert!(session.state().user_id.is_none());
    }

    #[tokio::test]
    async fn login_lowercases_and_is_one_way() {
        let (mut session, _) = controller();
        let page = session
            .handle(Action::LogIn {
                name: "Alice".to_string(),
            })
            .await;
        assert_eq!(page.messages, vec!["Welcome, Alice!"]);
        assert_eq!(page.header, "Logged in as: alice");

        let page = session
            .handle(Action::LogIn {
                name: "Bob".to_string(),
            })
            .await;
        assert!(page.messages.is_empty());
        assert_eq!(session.state().user_id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn store_actions_require_login() {
        let (mut session, store) = controller();
        let page = session.handle(Action::SubmitPreferences).await;
        assert_eq!(page.messages, vec![LOGIN_REQUIRED]);
        let page = session.handle(Action::RetrievePreferences).await;
        assert_eq!(page.messages, vec![LOGIN_REQUIRED]);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn submit_then_retrieve_round_trips_the_record() {
        let (mut session, store) = controller();
        session
            .handle(Action::LogIn {
                name: "Alice".to_string(),
            })
            .await;

        let page = session.handle(Action::RetrievePreferences).await;
        assert_eq!(page.messages, vec!["No previous preferences found."]);

        session
            .handle(trip("Rome", 200, vec![Interest::Culture, Interest::Food]))
            .await;
        let page = session.handle(Action::SubmitPreferences).await;
        assert_eq!(page.messages[0], "Preferences saved!");
        assert_eq!(page.messages[1], "Generating itinerary...");
        let itinerary = &page.messages[2];
        assert!(itinerary.contains("Rome"));
        assert!(itinerary.contains("Culture"));
        assert!(itinerary.contains("Food"));

        let expected = PreferenceRecord {
            name: "alice".to_string(),
            city: "Rome".to_string(),
            budget: 200,
            interests: vec![Interest::Culture, Interest::Food],
        };
        assert_eq!(store.get_preferences("alice").await.unwrap(), Some(expected.clone()));

        let page = session.handle(Action::RetrievePreferences).await;
        assert_eq!(page.messages, vec![format_saved_preferences(&expected)]);
    }

    #[tokio::test]
    async fn resubmit_overwrites_prior_interests() {
        let (mut session, store) = controller();
        session
            .handle(Action::LogIn {
                name: "alice".to_string(),
            })
            .await;
        session
            .handle(trip("Rome", 200, vec![Interest::Culture]))
            .await;
        session.handle(Action::SubmitPreferences).await;
        session
            .handle(trip("Rome", 150, vec![Interest::Shopping]))
            .await;
        session.handle(Action::SubmitPreferences).await;

        let stored = store.get_preferences("alice").await.unwrap().unwrap();
        assert_eq!(stored.interests, vec![Interest::Shopping]);
        assert_eq!(stored.budget, 150);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn transcript_alternates_in_send_order() {
        let (mut session, _) = controller();
        let messages = ["hi", "what should I see?", "thanks"];
        let mut page = Page::default();
        for message in messages {
            page = session
                .handle(Action::Send {
                    message: message.to_string(),
                })
                .await;
        }
        session
            .handle(Action::Send {
                message: String::new(),
            })
            .await;

        assert_eq!(page.transcript.len(), 2 * messages.len());
        assert_eq!(session.state().transcript.len(), 2 * messages.len());
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(page.transcript[2 * i], format!("User: {}", message));
            assert_eq!(
                page.transcript[2 * i + 1],
                format!("System: Generating response for '{}'...", message)
            );
        }
    }

    #[tokio::test]
    async fn close_surfaces_later_store_failures() {
        let (mut session, _) = controller();
        session
            .handle(Action::LogIn {
                name: "alice".to_string(),
            })
            .await;
        let page = session.handle(Action::Close).await;
        assert_eq!(page.messages, vec!["Preference store connection closed."]);

        let page = session.handle(Action::SubmitPreferences).await;
        assert_eq!(page.messages.len(), 1);
        assert!(page.messages[0].starts_with("Could not save preferences"));

        // Already closed by the user; shutdown must not close again.
        session.shutdown().await;
    }

    #[tokio::test]
    async fn weather_renders_whenever_city_is_set() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = sunny_router().layer(axum::middleware::from_fn(
            move |req: axum::extract::Request, next: axum::middleware::Next| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    next.run(req).await
                }
            },
        ));
        let base = spawn_stub(router).await;
        let store = Arc::new(InMemoryPreferenceStore::new());
        let mut session = SessionController::new(store, Some(client_for(base)));

        let page = session
            .handle(Action::LogIn {
                name: "alice".to_string(),
            })
            .await;
        assert!(page.weather.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        let page = session.handle(trip("Rome", 0, vec![])).await;
        assert_eq!(
            page.weather.as_deref(),
            Some("Weather for Rome: Sunny, Temperature: 18.4\u{00b0}C")
        );
        session
            .handle(Action::Send {
                message: "hello".to_string(),
            })
            .await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn weather_failure_renders_error_and_no_forecast() {
        let base = spawn_stub(failing_router()).await;
        let store = Arc::new(InMemoryPreferenceStore::new());
        let mut session = SessionController::new(store, Some(client_for(base)));

        let page = session.handle(trip("Rome", 0, vec![])).await;
        assert_eq!(page.weather.as_deref(), Some(WEATHER_FAILED));
        assert!(!page.to_string().contains("Temperature"));
    }

    #[tokio::test]
    async fn page_renders_in_order() {
        let base = spawn_stub(Router::new().route(
            "/forecast.json",
            get(|| async { axum::http::StatusCode::NOT_FOUND }),
        ))
        .await;
        let store = Arc::new(InMemoryPreferenceStore::new());
        let mut session = SessionController::new(store, Some(client_for(base)));
        session
            .handle(Action::LogIn {
                name: "Alice".to_string(),
            })
            .await;
        session.handle(trip("Oslo", 10, vec![])).await;
        let page = session
            .handle(Action::Send {
                message: "hi".to_string(),
            })
            .await;
        assert_eq!(
            page.to_string(),
            "Logged in as: alice\n\
             User: hi\n\
             System: Generating response for 'hi'...\n\
             Failed to fetch weather information.\n"
        );
    }
}
