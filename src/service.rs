use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use tokio::sync::Mutex;

use crate::models::{Interest, LogInRequest, SendMessageRequest, SetTripRequest};
use crate::session::{Action, SessionController};

/// Tour planning session exposed as MCP tools, one tool per UI control.
///
/// A stdio connection is one session; tool calls are serialized on the
/// controller.
#[derive(Clone)]
pub struct TourPlanner {
    session: Arc<Mutex<SessionController>>,
    tool_router: ToolRouter<Self>,
}

impl TourPlanner {
    pub fn new(session: Arc<Mutex<SessionController>>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    /// Runs `action` and returns the rendered page as the tool result
    async fn dispatch(&self, action: Action) -> Result<CallToolResult, McpError> {
        let page = self.session.lock().await.handle(action).await;
        Ok(CallToolResult::success(vec![Content::text(page.to_string())]))
    }
}

#[tool_handler]
impl ServerHandler for TourPlanner {
    fn get_info(&self) -> ServerInfo {
        let interests = Interest::ALL
            .iter()
            .map(|i| i.label())
            .collect::<Vec<_>>()
            .join(", ");
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tour-planner".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: Some("One-Day Tour Planning Assistant".to_string()),
                website_url: None,
            },
            instructions: Some(format!(
                "One-day tour planning assistant. Log in with your name, set the city, \
                budget and interests ({}), then submit to save your preferences and get \
                an itinerary. Every tool returns the current page.",
                interests
            )),
        }
    }
}

#[tool_router]
impl TourPlanner {
    /// Identifies the session by display name
    #[tool(description = "Log in with a display name. The lowercased name becomes your user id. Has no effect once logged in.")]
    async fn log_in(
        &self,
        Parameters(request): Parameters<LogInRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(Action::LogIn { name: request.name }).await
    }

    /// Updates the trip form: city, budget and interests
    #[tool(description = "Set the city you are visiting, your budget in dollars (0 or more) and your interests (any of Culture, Adventure, Food, Shopping).")]
    async fn set_trip(
        &self,
        Parameters(request): Parameters<SetTripRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(Action::UpdateTrip {
            city: request.city,
            budget: request.budget,
            interests: request.interests,
        })
        .await
    }

    /// Shows the saved preferences of the logged-in user
    #[tool(description = "Show the preferences previously saved for the logged-in user.")]
    async fn retrieve_preferences(&self) -> Result<CallToolResult, McpError> {
        self.dispatch(Action::RetrievePreferences).await
    }

    /// Saves the current form and renders an itinerary
    #[tool(description = "Save the current city, budget and interests for the logged-in user and generate an itinerary.")]
    async fn submit_preferences(&self) -> Result<CallToolResult, McpError> {
        self.dispatch(Action::SubmitPreferences).await
    }

    /// Appends a chat exchange to the transcript
    #[tool(description = "Send a chat message. The message and the assistant's reply are appended to the transcript.")]
    async fn send_message(
        &self,
        Parameters(request): Parameters<SendMessageRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(Action::Send {
            message: request.message,
        })
        .await
    }

    /// Closes the preference store for the rest of the session
    #[tool(description = "Close the preference store connection. Saving and retrieving fail afterwards.")]
    async fn close_app(&self) -> Result<CallToolResult, McpError> {
        self.dispatch(Action::Close).await
    }
}
