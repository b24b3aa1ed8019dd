use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Preference Models
// ============================================================================

/// Interest categories offered by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Interest {
    Culture,
    Adventure,
    Food,
    Shopping,
}

impl Interest {
    pub const ALL: [Interest; 4] = [
        Interest::Culture,
        Interest::Adventure,
        Interest::Food,
        Interest::Shopping,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Interest::Culture => "Culture",
            Interest::Adventure => "Adventure",
            Interest::Food => "Food",
            Interest::Shopping => "Shopping",
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Preferences stored per user id. Overwritten wholesale on every submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub name: String,
    pub city: String,
    pub budget: u32,
    pub interests: Vec<Interest>,
}

// ============================================================================
// Itinerary HTTP Models
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItineraryRequest {
    pub name: String,
    pub city: String,
    pub budget: u32,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItineraryResponse {
    pub itinerary: String,
}

// ============================================================================
// WeatherAPI.com Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
pub struct ForecastBlock {
    #[serde(rename = "forecastday")]
    pub forecast_day: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastDay {
    pub day: DaySummary,
}

#[derive(Debug, Deserialize)]
pub struct DaySummary {
    pub condition: Condition,
    #[serde(rename = "avgtemp_c")]
    pub avg_temp_c: f64,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub text: String,
}

/// The slice of a forecast the planner shows
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub condition: String,
    pub avg_temp_c: f64,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct LogInRequest {
    /// Display name; the lowercased form becomes the user id
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SetTripRequest {
    pub city: String,
    pub budget: u32,
    #[serde(default)]
    pub interests: Vec<Interest>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SendMessageRequest {
    pub message: String,
}
