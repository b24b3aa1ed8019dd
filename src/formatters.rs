use std::fmt::Display;

use crate::models::{Forecast, ItineraryRequest, PreferenceRecord};

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Placeholder itinerary returned by the HTTP endpoint
pub fn format_request_itinerary(request: &ItineraryRequest) -> String {
    format!(
        "Generated itinerary for {} with interests {}",
        request.city,
        join(&request.interests)
    )
}

/// Placeholder itinerary shown after a preference submit
pub fn format_session_itinerary(record: &PreferenceRecord) -> String {
    format!(
        "Generated itinerary for {} with budget {} and interests {}",
        record.city,
        record.budget,
        join(&record.interests)
    )
}

pub fn format_saved_preferences(record: &PreferenceRecord) -> String {
    format!(
        "Your saved preferences: name: {}, city: {}, budget: ${}, interests: {}",
        record.name,
        record.city,
        record.budget,
        join(&record.interests)
    )
}

/// Canned system reply to a chat message
pub fn format_chat_reply(message: &str) -> String {
    format!("Generating response for '{}'...", message)
}

pub fn format_forecast(city: &str, forecast: &Forecast) -> String {
    format!(
        "Weather for {}: {}, Temperature: {}\u{00b0}C",
        city, forecast.condition, forecast.avg_temp_c
    )
}
