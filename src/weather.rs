use std::time::Duration;

use reqwest::Client;

use crate::config::WeatherConfig;
use crate::constants::USER_AGENT;
use crate::error::{Result, TourError};
use crate::models::{Forecast, ForecastResponse};

/// Client for the WeatherAPI.com forecast endpoint
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Fetches today's forecast for `city`. Exactly one request, no retry.
    pub async fn get_weather(&self, city: &str) -> Result<Forecast> {
        tracing::info!("Getting forecast for city: {}", city);

        let url = format!("{}/forecast.json", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TourError::Network(format!(
                "Request failed with status: {}",
                response.status()
            )));
        }

        let data = response.json::<ForecastResponse>().await?;
        let day = data
            .forecast
            .forecast_day
            .into_iter()
            .next()
            .ok_or_else(|| TourError::Network("forecast contained no days".to_string()))?
            .day;

        Ok(Forecast {
            condition: day.condition.text,
            avg_temp_c: day.avg_temp_c,
        })
    }
}
