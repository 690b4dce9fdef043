// Module containing the response data structure of the timezone service
mod response;

use std::fmt;

pub use response::TimezoneResponse;

use crate::error::AppError;
use tracing::{debug, error, info};

// Path of the timezone lookup endpoint, relative to the service URL
const TIMEZONE_PATH: &str = "/get_timezone";

/// Latitude and longitude exactly as read from the page, without numeric validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Something that can resolve coordinates to a timezone.
pub trait TimezoneSource: Send + Sync {
    fn lookup(
        &self,
        coordinates: &Coordinates,
    ) -> impl Future<Output = Result<TimezoneResponse, AppError>> + Send;
}

/// Timezone lookups against the HTTP `/get_timezone` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTimezoneSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTimezoneSource {
    /// Create a source for the service rooted at `service_url` (e.g., "http://localhost:5000").
    pub fn new(client: reqwest::Client, service_url: &str) -> Self {
        let endpoint = format!("{}{}", service_url.trim_end_matches('/'), TIMEZONE_PATH);
        Self { client, endpoint }
    }
}

impl TimezoneSource for HttpTimezoneSource {
    /// Fetches the timezone for the given coordinates.
    ///
    /// # Returns
    /// * `TimezoneResponse` parsed from the body of a successful response
    /// * Error if the request fails, the status is unsuccessful or the body is not JSON
    async fn lookup(&self, coordinates: &Coordinates) -> Result<TimezoneResponse, AppError> {
        info!("Fetching timezone for coordinates: {}", coordinates);

        // reqwest encodes the query, so reserved characters in the fields cannot
        // leak into other parameters
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", coordinates.latitude.as_str()),
                ("lon", coordinates.longitude.as_str()),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.text().await?;
            let timezone_response = TimezoneResponse::from_json(&body)?;
            debug!("Timezone fetched successfully: {:?}", timezone_response);
            Ok(timezone_response)
        } else {
            error!("Failed to fetch timezone: {}", response.status());
            Err(AppError::ApiRequestFailed(format!(
                "Failed to fetch timezone: {}",
                response.status()
            )))
        }
    }
}
