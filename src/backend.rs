use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::availability::WeeklyAvailability;
use crate::models::BookingRequest;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Backend URL cannot take path segments: {0}")]
    CannotBeBase(String),
    #[error("No availability endpoint answered for tutor {0}")]
    NoEndpoint(String),
    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),
    #[error("Backend responded with status {0}")]
    Status(u16),
}

/// Keys under which the backend has been seen to wrap list payloads.
const WRAPPER_KEYS: [&str; 3] = ["availability", "data", "items"];

#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
}

impl BackendClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::new(base_url),
        }
    }

    /// Base URL with `segments` appended, each escaped as a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = Url::clone(&self.base_url);
        url.path_segments_mut()
            .map_err(|()| BackendError::CannotBeBase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Candidate URLs for a tutor's availability, in probe order.
    fn availability_urls(&self, tutor_id: &str) -> Result<Vec<Url>, BackendError> {
        let mut query = self.endpoint(&["availability"])?;
        query.query_pairs_mut().append_pair("tutorId", tutor_id);
        Ok(vec![
            self.endpoint(&["tutors", tutor_id, "availability"])?,
            self.endpoint(&["availability", "tutor", tutor_id])?,
            query,
        ])
    }

    fn get(&self, url: &Url, bearer: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.client.get(url.as_str());
        match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetches the tutor's weekly availability, trying each known endpoint
    /// shape until one answers with something other than 404/405.
    pub async fn fetch_availability(
        &self,
        tutor_id: &str,
        bearer: Option<&str>,
    ) -> Result<Vec<WeeklyAvailability>, BackendError> {
        for url in self.availability_urls(tutor_id)? {
            let response = self.get(&url, bearer).send().await?;
            let status = response.status();
            if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED {
                debug!(%url, %status, "availability endpoint not served, trying next");
                continue;
            }
            if !status.is_success() {
                warn!(%url, %status, "availability fetch failed");
                return Err(BackendError::Status(status.as_u16()));
            }
            let body: Value = response.json().await?;
            return parse_availability(body);
        }
        Err(BackendError::NoEndpoint(tutor_id.to_string()))
    }

    pub async fn create_booking(
        &self,
        booking: &BookingRequest,
        bearer: Option<&str>,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint(&["bookings"])?;
        let mut request = self.client.post(url.as_str()).json(booking);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "booking creation failed");
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

/// Accepts a bare array or an object wrapping the array under a known key.
pub fn parse_availability(body: Value) -> Result<Vec<WeeklyAvailability>, BackendError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                BackendError::UnexpectedBody("object without availability list".into())
            })?,
        other => {
            return Err(BackendError::UnexpectedBody(format!(
                "expected array, got {other}"
            )));
        }
    };

    // Records that don't even deserialize are dropped the same way invalid ones are.
    Ok(items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value::<WeeklyAvailability>(item)
                .map_err(|err| debug!(error = %err, "dropping undecodable availability record"))
                .ok()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let body = json!([
            {"dayOfWeek": "MONDAY", "startTime": "09:00", "endTime": "12:00"}
        ]);
        let records = parse_availability(body).unwrap();
        assert_eq!(records, vec![WeeklyAvailability::new("MONDAY", "09:00", "12:00")]);
    }

    #[test]
    fn test_parse_wrapped_array() {
        let body = json!({"data": [
            {"day_of_week": "friday", "start_time": "10:00", "end_time": "11:00"},
            {"dayOfWeek": 5, "startTime": "10:00", "endTime": "11:00"}
        ]});
        let records = parse_availability(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].day_of_week.as_deref(), Some("friday"));
    }

    #[test]
    fn test_parse_unexpected_body() {
        assert!(matches!(
            parse_availability(json!({"message": "nope"})),
            Err(BackendError::UnexpectedBody(_))
        ));
        assert!(parse_availability(json!("text")).is_err());
    }

    #[test]
    fn test_availability_urls_order() {
        let client = BackendClient::new(Url::parse("https://api.example.com/api/").unwrap());
        let urls: Vec<String> = client
            .availability_urls("42")
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://api.example.com/api/tutors/42/availability",
                "https://api.example.com/api/availability/tutor/42",
                "https://api.example.com/api/availability?tutorId=42",
            ]
        );
    }

    #[test]
    fn test_availability_urls_escape_tutor_id() {
        let client = BackendClient::new(Url::parse("http://backend/api/").unwrap());
        let urls = client.availability_urls("../../admin?x/#").unwrap();
        assert_eq!(
            urls[0].as_str(),
            "http://backend/api/tutors/..%2F..%2Fadmin%3Fx%2F%23/availability"
        );
        assert_eq!(urls[1].path(), "/api/availability/tutor/..%2F..%2Fadmin%3Fx%2F%23");
        assert_eq!(urls[2].path(), "/api/availability");
        assert!(urls.iter().all(|url| url.host_str() == Some("backend")));
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let client = BackendClient::new(Url::parse("http://backend/api").unwrap());
        assert_eq!(
            client.endpoint(&["bookings"]).unwrap().as_str(),
            "http://backend/api/bookings"
        );
    }
}
