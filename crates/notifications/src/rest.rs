use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::model::Notification;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct MarkSeenBody<'a> {
    ids: &'a [String],
    seen: bool,
}

/// REST client for the notification backend.
pub struct NotificationApi {
    client: reqwest::Client,
    base_url: String,
}

impl NotificationApi {
    pub fn new(base_url: String, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self { client, base_url }
    }

    /// Fetches the user's full notification list, newest first.
    pub async fn fetch(&self, user_id: &str, bearer: &str) -> Result<Vec<Notification>, ApiError> {
        let list = self
            .client
            .get(format!("{}/notifications/get/{}", self.base_url, user_id))
            .bearer_auth(bearer)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Notification>>()
            .await?;
        Ok(list)
    }

    /// Marks a batch of notifications seen. Only the status matters; the
    /// backend sends no response body.
    pub async fn mark_seen(&self, ids: &[String], bearer: &str) -> Result<(), ApiError> {
        self.client
            .put(format!("{}/notifications/update", self.base_url))
            .bearer_auth(bearer)
            .json(&MarkSeenBody { ids, seen: true })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
