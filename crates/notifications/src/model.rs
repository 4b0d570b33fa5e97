use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One notification as the backend delivers it, over REST and push alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub seen: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
