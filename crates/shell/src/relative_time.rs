use chrono::{DateTime, Utc};

/// Relative age of a notification for display, e.g. "just now", "5m ago".
pub fn from_now(instant: DateTime<Utc>) -> String {
    between(instant, Utc::now())
}

fn between(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(instant);
    let seconds = delta.num_seconds();

    if seconds < 45 {
        return "just now".to_string();
    }

    let minutes = delta.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes.max(1));
    }

    let hours = delta.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = delta.num_days();
    if days < 30 {
        return format!("{days}d ago");
    }

    instant.format("%b %-d, %Y").to_string()
}
