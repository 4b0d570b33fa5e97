use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campaigner_config::Settings;
use campaigner_session::{SessionStore, decode_identity, handoff};
use campaigner_shell::{DashboardShell, relative_time};

/// Headless Campaigner dashboard client.
#[derive(Debug, Parser)]
#[command(name = "campaigner-shell")]
struct Args {
    /// Landing URL from the login redirect, e.g. "https://host/?token=...".
    #[arg(long)]
    landing_url: Option<String>,

    /// Bearer token to establish the session with directly.
    #[arg(long, conflicts_with = "landing_url")]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "campaigner_shell=debug,campaigner_notifications=debug,campaigner_session=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!(
        api = %settings.api.base_url,
        socket = %settings.socket.url,
        "Starting Campaigner dashboard shell"
    );

    let args = Args::parse();
    let session = Arc::new(SessionStore::new());

    if let Some(location) = &args.landing_url {
        let outcome = handoff::consume_landing_location(&session, location);
        if outcome.established {
            info!(location = %outcome.canonical_location, "Session established from landing URL");
        }
    } else if let Some(token) = args.token {
        match decode_identity(&token) {
            Ok(identity) => {
                info!(user_id = %identity.user_id, "Session established from token");
                session.establish(identity, token);
            }
            Err(e) => warn!(%e, "Invalid token"),
        }
    }

    if !session.is_authenticated() {
        warn!("No session established; dashboard stays inactive");
    }

    let shell = DashboardShell::new(&settings, session);
    shell.activate().await;

    info!(unseen = shell.unseen_count(), "Dashboard active");
    for n in shell.notifications() {
        info!(
            title = %n.title,
            age = %relative_time::from_now(n.created_at),
            seen = n.seen,
            "Notification"
        );
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    shell.deactivate().await;

    Ok(())
}
