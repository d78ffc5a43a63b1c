use anyhow::Context as _;
use api::server::{router, AppState};
use api::settings::Settings;
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also loads .env, before the log filter reads RUST_LOG
    let settings = Settings::new().context("Failed to load settings")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::new(&settings).context("Failed to create REST client")?;

    // Session layer configuration
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(settings.session.cookie.clone())
        .with_secure(settings.session.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(settings.session.days)));

    let app = router(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&settings.server.address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.address))?;
    tracing::info!("Server listening on {}", settings.server.address);
    tracing::info!("Proxying REST requests to {}", settings.rest.url);

    axum::serve(listener, app).await?;
    Ok(())
}
