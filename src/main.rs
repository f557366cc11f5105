use std::sync::Arc;

use anyhow::Context;

use mindcare_api::bootstrap::{self, BootstrapOutcome};
use mindcare_api::config::AppConfig;
use mindcare_api::database::PgCredentialStore;
use mindcare_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindcare_api=info,tower_http=info".into()),
        )
        .init();

    // Missing secrets are a startup failure, not a runtime fallback
    let config = AppConfig::from_env().context("configuration error")?;

    let store = PgCredentialStore::connect(&config.database)
        .await
        .context("failed to connect to credential store")?;
    store
        .ensure_schema()
        .await
        .context("failed to prepare credential store schema")?;

    let state = AppState::new(&config, Arc::new(store));

    // The default admin must exist before the listener opens; login only
    // ever reads accounts.
    let outcome = bootstrap::ensure_default_admin(
        state.store.as_ref(),
        &state.bootstrap,
        state.bcrypt_cost,
    )
    .await
    .context("bootstrap failed")?;
    match outcome {
        BootstrapOutcome::Created(admin) => {
            tracing::info!(admin_id = %admin.id, "default admin created")
        }
        BootstrapOutcome::Existing(admin) => {
            tracing::info!(admin_id = %admin.id, "default admin present")
        }
    }

    let app = mindcare_api::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("mindcare API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
