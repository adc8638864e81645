use std::sync::Arc;

use anyhow::Context;

use tenant_onboarding::config::ServerConfig;
use tenant_onboarding::onboarding::{
    DocumentForm, OnboardingRouteState, WizardController, onboarding_routes,
};
use tenant_onboarding::store::{LibSqlBackend, SnapshotStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("Invalid onboarding configuration")?;

    eprintln!("📄 Tenant Onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Wizard API: http://0.0.0.0:{}/api/onboarding/state", config.port);
    eprintln!("   Steps: {}", config.wizard.step_count);
    eprintln!("   Storage scope: {}", config.wizard.storage_scope);
    match config.wizard.dashboard_url {
        Some(ref url) => eprintln!("   Dashboard: {}", url),
        None => eprintln!("   Dashboard: (none, wizard restarts on completion)"),
    }

    // ── Snapshot store ───────────────────────────────────────────────────
    let store: Arc<dyn SnapshotStore> = if config.db_path == ":memory:" {
        Arc::new(LibSqlBackend::new_memory().await?)
    } else {
        let path = std::path::Path::new(&config.db_path);
        Arc::new(
            LibSqlBackend::new_local(path)
                .await
                .with_context(|| format!("Failed to open database at {}", config.db_path))?,
        )
    };
    eprintln!("   Database: {}", config.db_path);

    // ── Wizard ───────────────────────────────────────────────────────────
    let mut controller =
        WizardController::new(config.wizard.clone(), DocumentForm::default(), store)?;
    if controller.rehydrate().await? {
        eprintln!("   Resumed at step {}", controller.current_step());
    }

    let app = onboarding_routes(OnboardingRouteState::new(controller));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
