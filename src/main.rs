use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;

use vibe_assistant::config::Settings;
use vibe_assistant::server::{create_app, AppState};
use vibe_assistant::tasks::SessionCleanupTask;
use vibe_assistant::telemetry::init_telemetry;
use vibe_assistant::template::create_template_watcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing; the guard flushes spans on exit
    let _telemetry = init_telemetry(&settings.logging, &settings.otel)?;
    tracing::info!("Configuration loaded");

    if !settings.llm.has_api_key() {
        tracing::warn!(
            model = %settings.llm.model,
            "LLM API key is not set; generation endpoints will fail until one is configured"
        );
    }

    // Create application state
    let state = AppState::new(settings.clone())?;
    tracing::info!(
        templates_dir = %settings.templates.dir.display(),
        "Application state initialized"
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Start session cleanup task in background
    let cleanup_task = SessionCleanupTask::new(
        settings.sessions.clone(),
        state.sessions.clone(),
        shutdown_tx.subscribe(),
    );
    let cleanup_handle = tokio::spawn(async move {
        cleanup_task.run().await;
    });

    // Start template hot reload when enabled
    let watcher = create_template_watcher(&settings.templates);
    let watcher_handle = watcher
        .start(state.templates.clone(), shutdown_tx.subscribe())
        .await;

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_tx))
        .await?;

    // Wait for background tasks to finish
    tracing::info!("Waiting for background tasks to finish...");
    if let Err(e) = cleanup_handle.await {
        tracing::error!(error = %e, "Session cleanup task failed");
    }
    if let Some(handle) = watcher_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Template watcher task failed");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Stop background tasks
    let _ = shutdown_tx.send(());
}
