mod bootstrap;
mod conversations;
mod health;

use std::time::Duration;

use anyhow::Result;
use axum::Router;
use pizzabot_core::config::{AppConfig, LoadOptions};

const FORCED_EXIT_CODE: i32 = 1;

fn init_logging(config: &AppConfig) {
    use pizzabot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let router = Router::new()
        .merge(health::router(app.agent_runtime.menu_source()))
        .merge(conversations::router(
            app.agent_runtime.clone(),
            Duration::from_secs(app.config.server.session_idle_secs),
        ));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "pizzabot-server started"
    );

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown(grace)).await?;

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "pizzabot-server stopped"
    );

    Ok(())
}

/// Resolves on ctrl-c. In-flight turns then get `grace` to finish; past that
/// the process exits with a failure status.
async fn wait_for_shutdown(grace: Duration) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "failed to listen for shutdown signal"
        );
        return;
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = grace.as_secs(),
        "pizzabot-server stopping"
    );

    tokio::spawn(enforce_grace(grace, |code| std::process::exit(code)));
}

async fn enforce_grace(grace: Duration, exit: impl FnOnce(i32)) {
    tokio::time::sleep(grace).await;
    tracing::error!(
        event_name = "system.server.forced_exit",
        correlation_id = "shutdown",
        "graceful shutdown window elapsed with requests still in flight"
    );
    exit(FORCED_EXIT_CODE);
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::enforce_grace;

    #[tokio::test]
    async fn elapsed_grace_window_exits_with_failure_code() {
        let seen = Arc::new(Mutex::new(None));
        let recorder = seen.clone();

        enforce_grace(Duration::ZERO, move |code| {
            *recorder.lock().expect("recorder lock") = Some(code);
        })
        .await;

        let code = seen.lock().expect("recorder lock").expect("exit should be requested");
        assert_ne!(code, 0);
    }
}
