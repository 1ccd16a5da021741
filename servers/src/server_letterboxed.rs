//! # Letter Boxed Solutions Server
//!
//! Serves today's Letter Boxed puzzle together with every one- and two-word
//! solution found in its dictionary.
//!
//! ## Startup:
//! 1. Load `.env`, then resolve config (defaults, config file, env/CLI).
//! 2. Set up logging to stdout and a log file.
//! 3. Open the persisted snapshot record.
//! 4. Bootstrap: answer one query internally so a missing or expired record
//!    is refreshed before traffic arrives. A failure is logged, not fatal.
//! 5. Spawn the background refresh scheduler and the HTTP listener.
//!
//! Ctrl-C or SIGTERM stops the scheduler and drains the HTTP server.

use anyhow::Result;
use std::net::{IpAddr, SocketAddr};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

mod letterboxed_logic;
use letterboxed_logic::{config, logger, routes, state};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let (config, notes) = config::load_config();
    let log_dir = config.log_dir.clone().unwrap_or_else(|| "./logs".into());
    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    let _log_guard = logger::setup_logging(&log_dir, &log_level)?;
    for note in &notes {
        warn!("{}", note);
    }

    let app_state = state::AppState::from_config(&config)?;

    match app_state.query.handle_query().await {
        Ok(snapshot) => info!(
            print_date = %snapshot.print_date(),
            expiration = ?snapshot.expiration(),
            "Startup bootstrap complete"
        ),
        Err(e) => error!(kind = e.kind(), "Startup bootstrap failed: {}", e),
    }

    let (shutdown_tx, _) = broadcast::channel(1);

    let scheduler_handle = tokio::spawn(app_state.scheduler().run(shutdown_tx.subscribe()));

    let ip: IpAddr = config.bind_addr.as_deref().unwrap_or("0.0.0.0").parse()?;
    let addr = SocketAddr::new(ip, config.port.unwrap_or(8000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting HTTP server on http://{}", addr);

    let mut server_shutdown = shutdown_tx.subscribe();
    let server_handle = tokio::spawn(async move {
        let app = routes::router(app_state);
        let result = axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
                info!("HTTP server received shutdown signal.");
            })
            .await;
        if let Err(e) = result {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        warn!("Could not install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }

    // Send shutdown signal to all components
    let _ = shutdown_tx.send(());

    // Wait for components to shut down
    let _ = tokio::try_join!(scheduler_handle, server_handle);

    info!("Shutdown complete.");
    Ok(())
}
