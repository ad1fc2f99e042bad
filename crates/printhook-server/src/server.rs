// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener lifecycle: bind, log what we will print to, serve until SIGINT or
// SIGTERM (the process supervisor's stop signal), then drain.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use printhook_core::config::GatewayConfig;
use printhook_core::error::{GatewayError, Result};
use printhook_print::Spooler;

use crate::router::build_router;
use crate::state::AppState;

/// Run the gateway until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server loop
/// fails.
pub async fn serve(config: GatewayConfig, spooler: Arc<dyn Spooler>) -> Result<()> {
    let addr = config.socket_addr();
    if !addr.ip().is_loopback() {
        warn!(addr = %addr, "binding a non-loopback address; the gateway is meant to sit behind the tunnel");
    }

    let state = AppState::new(config, spooler);
    log_target_printer(&state).await;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Io(std::io::Error::new(e.kind(), format!("bind {addr}: {e}"))))?;

    info!(
        addr = %addr,
        workers = state.config.workers,
        max_copies = state.config.max_copies,
        "printhook listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("printhook stopped");
    Ok(())
}

/// Startup banner: which printer jobs will land on.
async fn log_target_printer(state: &AppState) {
    match state.printing.target_printer().await {
        Ok(Some(printer)) => info!(
            printer = %printer.name,
            accepting = printer.accepting_jobs,
            options = ?state.config.print_options,
            "print target resolved"
        ),
        Ok(None) => warn!(
            configured = state.printing.configured_printer().unwrap_or("<default>"),
            "no printer configured or found; /print will fail until one is added"
        ),
        Err(e) => warn!(error = %e, "could not query the spooler at startup"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received; draining in-flight requests");
}
