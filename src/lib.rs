use eyre::{Result, WrapErr};
use tokio::{
    select,
    signal::unix::{SignalKind, signal},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub mod core;

mod config;
pub use config::{Config, config_from_env, env_var_info};

pub mod metrics;

mod service;
pub use service::serve_healthcheck;

pub mod telemetry;

/// Registers SIGINT/SIGTERM handlers and returns a [`CancellationToken`]
/// that fires when either is received. The scheduler, canceller, and
/// healthcheck server all observe this token at their suspension points
/// (spec.md §5).
pub fn handle_signals() -> Result<CancellationToken> {
    let cancellation_token = CancellationToken::new();

    let mut sigint = signal(SignalKind::interrupt()).wrap_err("failed to register SIGINT handler")?;
    let mut sigterm = signal(SignalKind::terminate()).wrap_err("failed to register SIGTERM handler")?;

    tokio::spawn({
        let cancel_token = cancellation_token.clone();
        async move {
            select! {
                _ = sigint.recv() => {
                    info!("received SIGINT, shutting down");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                }
            }
            cancel_token.cancel();
        }
    });

    debug!("ready to handle SIGINT or SIGTERM");
    Ok(cancellation_token)
}
