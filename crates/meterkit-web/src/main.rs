//! meterkit web demo
//!
//! - `GET /metrics/counter`, `/metrics/timer`, `/metrics/timed-annotation`
//! - config from `$METERKIT_CONFIG` (default `meterkit.yaml`)
//! - log level via `RUST_LOG`

use tracing_subscriber::{fmt, EnvFilter};

use meterkit_web::{app_state, config, error::Result, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "meterkit-web failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("METERKIT_CONFIG").unwrap_or_else(|_| "meterkit.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "meterkit-web starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
