use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use folio_server::state::AppState;

/// `folio health` — liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$FOLIO_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("FOLIO_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Health-check subcommand — must be handled before anything else so the
    // binary stays small and fast when used as a Docker HEALTHCHECK probe.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Initialise structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folio_server=info".parse()?)
                .add_directive("folio_duckdb=info".parse()?),
        )
        .json()
        .init();

    let cfg = folio_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Open the store: file-backed when a data directory is configured,
    // otherwise an in-memory stand-in with no durability across restarts.
    let db = match &cfg.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let db_path = format!("{}/folio.db", dir);
            folio_duckdb::DuckDbBackend::open(&db_path)?
        }
        None => {
            tracing::warn!(
                "FOLIO_DATA_DIR not set — analytics stored in memory only and lost on restart"
            );
            folio_duckdb::DuckDbBackend::open_in_memory()?
        }
    };

    // Log a warning (not panic) if the GeoIP database is absent. Visits are
    // stored with empty location/country fields.
    if !std::path::Path::new(&cfg.geoip_path).exists() {
        tracing::warn!(
            geoip_path = %cfg.geoip_path,
            "GeoIP database not found. Visits stored without location fields. \
             Set FOLIO_GEOIP_PATH to a MaxMind City database to enable geo lookups."
        );
    }

    // Auth initialization: make sure the signing secret exists up front so
    // the first login does not pay for secret generation.
    match &cfg.admin_auth {
        folio_core::config::AdminAuth::Password(_) => {
            match db.ensure_jwt_secret().await {
                Ok(_) => info!("JWT secret ready"),
                Err(e) => tracing::error!(error = %e, "Failed to ensure JWT secret"),
            }
            info!("Admin auth enabled");
        }
        folio_core::config::AdminAuth::Disabled => {
            tracing::warn!(
                "FOLIO_ADMIN_PASSWORD not set — admin login disabled, every attempt rejected"
            );
        }
    }

    let state = Arc::new(AppState::new(db, cfg.clone()));

    // Spawn background buffer-flush task.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            state.run_buffer_flush_loop().await;
        });
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = folio_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "folio listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let state_for_shutdown = Arc::clone(&state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    // Best-effort final flush so buffered visits survive a clean shutdown.
    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state_for_shutdown.flush_buffer(),
    )
    .await
    .ok();

    Ok(())
}
