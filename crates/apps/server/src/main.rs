use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use compute::{NormalizationMode, TableStatsSource};
use foundation::NumberLocale;
use formats::FeatureTable;
use layers::MapConfig;
use panel::{PanelConfig, PanelEvent, RefreshController};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;

use api::AppState;

#[derive(Clone, Debug)]
struct ServerConfig {
    addr: SocketAddr,
    data: PathBuf,
    initial_mode: NormalizationMode,
    map_config: Option<PathBuf>,
}

impl ServerConfig {
    fn from_env() -> Result<Self, String> {
        let addr = env_var_or("POPMAP_ADDR", "127.0.0.1:9200");
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| format!("invalid POPMAP_ADDR {addr:?}: {e}"))?;
        let data = env::var("POPMAP_DATA")
            .map(PathBuf::from)
            .map_err(|_| "POPMAP_DATA must point at a GeoJSON FeatureCollection".to_string())?;
        let initial_mode = env_var_or("POPMAP_MODE", "log")
            .parse::<NormalizationMode>()
            .map_err(|e| format!("invalid POPMAP_MODE: {e}"))?;
        Ok(Self {
            addr,
            data,
            initial_mode,
            map_config: env::var("POPMAP_MAP_CONFIG").ok().map(PathBuf::from),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let table = match FeatureTable::from_path(&config.data) {
        Ok(t) => Arc::new(t),
        Err(err) => {
            error!("failed to load {}: {err}", config.data.display());
            return ExitCode::FAILURE;
        }
    };
    if table.is_empty() {
        warn!("{} contains no features", config.data.display());
    }

    let map = match &config.map_config {
        Some(path) => match MapConfig::from_path(path) {
            Ok(m) => m,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => MapConfig::population_2020(),
    };

    let panel_config = PanelConfig {
        initial_mode: config.initial_mode,
        bar_color: map.layer_color(),
        ..PanelConfig::default()
    };
    let source = Arc::new(TableStatsSource::new(Arc::clone(&table)));
    let (panel, panel_task) = panel::spawn(RefreshController::new(source, panel_config));

    // The data is already loaded, so the view is ready as soon as we start.
    if let Err(err) = panel.send(PanelEvent::ViewReady).await {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    info!(
        features = table.len(),
        mode = %config.initial_mode,
        "loaded {}",
        config.data.display()
    );

    let state = AppState {
        map: Arc::new(map),
        table,
        panel,
        locale: NumberLocale::en_us(),
    };

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(l) => l,
        Err(err) => {
            error!("failed to bind {}: {err}", config.addr);
            return ExitCode::FAILURE;
        }
    };

    info!("popmap server listening on http://{}", config.addr);
    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(err) = served {
        error!("server error: {err}");
        return ExitCode::FAILURE;
    }

    // Dropping the router released the last panel handle; let in-flight
    // refreshes settle before exiting.
    match panel_task.await {
        Ok(controller) => info!(metrics = ?controller.metrics().snapshot(), "panel stopped"),
        Err(err) => warn!("panel task ended abnormally: {err}"),
    }
    ExitCode::SUCCESS
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(api::healthz))
        .route("/map/config", get(api::get_map_config))
        .route("/panel", get(api::get_panel))
        .route("/panel/metrics", get(api::get_panel_metrics))
        .route("/panel/normalization", post(api::post_normalization))
        .route("/features/:index/popup", get(api::get_feature_popup))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
