use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use issues::models::{DirectoryListing, ObjectListing};
use issues::{IssueService, IssueStore, JsonFileIssueStore, MemoryIssueStore, DEFAULT_ISSUE_LIMIT};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;

#[derive(Clone)]
pub(crate) struct AppState {
    issues: IssueService,
    listing: Arc<dyn ObjectListing>,
}

#[derive(Debug, Clone)]
struct ServerConfig {
    addr: SocketAddr,
    store_path: Option<PathBuf>,
    issue_limit: usize,
    models_root: PathBuf,
    models_bucket: String,
}

impl ServerConfig {
    fn from_env() -> Result<Self, String> {
        let addr = env::var("FACILITY_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let addr = addr
            .parse()
            .map_err(|e| format!("invalid FACILITY_ADDR `{addr}`: {e}"))?;
        Ok(Self {
            addr,
            store_path: env::var("ISSUES_STORE_PATH").ok().map(PathBuf::from),
            issue_limit: env_var_usize("ISSUES_LIMIT", DEFAULT_ISSUE_LIMIT),
            models_root: env::var("MODELS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/models")),
            models_bucket: env::var("MODELS_BUCKET")
                .unwrap_or_else(|_| "facility-models".to_string()),
        })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(2);
        }
    };

    let store: Arc<dyn IssueStore> = match &config.store_path {
        Some(path) => {
            info!("issues persisted to {}", path.display());
            Arc::new(JsonFileIssueStore::new(path))
        }
        None => {
            info!("ISSUES_STORE_PATH not set; issues are kept in memory");
            Arc::new(MemoryIssueStore::new())
        }
    };

    let state = AppState {
        issues: IssueService::new(store).with_limit(config.issue_limit),
        listing: Arc::new(DirectoryListing::new(
            &config.models_root,
            config.models_bucket.clone(),
        )),
    };

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {err}", config.addr);
            std::process::exit(1);
        }
    };

    info!("facility server listening on http://{}", config.addr);
    if let Err(err) = axum::serve(listener, router(state)).await {
        error!("server error: {err}");
    }
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/data/facilities", get(api::list_facilities))
        .route("/api/data/facilities/:facility", get(api::get_model_areas))
        .route(
            "/api/data/facilities/:facility/issues",
            get(api::list_issues).post(api::create_issue),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
