use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use calc_core::{CalcError, CalcResult, HistoryStore};
use calc_store::SqliteStore;

use crate::calculators::{calculator_definitions, run_calculator};
use crate::protocol::{
    ApiError, ComputeResponse, HistoryQuery, HistoryResponse, SaveRequest, SaveResponse,
};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub bind: String,
    pub default_limit: usize,
    pub purge_interval: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".into(),
            default_limit: DEFAULT_HISTORY_LIMIT,
            purge_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
    default_limit: usize,
}

impl AppState {
    pub fn new(store: SqliteStore, default_limit: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            default_limit,
        }
    }

    /// Run a store operation on the blocking pool so SQLite never stalls a worker.
    async fn with_store<T, F>(&self, f: F) -> CalcResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteStore) -> CalcResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let store = store
                .lock()
                .map_err(|e| CalcError::Database(format!("store lock poisoned: {e}")))?;
            f(&store)
        })
        .await
        .map_err(|e| CalcError::Database(format!("store task failed: {e}")))?
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/calculate", post(save_calculation))
        .route("/api/history/{calculator_type}", get(history))
        .route("/api/calculators", get(list_calculators))
        .route("/api/compute/{calculator_type}", post(compute))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn save_calculation(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::save_failed(e.body_text()))?;
    let record = req.into_record().map_err(ApiError::save_failed)?;
    let id = state
        .with_store(move |s| s.save(record))
        .await
        .map_err(ApiError::save_failed)?;
    debug!(%id, "calculation logged");
    Ok(Json(SaveResponse::saved(id)))
}

async fn history(
    State(state): State<AppState>,
    Path(calculator_type): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query.effective_limit(state.default_limit);
    let history = state
        .with_store(move |s| s.recent(&calculator_type, limit))
        .await
        .map_err(ApiError::history_failed)?;
    Ok(Json(HistoryResponse {
        success: true,
        history,
    }))
}

async fn list_calculators() -> Json<Value> {
    Json(calculator_definitions())
}

async fn compute(
    Path(calculator_type): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ComputeResponse>, ApiError> {
    let Json(input) = payload.map_err(|e| {
        ApiError::new(StatusCode::BAD_REQUEST, "Calculation failed", e.body_text())
    })?;
    let computed = tokio::task::spawn_blocking(move || run_calculator(&calculator_type, input))
        .await
        .map_err(|e| {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Calculation failed", e)
        })??;
    Ok(Json(ComputeResponse {
        success: true,
        computed,
    }))
}

async fn health() -> &'static str {
    "ok"
}

fn spawn_purge_task(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            match state.with_store(|s| s.purge_expired(Utc::now())).await {
                Ok(removed) => debug!(removed, "purge tick"),
                Err(e) => warn!("purge of expired calculations failed: {e}"),
            }
        }
    })
}

/// Bind, start serving in the background and return the bound address.
pub async fn start(
    store: SqliteStore,
    opts: ServerOptions,
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(opts.bind.as_str()).await?;
    let addr = listener.local_addr()?;

    let state = AppState::new(store, opts.default_limit);
    let purge = spawn_purge_task(state.clone(), opts.purge_interval);
    let app = router(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("server stopped: {e}");
        }
        purge.abort();
    });
    info!("listening on {}", addr);
    Ok((addr, handle))
}

/// Serve until the server task ends.
pub async fn serve(store: SqliteStore, opts: ServerOptions) -> anyhow::Result<()> {
    let (_, handle) = start(store, opts).await?;
    handle.await?;
    Ok(())
}
