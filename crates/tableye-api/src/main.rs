//! Tableye API 서버.
//!
//! 설정을 로드하고 인증 라우터를 구성한 뒤 Axum 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use tableye_api::metrics::setup_metrics_recorder;
use tableye_api::middleware::metrics_layer;
use tableye_api::repository::PgUserStore;
use tableye_api::routes::create_api_router;
use tableye_api::state::AppState;
use tableye_core::{init_logging, AppConfig, InMemoryUserStore, LogConfig, UserStore};

/// CORS 레이어 생성.
///
/// 쿠키 기반 인증을 위해 클라이언트 origin 하나만 허용하고 자격 증명을 포함합니다.
fn cors_layer(client_origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = client_origin
        .parse()
        .with_context(|| format!("invalid client origin: {client_origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load_default().context("failed to load configuration")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Tableye API server");

    let metrics_handle = setup_metrics_recorder().context("failed to install metrics recorder")?;

    // 저장소 선택: DB URL이 있으면 Postgres, 없으면 인메모리
    let (store, db_pool): (Arc<dyn UserStore>, Option<sqlx::PgPool>) = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
                .connect(url)
                .await
                .context("failed to connect to database")?;
            info!("Connected to database");
            let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            (store, Some(pool))
        }
        None => {
            warn!("database.url not set, using in-memory user store");
            let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
            (store, None)
        }
    };

    let mut state = AppState::from_config(&config.auth, store)?;
    if let Some(pool) = db_pool {
        state = state.with_db_pool(pool);
    }
    let state = Arc::new(state);

    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let app = create_api_router(state)
        .merge(metrics_router)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer(&config.server.client_origin)?);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
