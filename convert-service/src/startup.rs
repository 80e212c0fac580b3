use crate::config::ConvertConfig;
use crate::handlers;
use crate::services::{CommandConverter, Converter, MediaStorage};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, metrics_middleware, request_id_middleware, security_headers_middleware,
};
use service_core::tower::ServiceBuilder;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ConvertConfig,
    pub storage: MediaStorage,
    pub converter: Arc<dyn Converter>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Builds the service with the external command converter from `config`.
    pub async fn build(config: ConvertConfig) -> Result<Self, AppError> {
        let converter: Arc<dyn Converter> = Arc::new(CommandConverter::new(&config.converter));
        Self::build_with_converter(config, converter).await
    }

    pub async fn build_with_converter(
        config: ConvertConfig,
        converter: Arc<dyn Converter>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            storage: MediaStorage::new(&config.media.root),
            config: config.clone(),
            converter,
        };

        let app = build_router(state.clone());

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            media_root = %config.media.root.display(),
            media_url = %config.media.url,
            converter = %state.converter.name(),
            "Listening on {}",
            port
        );

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

/// API routes are served with and without the trailing slash, at the root
/// and under `/api`. Converted files are mounted under the media prefix
/// unless it points at another host.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/convert/", post(handlers::convert_pdf))
        .route("/convert", post(handlers::convert_pdf))
        .route("/health/", get(handlers::health_check))
        .route("/health", get(handlers::health_check));

    let body_limit = match state.config.http.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .route("/metrics", get(handlers::metrics_endpoint));

    let media_url = &state.config.media.url;
    if media_url.starts_with('/') {
        let mount = format!("{}docx", media_url);
        let downloads = ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment"),
            ))
            .service(ServeDir::new(state.storage.docx_dir()));
        router = router.nest_service(&mount, downloads);
    }

    router
        .layer(body_limit)
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
