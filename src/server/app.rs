use std::any::Any;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::{extract::FromRef, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use routes::{
    category_router, method_not_allowed, options, questions_router, quizzes_router, ApiError,
};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::configuration::ApplicationSettings;

const ALLOWED_METHODS: &str = "GET,POST,PATCH,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type,Authorization";

#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
}

pub fn app(pool: SqlitePool) -> Router {
    let state = AppState { pool };

    Router::new()
        .route(
            "/metrics",
            get(metrics).options(options).fallback(method_not_allowed),
        )
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quizzes_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::NotFound
        })
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {details}");
    ApiError::InternalServerError.into_response()
}

pub async fn run_server(pool: SqlitePool, settings: &ApplicationSettings) -> anyhow::Result<()> {
    let addr = settings.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app(pool))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {e}");
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
                tracing::warn!("Cannot listen for SIGTERM: {e}");
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

async fn metrics() -> Result<Response, ApiError> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder
        .encode(&metrics, &mut buf)
        .map_err(|e| {
            tracing::error!("Cannot encode metrics: {e}");
            ApiError::InternalServerError
        })?;
    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_owned())],
        buf,
    )
        .into_response())
}
