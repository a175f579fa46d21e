//! Router assembly and TCP listener setup

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use socket2::{Domain, Protocol, Socket, TcpKeepalive, Type};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::buckets::{routes as buckets_routes, BucketService};
use crate::features::objects::{routes as objects_routes, ObjectService};
use crate::features::remote::{routes as remote_routes, RemoteFileService};

const LISTEN_BACKLOG: i32 = 1024;
const SOCKET_BUFFER_SIZE: usize = 256 * 1024;
const KEEPALIVE_IDLE: Duration = Duration::from_secs(60);

/// Services shared by every request
pub struct AppServices {
    pub buckets: Arc<BucketService>,
    pub objects: Arc<ObjectService>,
    pub remote: Arc<RemoteFileService>,
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

fn swagger_router(config: &Config) -> Router {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    }
    .modify(&mut openapi);

    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    match config.swagger.credentials() {
        Some(credentials) => {
            tracing::info!("Swagger UI basic auth enabled");
            swagger.layer(from_fn_with_state(
                middleware::BasicCredentials(Arc::from(credentials)),
                middleware::require_basic_auth,
            ))
        }
        None => {
            tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
            swagger
        }
    }
}

/// Full application router with the request-id, tracing, CORS and panic layers
pub fn build_router(config: &Config, services: AppServices) -> Router {
    Router::new()
        .merge(swagger_router(config))
        .merge(buckets_routes::routes(services.buckets))
        .merge(objects_routes::routes(
            services.objects,
            config.app.max_request_body_size,
        ))
        .merge(remote_routes::routes(services.remote))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::cors_layer(
                    config.app.cors_allowed_origins.clone(),
                ))
                .layer(CatchPanicLayer::custom(middleware::handle_panic)),
        )
}

/// Bind a tuned, non-blocking TCP listener
pub fn bind_listener(addr: SocketAddr) -> std::io::Result<tokio::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;
    socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.set_send_buffer_size(SOCKET_BUFFER_SIZE)?;

    let keepalive = TcpKeepalive::new().with_time(KEEPALIVE_IDLE);
    #[cfg(target_os = "linux")]
    let keepalive = keepalive
        .with_interval(Duration::from_secs(10))
        .with_retries(3);
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    tokio::net::TcpListener::from_std(socket.into())
}
