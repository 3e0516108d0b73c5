//! Router builder for the bookstack HTTP server

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Json, Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use bookstack_kernel::settings::DocsSettings;

use crate::response::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstack API",
        version = "1.0.0",
        description = "CRUD service for book records"
    ),
    paths(health_check),
    tags((name = "Health", description = "Service liveness"))
)]
struct ApiDoc;

/// Liveness check
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    responses((status = 200, description = "OK", body = String))
)]
pub async fn health_check() -> &'static str {
    "ok"
}

/// Give the bare 408 produced by the timeout layer the usual JSON envelope
async fn timeout_envelope(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    tracing::warn!("request timed out");
    (
        StatusCode::REQUEST_TIMEOUT,
        Json(ApiResponse::<()>::message("Request timed out")),
    )
        .into_response()
}

/// Request ID generator producing time-ordered UUIDs
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::now_v7().to_string().parse::<HeaderValue>().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// Builder for constructing the main HTTP router
///
/// Routes and docs must be added before any `with_*` middleware call, since
/// axum layers only wrap the routes already present.
pub struct RouterBuilder {
    router: Router,
    openapi: utoipa::openapi::OpenApi,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            openapi: ApiDoc::openapi(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge a module's routes and collect the OpenAPI operations they carry
    pub fn mount_module(mut self, module_name: &str, module_router: OpenApiRouter) -> Self {
        let (router, api) = module_router.split_for_parts();
        tracing::info!(
            module = module_name,
            operations = api.paths.paths.len(),
            "mounting module routes"
        );
        self.router = self.router.merge(router);
        self.openapi.merge(api);
        self
    }

    /// The OpenAPI document assembled so far
    pub fn openapi(&self) -> &utoipa::openapi::OpenApi {
        &self.openapi
    }

    /// Serve Swagger UI and the raw OpenAPI document
    pub fn with_docs(mut self, docs: &DocsSettings) -> Self {
        if !docs.enabled {
            return self;
        }

        tracing::info!(ui = %docs.path, spec = %docs.spec_path, "serving API documentation");
        self.router = self
            .router
            .merge(SwaggerUi::new(docs.path.clone()).url(docs.spec_path.clone(), self.openapi.clone()));
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Generate an `x-request-id` for every request and echo it back
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)))
            .layer(middleware::map_response(timeout_envelope));
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
