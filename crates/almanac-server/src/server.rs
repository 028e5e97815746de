//! HTTP server implementation.
//!
//! Built on Hyper and Tokio. The server binds a TCP listener, spawns a
//! task per connection, and drains in-flight connections on shutdown.
//!
//! The full request pipeline (identity extraction, routing, body
//! collection, handler dispatch, error translation) is also reachable
//! in-process through [`Server::oneshot`], which is how the integration
//! tests exercise the service without opening a socket.
//!
//! # Example
//!
//! ```rust,ignore
//! use almanac_server::{Server, HandlerRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder()
//!         .http_addr("0.0.0.0:8080")
//!         .handlers(registry)
//!         .router(router)
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use almanac_core::{ApiError, CallerIdentity, ErrorBody, RequestContext};

use crate::config::ServerConfig;
use crate::handler::{HandlerError, HandlerRegistry, InvokeError, RawRequest};
use crate::identity::identity_from_headers;
use crate::router::Router;
use crate::shutdown::ShutdownSignal;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// The Almanac HTTP server.
///
/// Holds the routing table and handler registry and runs the accept
/// loop. Construct with [`Server::builder`].
pub struct Server {
    /// Server configuration
    config: ServerConfig,

    /// Request router
    router: Router,

    /// Handler registry
    handlers: HandlerRegistry,
}

impl Server {
    /// Creates a new server with the given configuration and no routes.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            handlers: HandlerRegistry::new(),
        }
    }

    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns a reference to the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns a mutable reference to the router.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Returns a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns a reference to the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Returns a mutable reference to the handler registry.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    /// Runs the server until SIGTERM or SIGINT is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured
    /// address.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with a custom shutdown signal.
    ///
    /// Useful for tests and for controlling shutdown programmatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured
    /// address.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "Invalid address '{}': {}",
                self.config.http_addr(),
                e
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!("Server listening on {}", addr);

        let server = Arc::new(self);

        // Each connection task holds a clone of guard_tx; once the
        // accept loop drops the original, recv() resolving means every
        // in-flight connection has finished.
        let (guard_tx, mut guard_rx) = mpsc::channel::<()>(1);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let guard = guard_tx.clone();
                            let shutdown_clone = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown_clone).await {
                                    tracing::error!("Connection error from {}: {}", remote_addr, e);
                                }
                                drop(guard);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                () = shutdown.wait() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        drop(guard_tx);

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            "Waiting up to {:?} for open connections to finish",
            shutdown_timeout
        );

        tokio::select! {
            _ = guard_rx.recv() => {
                tracing::info!("All connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!("Shutdown timeout reached with connections still open");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Handles a single connection.
    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);

        tokio::select! {
            result = conn => {
                result
            }
            () = shutdown.wait() => {
                tracing::debug!("Connection from {} closed due to shutdown", remote_addr);
                Ok(())
            }
        }
    }

    /// Handles a single HTTP request from the wire.
    async fn handle_request(
        self: &Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<HttpResponse, Infallible> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or("").to_string();
        let identity = identity_from_headers(req.headers());

        tracing::debug!("{} {}", method, path);

        if method == Method::GET && path == "/health" {
            return Ok(Self::handle_health());
        }

        // Collect request body with timeout
        let request_timeout = self.config.request_timeout();
        let body_result = tokio::time::timeout(request_timeout, Self::collect_body(req)).await;

        let body = match body_result {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::error!("Failed to collect request body: {}", e);
                return Ok(Self::error_response(
                    StatusCode::BAD_REQUEST,
                    "BadRequestException",
                    &format!("Failed to read request body: {e}"),
                ));
            }
            Err(_) => {
                tracing::warn!("Request body collection timed out");
                return Ok(Self::error_response(
                    StatusCode::REQUEST_TIMEOUT,
                    "RequestTimeoutException",
                    "Request body collection timed out",
                ));
            }
        };

        // Dispatch with timeout
        let response = tokio::time::timeout(
            request_timeout,
            self.dispatch(&method, &path, &query, identity, body),
        )
        .await;

        match response {
            Ok(resp) => Ok(resp),
            Err(_) => {
                tracing::warn!("Handler execution timed out for {} {}", method, path);
                Ok(Self::error_response(
                    StatusCode::GATEWAY_TIMEOUT,
                    "HandlerTimeoutException",
                    "Handler execution timed out",
                ))
            }
        }
    }

    /// Runs a request through the full pipeline without a socket.
    ///
    /// Identity is extracted from the request headers exactly as it is
    /// for wire requests. No timeouts are applied.
    pub async fn oneshot(&self, req: Request<Full<Bytes>>) -> HttpResponse {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let path = parts.uri.path().to_string();
        let query = parts.uri.query().unwrap_or("").to_string();
        let identity = identity_from_headers(&parts.headers);

        if parts.method == Method::GET && path == "/health" {
            return Self::handle_health();
        }

        self.dispatch(&parts.method, &path, &query, identity, body)
            .await
    }

    /// Collects the request body into bytes.
    async fn collect_body(req: Request<Incoming>) -> Result<Bytes, hyper::Error> {
        let collected = req.into_body().collect().await?;
        Ok(collected.to_bytes())
    }

    /// Handles the /health endpoint.
    fn handle_health() -> HttpResponse {
        let body = serde_json::json!({
            "status": "healthy",
            "service": "almanac",
            "version": env!("CARGO_PKG_VERSION"),
        });
        Self::json_response(StatusCode::OK, Bytes::from(body.to_string()))
    }

    /// Routes a request and invokes the matched handler.
    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: &str,
        identity: CallerIdentity,
        body: Bytes,
    ) -> HttpResponse {
        let Some(route_match) = self.router.match_route(method, path) else {
            return Self::error_response(
                StatusCode::NOT_FOUND,
                "NotFoundException",
                &format!("No resource found for {method} {path}"),
            );
        };
        let operation_id = route_match.operation_id().to_string();

        if !self.handlers.contains(&operation_id) {
            tracing::warn!("No handler registered for operation: {}", operation_id);
            return Self::error_response(
                StatusCode::NOT_IMPLEMENTED,
                "NotImplementedException",
                &format!("No handler registered for operation: {operation_id}"),
            );
        }

        let ctx = RequestContext::new()
            .with_identity(identity)
            .with_operation_id(&operation_id);
        let caller = ctx.identity().log_id();
        let request_id = ctx.request_id();
        let raw = RawRequest::new(query, body);

        let response = match self.handlers.invoke(&operation_id, ctx, raw).await {
            Ok(response_body) => Self::json_response(StatusCode::OK, response_body),
            Err(InvokeError::HandlerNotFound(id)) => {
                tracing::error!("Handler not found during invocation: {}", id);
                Self::error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error",
                )
            }
            Err(InvokeError::HandlerError(e)) => Self::handler_error_response(&operation_id, e),
        };

        tracing::info!(
            %request_id,
            caller = %caller,
            operation = %operation_id,
            status = %response.status(),
            "{} {}",
            method,
            path
        );
        response
    }

    /// Translates a handler error into its HTTP response.
    fn handler_error_response(operation_id: &str, error: HandlerError) -> HttpResponse {
        let api_error = match error {
            HandlerError::BadRequest(message) => ApiError::bad_request(message),
            HandlerError::Serialization(message) => {
                tracing::error!(
                    "Failed to serialize response for {}: {}",
                    operation_id,
                    message
                );
                ApiError::internal("Internal server error")
            }
            HandlerError::Api(e) => e,
        };

        let status = api_error.status_code();
        if status.is_server_error() {
            tracing::error!("Operation {} failed: {}", operation_id, api_error);
        } else {
            tracing::debug!("Operation {} rejected: {}", operation_id, api_error);
        }

        Self::body_response(status, &api_error.to_body())
    }

    /// Creates an error response with the standard envelope.
    fn error_response(status: StatusCode, error_type: &str, message: &str) -> HttpResponse {
        let body = ErrorBody {
            error_type: error_type.to_string(),
            message: message.to_string(),
        };
        Self::body_response(status, &body)
    }

    /// Serializes an error envelope into a JSON response.
    fn body_response(status: StatusCode, body: &ErrorBody) -> HttpResponse {
        let bytes = serde_json::to_vec(body).unwrap_or_default();
        Self::json_response(status, Bytes::from(bytes))
    }

    /// Builds a JSON response from pre-serialized bytes.
    fn json_response(status: StatusCode, body: Bytes) -> HttpResponse {
        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Full::new(body))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
    }
}

/// Builder for configuring and creating a [`Server`].
///
/// # Example
///
/// ```rust
/// use almanac_server::Server;
/// use std::time::Duration;
///
/// let server = Server::builder()
///     .http_addr("0.0.0.0:9090")
///     .shutdown_timeout(Duration::from_secs(60))
///     .build();
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    config_builder: crate::config::ServerConfigBuilder,
    router: Option<Router>,
    handlers: Option<HandlerRegistry>,
}

impl ServerBuilder {
    /// Creates a new server builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the router.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Sets the handler registry.
    #[must_use]
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = Some(handlers);
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Sets the per-request timeout.
    ///
    /// Applies to both body collection and handler execution.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Builds the server with the configured settings.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config_builder.build(),
            router: self.router.unwrap_or_default(),
            handlers: self.handlers.unwrap_or_default(),
        }
    }
}

/// Server error types.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("Bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ROLES_HEADER, USER_ID_HEADER};
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize)]
    struct IdQuery {
        id: i64,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Echo {
        id: i64,
    }

    async fn echo_handler(_ctx: RequestContext, req: RawRequest) -> Result<Echo, HandlerError> {
        let IdQuery { id } = req.query()?;
        Ok(Echo { id })
    }

    async fn missing_book_handler(
        _ctx: RequestContext,
        _req: RawRequest,
    ) -> Result<Echo, HandlerError> {
        Err(ApiError::not_found("Book", 7).into())
    }

    #[derive(Serialize)]
    struct Caller {
        caller: String,
    }

    async fn whoami_handler(ctx: RequestContext, _req: RawRequest) -> Result<Caller, HandlerError> {
        Ok(Caller {
            caller: ctx.identity().log_id(),
        })
    }

    fn test_server() -> Server {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", echo_handler);
        registry.register("missingBook", missing_book_handler);
        registry.register("whoami", whoami_handler);

        let mut router = Router::new();
        router.add_route(Method::GET, "/api/echo", "echo");
        router.add_route(Method::GET, "/api/missing", "missingBook");
        router.add_route(Method::GET, "/api/whoami", "whoami");
        router.add_route(Method::GET, "/api/unhandled", "unhandledOp");

        Server::builder().handlers(registry).router(router).build()
    }

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let collected = response.into_body().collect().await.unwrap();
        serde_json::from_slice(&collected.to_bytes()).unwrap()
    }

    #[test]
    fn test_server_builder() {
        let server = Server::builder()
            .http_addr("0.0.0.0:9090")
            .shutdown_timeout(Duration::from_secs(60))
            .build();

        assert_eq!(server.config().http_addr(), "0.0.0.0:9090");
        assert_eq!(server.config().shutdown_timeout(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_dispatch_invokes_handler() {
        let server = test_server();
        let response = server
            .dispatch(
                &Method::GET,
                "/api/echo",
                "id=42",
                CallerIdentity::Anonymous,
                Bytes::new(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["id"], 42);
    }

    #[tokio::test]
    async fn test_dispatch_unmatched_route_is_404() {
        let server = test_server();
        let response = server
            .dispatch(
                &Method::GET,
                "/nonexistent",
                "",
                CallerIdentity::Anonymous,
                Bytes::new(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["type"], "NotFoundException");
    }

    #[tokio::test]
    async fn test_dispatch_matched_without_handler_is_501() {
        let server = test_server();
        let response = server
            .dispatch(
                &Method::GET,
                "/api/unhandled",
                "",
                CallerIdentity::Anonymous,
                Bytes::new(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_dispatch_bad_query_is_400() {
        let server = test_server();
        let response = server
            .dispatch(
                &Method::GET,
                "/api/echo",
                "id=seven",
                CallerIdentity::Anonymous,
                Bytes::new(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["type"], "BadRequestException");
    }

    #[tokio::test]
    async fn test_dispatch_api_error_envelope() {
        let server = test_server();
        let response = server
            .dispatch(
                &Method::GET,
                "/api/missing",
                "",
                CallerIdentity::Anonymous,
                Bytes::new(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["type"], "EntityNotFoundException");
        assert_eq!(json["message"], "Book with id 7 not found");
    }

    #[tokio::test]
    async fn test_oneshot_extracts_identity_from_headers() {
        let server = test_server();
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/whoami")
            .header(USER_ID_HEADER, "alice")
            .header(ROLES_HEADER, "ROLE_USER")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = server.oneshot(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["caller"], "user:alice");
    }

    #[tokio::test]
    async fn test_oneshot_health() {
        let server = test_server();
        let req = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = server.oneshot(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_run_invalid_address() {
        let server = Server::builder().http_addr("not-a-valid-address").build();

        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        match result {
            Err(ServerError::Bind(msg)) => assert!(msg.contains("Invalid address")),
            other => panic!("Expected Bind error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_and_shutdown() {
        let server = Server::builder()
            .http_addr("127.0.0.1:0")
            .shutdown_timeout(Duration::from_millis(100))
            .build();

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result =
            tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown)).await;

        assert!(result.is_ok());
        assert!(result.unwrap().is_ok());
    }
}
