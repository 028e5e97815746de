//! # Almanac Test
//!
//! In-process test client for an Almanac [`Server`].
//!
//! Requests go through [`Server::oneshot`], so the full pipeline runs
//! (identity extraction, routing, dispatch, error translation) without
//! opening a socket.
//!
//! # Example
//!
//! ```rust,ignore
//! use almanac_test::TestClient;
//!
//! let client = TestClient::new(build_server());
//!
//! let response = client.get("/api/book/all").as_user("alice").send().await;
//! assert_eq!(response.status(), 200);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use serde::{de::DeserializeOwned, Serialize};

use almanac_server::{Server, ROLES_HEADER, USER_ID_HEADER};

/// An in-process HTTP client for a built server.
///
/// Cheap to clone; clones share the server.
#[derive(Clone)]
pub struct TestClient {
    server: Arc<Server>,
}

impl TestClient {
    /// Wraps a server for in-process requests.
    #[must_use]
    pub fn new(server: Server) -> Self {
        Self {
            server: Arc::new(server),
        }
    }

    /// Starts a request with an arbitrary method.
    #[must_use]
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestRequest {
        TestRequest {
            client: self.clone(),
            method,
            uri: uri.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Starts a GET request.
    #[must_use]
    pub fn get(&self, uri: impl Into<String>) -> TestRequest {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    #[must_use]
    pub fn post(&self, uri: impl Into<String>) -> TestRequest {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    #[must_use]
    pub fn put(&self, uri: impl Into<String>) -> TestRequest {
        self.request(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    #[must_use]
    pub fn delete(&self, uri: impl Into<String>) -> TestRequest {
        self.request(Method::DELETE, uri)
    }
}

/// A request under construction.
///
/// Build it up with headers, identity, and body, then [`send`](Self::send).
pub struct TestRequest {
    client: TestClient,
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl TestRequest {
    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authenticates as a user-tier caller.
    #[must_use]
    pub fn as_user(self, user_id: impl Into<String>) -> Self {
        self.with_roles(user_id, "ROLE_USER")
    }

    /// Authenticates as an admin caller.
    #[must_use]
    pub fn as_admin(self, user_id: impl Into<String>) -> Self {
        self.with_roles(user_id, "ROLE_USER,ROLE_ADMIN")
    }

    /// Authenticates with an explicit comma-separated role list.
    #[must_use]
    pub fn with_roles(self, user_id: impl Into<String>, roles: impl Into<String>) -> Self {
        self.header(USER_ID_HEADER, user_id)
            .header(ROLES_HEADER, roles)
    }

    /// Sets a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be serialized; test inputs are
    /// expected to be serializable.
    #[must_use]
    pub fn json(mut self, value: &impl Serialize) -> Self {
        self.body = Bytes::from(serde_json::to_vec(value).expect("test body should serialize"));
        self.header("Content-Type", "application/json")
    }

    /// Sets a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sends the request through the server pipeline.
    ///
    /// # Panics
    ///
    /// Panics if the request parts are malformed.
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let request = builder
            .body(Full::new(self.body))
            .expect("test request should be well-formed");

        let response = self.client.server.oneshot(request).await;
        let (parts, body) = response.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        TestResponse {
            status: parts.status,
            body,
        }
    }
}

/// A fully-read response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    body: Bytes,
}

impl TestResponse {
    /// Returns the response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid UTF-8.
    #[must_use]
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body should be UTF-8")
    }

    /// Deserializes the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON for `T`.
    #[must_use]
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body should deserialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::RequestContext;
    use almanac_server::{HandlerError, HandlerRegistry, RawRequest, Router};
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Caller {
        caller: String,
        roles: Vec<String>,
    }

    async fn whoami(ctx: RequestContext, _req: RawRequest) -> Result<Caller, HandlerError> {
        Ok(Caller {
            caller: ctx.identity().log_id(),
            roles: ctx.identity().roles().to_vec(),
        })
    }

    fn client() -> TestClient {
        let mut registry = HandlerRegistry::new();
        registry.register("whoami", whoami);
        let mut router = Router::new();
        router.add_route(Method::GET, "/whoami", "whoami");
        TestClient::new(Server::builder().handlers(registry).router(router).build())
    }

    #[tokio::test]
    async fn test_anonymous_by_default() {
        let response = client().get("/whoami").send().await;
        assert_eq!(response.status(), StatusCode::OK);
        let caller: Caller = response.json();
        assert_eq!(caller.caller, "anonymous");
    }

    #[tokio::test]
    async fn test_as_user_sets_identity_headers() {
        let response = client().get("/whoami").as_user("alice").send().await;
        let caller: Caller = response.json();
        assert_eq!(caller.caller, "user:alice");
        assert_eq!(caller.roles, ["ROLE_USER"]);
    }

    #[tokio::test]
    async fn test_as_admin_grants_both_tiers() {
        let response = client().get("/whoami").as_admin("root").send().await;
        let caller: Caller = response.json();
        assert!(caller.roles.contains(&"ROLE_ADMIN".to_string()));
        assert!(caller.roles.contains(&"ROLE_USER".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = client().get("/nope").send().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.text().contains("NotFoundException"));
    }
}
