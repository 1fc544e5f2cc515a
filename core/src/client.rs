//! Request building and response interpretation for the photo platform API.
//!
//! # Design
//! `PhotoClient` plays both client instances. A request built for
//! `Audience::Authenticated` gets the session identity merged into its query
//! parameters; a `Public` request is built from the caller's inputs alone.
//! `parse` is the response half: a 401 on an authenticated request clears
//! the session and notifies the host through the unauthorized hook, then is
//! still returned as an error so the caller's own handling runs. No I/O
//! happens here.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, SessionError};
use crate::http::{Audience, HttpMethod, HttpRequest, HttpResponse};
use crate::query::QueryParams;
use crate::router::LOGIN_PATH;
use crate::session::SessionStore;
use crate::upload::Upload;

/// Callback run when the server rejects the session. Receives the path the
/// host should navigate to.
pub type UnauthorizedHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Builds `HttpRequest` values and interprets `HttpResponse` values.
#[derive(Clone)]
pub struct PhotoClient {
    base_url: String,
    session: Arc<dyn SessionStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for PhotoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoClient")
            .field("base_url", &self.base_url)
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish_non_exhaustive()
    }
}

impl PhotoClient {
    /// `base_url` is the API root shared by both instances, e.g.
    /// `http://127.0.0.1:8000/api`.
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            on_unauthorized: None,
        }
    }

    /// Register the host's reaction to a rejected session.
    pub fn on_unauthorized(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Build a request without a body.
    pub fn build(&self, audience: Audience, method: HttpMethod, path: &str, query: QueryParams) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query: self.intercept_query(audience, query),
            headers: Vec::new(),
            body: None,
            audience,
        }
    }

    /// Build a request with a JSON body.
    pub fn build_json<B: Serialize + ?Sized>(
        &self,
        audience: Audience,
        method: HttpMethod,
        path: &str,
        query: QueryParams,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.build(audience, method, path, query);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    /// Build a multipart POST carrying one file.
    pub fn build_upload(&self, audience: Audience, path: &str, upload: &Upload) -> HttpRequest {
        let (content_type, body) = upload.to_multipart();
        let mut request = self.build(audience, HttpMethod::Post, path, QueryParams::new());
        request.headers.push(("content-type".to_string(), content_type));
        request.body = Some(body);
        request
    }

    /// Interpret a response to a request built for `audience`.
    ///
    /// A 2xx body is returned as opaque JSON (`Null` when empty). Everything
    /// else is an error carrying the raw body.
    pub fn parse(&self, audience: Audience, response: HttpResponse) -> Result<Value, ApiError> {
        if response.is_success() {
            if response.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()));
        }
        if response.status == 401 && audience == Audience::Authenticated {
            self.reject_session();
            return Err(ApiError::Unauthorized { body: response.body });
        }
        Err(ApiError::Http {
            status: response.status,
            body: response.body,
        })
    }

    /// Forget the stored identity.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.session.clear()
    }

    fn intercept_query(&self, audience: Audience, query: QueryParams) -> QueryParams {
        match audience {
            Audience::Authenticated => query.with_identity(self.session.user_id().as_deref()),
            Audience::Public => query,
        }
    }

    fn reject_session(&self) {
        warn!(redirect = LOGIN_PATH, "session rejected by server, clearing identity");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "failed to clear rejected session");
        }
        if let Some(hook) = &self.on_unauthorized {
            hook(LOGIN_PATH);
        }
    }
}
