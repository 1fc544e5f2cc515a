//! The façade: a `PhotoClient` paired with a `Transport`.
//!
//! # Design
//! `PhotoApi` is the only entry point views need. Each endpoint group is a
//! borrowed view over it (`api.posts().get_post(1)`), and every operation
//! is one build → execute → parse pass with no local validation, retry or
//! caching. Results are the server's JSON as-is.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::PhotoClient;
use crate::config::ClientConfig;
use crate::endpoints::{Collections, Comments, Follows, Leaderboard, Likes, Messages, Posts, Ratings, Shares, Users};
use crate::error::ApiError;
use crate::http::{Audience, HttpMethod, HttpRequest};
use crate::query::QueryParams;
use crate::session::{Identity, SessionStore};
use crate::transport::{Transport, UreqTransport};
use crate::types::RegisterUser;
use crate::upload::Upload;

#[derive(Debug, Clone)]
pub struct PhotoApi<T = UreqTransport> {
    client: PhotoClient,
    transport: T,
}

impl PhotoApi<UreqTransport> {
    /// Wire a ureq transport using the configured base URL and timeout.
    pub fn from_config(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Self {
        Self::new(
            PhotoClient::new(&config.base_url(), session),
            UreqTransport::new(config.timeout),
        )
    }
}

impl<T: Transport> PhotoApi<T> {
    pub fn new(client: PhotoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PhotoClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a built request and interpret the answer.
    pub fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        debug!(
            method = request.method.as_str(),
            path = %request.path,
            audience = ?request.audience,
            "api call"
        );
        let response = self.transport.execute(&request)?;
        self.client.parse(request.audience, response)
    }

    /// Log in and store the returned user as the session identity.
    pub fn sign_in<C: Serialize + ?Sized>(&self, credentials: &C) -> Result<Identity, ApiError> {
        let user = self.users().login(credentials)?;
        let identity = identity_from_user(&user)?;
        self.client.session().remember(&identity)?;
        Ok(identity)
    }

    /// Register and store the new account as the session identity.
    pub fn sign_up(&self, form: &RegisterUser) -> Result<Identity, ApiError> {
        let answer = self.users().register(form)?;
        let identity = Identity {
            user_id: user_id_of(&answer["user_id"], "register")?,
            username: form.username.clone(),
        };
        self.client.session().remember(&identity)?;
        Ok(identity)
    }

    /// Explicit logout: forget the stored identity.
    pub fn sign_out(&self) -> Result<(), ApiError> {
        self.client.logout()?;
        Ok(())
    }

    pub fn users(&self) -> Users<'_, T> {
        Users::new(self)
    }

    pub fn posts(&self) -> Posts<'_, T> {
        Posts::new(self)
    }

    pub fn comments(&self) -> Comments<'_, T> {
        Comments::new(self)
    }

    pub fn likes(&self) -> Likes<'_, T> {
        Likes::new(self)
    }

    pub fn shares(&self) -> Shares<'_, T> {
        Shares::new(self)
    }

    pub fn follows(&self) -> Follows<'_, T> {
        Follows::new(self)
    }

    pub fn ratings(&self) -> Ratings<'_, T> {
        Ratings::new(self)
    }

    pub fn collections(&self) -> Collections<'_, T> {
        Collections::new(self)
    }

    pub fn leaderboard(&self) -> Leaderboard<'_, T> {
        Leaderboard::new(self)
    }

    pub fn messages(&self) -> Messages<'_, T> {
        Messages::new(self)
    }

    pub(crate) fn get(&self, audience: Audience, path: &str, query: QueryParams) -> Result<Value, ApiError> {
        self.send(self.client.build(audience, HttpMethod::Get, path, query))
    }

    pub(crate) fn delete(&self, path: &str, query: QueryParams) -> Result<Value, ApiError> {
        self.send(self.client.build(Audience::Authenticated, HttpMethod::Delete, path, query))
    }

    pub(crate) fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.post_as(Audience::Authenticated, path, body)
    }

    pub(crate) fn post_as<B: Serialize + ?Sized>(
        &self,
        audience: Audience,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let request = self
            .client
            .build_json(audience, HttpMethod::Post, path, QueryParams::new(), body)?;
        self.send(request)
    }

    pub(crate) fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let request = self.client.build_json(
            Audience::Authenticated,
            HttpMethod::Put,
            path,
            QueryParams::new(),
            body,
        )?;
        self.send(request)
    }

    pub(crate) fn upload(&self, path: &str, upload: &Upload) -> Result<Value, ApiError> {
        self.send(self.client.build_upload(Audience::Authenticated, path, upload))
    }
}

/// Pull `id` and `username` out of the user returned by login.
fn identity_from_user(user: &Value) -> Result<Identity, ApiError> {
    let user_id = user_id_of(&user["id"], "login")?;
    let username = user["username"].as_str().unwrap_or_default().to_string();
    Ok(Identity { user_id, username })
}

/// Ids arrive as numbers from the server; strings are accepted as-is.
fn user_id_of(value: &Value, operation: &str) -> Result<String, ApiError> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ApiError::Deserialization(format!("{operation} response has no user id"))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::http::HttpResponse;
    use crate::session::MemorySession;
    use crate::types::Credentials;

    /// Records requests and answers every one with the same canned response.
    struct Canned {
        status: u16,
        body: String,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn execute(&self, _: &HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Timeout)
        }
    }

    fn api(session: Arc<MemorySession>, transport: Canned) -> PhotoApi<Canned> {
        PhotoApi::new(PhotoClient::new("http://h/api", session), transport)
    }

    fn credentials() -> Credentials {
        Credentials {
            id_number: "20240001".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn sign_in_stores_identity() {
        let session = Arc::new(MemorySession::new());
        let api = api(
            session.clone(),
            Canned::new(200, r#"{"id":3,"username":"vivian","email":"v@x","is_active":true,"id_number":"20240001"}"#),
        );

        let identity = api.sign_in(&credentials()).unwrap();

        assert_eq!(identity, Identity::new("3", "vivian"));
        assert_eq!(session.identity(), Some(identity));
        let seen = api.transport().seen.lock().unwrap();
        assert_eq!(seen[0].path, "http://h/api/users/login");
        assert_eq!(seen[0].method, HttpMethod::Post);
    }

    #[test]
    fn sign_in_without_id_is_rejected() {
        let session = Arc::new(MemorySession::new());
        let api = api(session.clone(), Canned::new(200, r#"{"username":"x"}"#));
        let err = api.sign_in(&credentials()).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        assert!(session.identity().is_none());
    }

    #[test]
    fn sign_up_stores_new_account() {
        let session = Arc::new(MemorySession::new());
        let api = api(session.clone(), Canned::new(200, r#"{"message":"registered","user_id":12}"#));
        let form = RegisterUser {
            username: "imogen".to_string(),
            email: "i@x.io".to_string(),
            password: "pw".to_string(),
            id_number: "20240012".to_string(),
            confirm_password: "pw".to_string(),
        };

        let identity = api.sign_up(&form).unwrap();

        assert_eq!(identity, Identity::new("12", "imogen"));
        assert_eq!(session.identity(), Some(identity));
        assert_eq!(api.transport().seen.lock().unwrap()[0].path, "http://h/api/users/register");
    }

    #[test]
    fn failed_sign_up_leaves_session_empty() {
        let session = Arc::new(MemorySession::new());
        let api = api(session.clone(), Canned::new(400, r#"{"detail":"username already exists"}"#));
        let form = RegisterUser {
            username: "imogen".to_string(),
            email: "i@x.io".to_string(),
            password: "pw".to_string(),
            id_number: "20240012".to_string(),
            confirm_password: "pw".to_string(),
        };
        let err = api.sign_up(&form).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(session.identity().is_none());
    }

    #[test]
    fn sign_out_clears_identity() {
        let session = Arc::new(MemorySession::with_identity(Identity::new("1", "a")));
        let api = api(session.clone(), Canned::new(200, "{}"));
        api.sign_out().unwrap();
        assert!(session.identity().is_none());
    }

    #[test]
    fn transport_failure_is_propagated_without_touching_session() {
        let session = Arc::new(MemorySession::with_identity(Identity::new("1", "a")));
        let api = PhotoApi::new(PhotoClient::new("http://h/api", session.clone()), Unreachable);
        let err = api.posts().get_post(1).unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
        assert!(session.identity().is_some());
    }

    #[test]
    fn unauthorized_call_clears_session() {
        let session = Arc::new(MemorySession::with_identity(Identity::new("1", "a")));
        let api = api(session.clone(), Canned::new(401, r#"{"detail":"no"}"#));
        let err = api.collections().get_collections(&json!({})).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert!(session.identity().is_none());
    }

    #[test]
    fn from_config_uses_base_url() {
        let config = ClientConfig {
            origin: "http://photos.test:9000".to_string(),
            ..ClientConfig::default()
        };
        let api = PhotoApi::from_config(&config, Arc::new(MemorySession::new()));
        assert_eq!(api.client().base_url(), "http://photos.test:9000/api");
    }
}
