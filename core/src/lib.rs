//! API client core for the photo sharing platform.
//!
//! # Overview
//! Every server interaction goes through `PhotoApi`: grouped endpoint
//! functions (users, posts, comments, likes, shares, follows, ratings,
//! collections, leaderboard, messages) that build an `HttpRequest`, hand it
//! to a `Transport`, and interpret the `HttpResponse`. The route table that
//! maps browser paths to views lives in `router`.
//!
//! # Design
//! - Requests and responses are plain data; `Transport` is the only I/O
//!   seam, so the request/response logic is deterministic and testable.
//! - Two client instances share one base URL: `Authenticated` requests get
//!   the session identity as a `user_id` query parameter, `Public` requests
//!   never do.
//! - The session identity sits behind `SessionStore`, injected at
//!   construction.
//! - A 401 on an authenticated request clears the session, runs the host's
//!   unauthorized hook, and is still returned to the caller as
//!   `ApiError::Unauthorized`. Every other failure is returned unchanged.

pub mod api;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod query;
pub mod router;
pub mod session;
pub mod transport;
pub mod types;
pub mod upload;

pub use api::PhotoApi;
pub use client::{PhotoClient, UnauthorizedHook};
pub use config::ClientConfig;
pub use error::{ApiError, SessionError};
pub use http::{Audience, HttpMethod, HttpRequest, HttpResponse};
pub use query::QueryParams;
pub use router::{RouteMatch, RouteTable, View, LOGIN_PATH};
pub use session::{FileSession, Identity, MemorySession, SessionStore};
pub use transport::{Transport, UreqTransport};
pub use upload::Upload;
