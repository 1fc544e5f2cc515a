//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! client builds `HttpRequest` values and interprets `HttpResponse` values;
//! whoever executes the round-trip (a `Transport`) sits outside that logic.
//! A request remembers which client instance built it so the response can
//! be interpreted by the same rules.

use crate::query::QueryParams;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Which of the two client instances issued a request.
///
/// `Authenticated` requests carry the session identity and are subject to
/// the 401 handling; `Public` requests are neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Authenticated,
    Public,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: QueryParams,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub audience: Audience,
}

impl HttpRequest {
    /// Full request target: `path` plus the encoded query string.
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.encode())
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
