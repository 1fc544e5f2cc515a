//! Caller identity taken from the `user_id` query parameter.
//!
//! A missing or non-numeric `user_id` is a validation error (422); an id
//! that names no user is 401.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::error::Failure;
use crate::Db;

#[derive(Deserialize)]
struct IdentityQuery {
    user_id: Option<String>,
}

fn query_user_id(parts: &Parts) -> Option<String> {
    Query::<IdentityQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.user_id)
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub i64);

impl FromRequestParts<Db> for Caller {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let raw = query_user_id(parts).ok_or_else(|| Failure::unprocessable("user_id is required"))?;
        let user_id: i64 = raw
            .parse()
            .map_err(|_| Failure::unprocessable("user_id must be an integer"))?;
        if db.read().await.users.contains_key(&user_id) {
            Ok(Caller(user_id))
        } else {
            Err(Failure::unauthorized("user not found"))
        }
    }
}

/// A caller that may be anonymous. Unknown or malformed ids count as
/// anonymous.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Option<i64>);

impl FromRequestParts<Db> for Viewer {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, _db: &Db) -> Result<Self, Self::Rejection> {
        Ok(Viewer(query_user_id(parts).and_then(|raw| raw.parse().ok())))
    }
}
