use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{Failure, Reply};
use crate::posts::Page;
use crate::store::Message;
use crate::Db;

const DEFAULT_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct NewMessage {
    pub recipient_id: i64,
    pub content: String,
    pub image_url: Option<String>,
}

pub async fn send(State(db): State<Db>, Caller(user_id): Caller, Json(input): Json<NewMessage>) -> Reply<Message> {
    if input.recipient_id == user_id {
        return Err(Failure::bad_request("cannot message yourself"));
    }
    let mut store = db.write().await;
    if !store.users.contains_key(&input.recipient_id) {
        return Err(Failure::not_found("recipient not found"));
    }
    let id = store.next_id();
    let message = Message {
        id,
        sender_id: user_id,
        recipient_id: input.recipient_id,
        content: input.content,
        image_url: input.image_url,
        is_read: false,
    };
    store.messages.insert(id, message.clone());
    Ok(Json(message))
}

pub async fn upload_image(Caller(user_id): Caller, body: Bytes) -> Reply<Value> {
    if body.is_empty() {
        return Err(Failure::unprocessable("file is required"));
    }
    let filename = format!("msg_{user_id}_{}.png", Uuid::new_v4().simple());
    Ok(Json(json!({ "image_url": format!("/images/messages/{filename}") })))
}

/// Both directions between the caller and `other`, oldest first. Messages
/// addressed to the caller are marked read.
pub async fn conversation(
    State(db): State<Db>,
    Path(other): Path<i64>,
    Caller(user_id): Caller,
    Query(page): Query<Page>,
) -> Json<Vec<Message>> {
    let mut store = db.write().await;
    for message in store.messages.values_mut() {
        if message.sender_id == other && message.recipient_id == user_id {
            message.is_read = true;
        }
    }
    let thread = store.messages.values().filter(|m| {
        (m.sender_id == user_id && m.recipient_id == other) || (m.sender_id == other && m.recipient_id == user_id)
    });
    Json(page.apply(thread.cloned(), DEFAULT_LIMIT))
}

/// Messages received by the caller, newest first.
pub async fn inbox(State(db): State<Db>, Caller(user_id): Caller, Query(page): Query<Page>) -> Json<Vec<Message>> {
    let store = db.read().await;
    let received = store.messages.values().rev().filter(|m| m.recipient_id == user_id);
    Json(page.apply(received.cloned(), DEFAULT_LIMIT))
}
