use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{Failure, Reply};
use crate::store::User;
use crate::Db;

#[derive(Deserialize)]
pub struct Register {
    pub username: String,
    pub email: String,
    pub password: String,
    pub id_number: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub id_number: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPassword {
    pub id_number: String,
}

#[derive(Deserialize)]
pub struct ResetPassword {
    pub id_number: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub avatar_url: Option<String>,
    pub background_url: Option<String>,
}

pub async fn register(State(db): State<Db>, Json(input): Json<Register>) -> Reply<Value> {
    if input.password != input.confirm_password {
        return Err(Failure::unprocessable("passwords do not match"));
    }
    let mut store = db.write().await;
    if store.users.values().any(|u| u.username == input.username) {
        return Err(Failure::bad_request("username already exists"));
    }
    if store.users.values().any(|u| u.email == input.email) {
        return Err(Failure::bad_request("email already exists"));
    }
    if store.users.values().any(|u| u.id_number == input.id_number) {
        return Err(Failure::bad_request("id number already exists"));
    }

    let id = store.next_id();
    store.users.insert(
        id,
        User {
            id,
            username: input.username,
            email: input.email,
            id_number: input.id_number,
            is_active: true,
            password: input.password,
            avatar_url: None,
            background_url: None,
        },
    );
    info!(user_id = id, "registered user");
    Ok(Json(json!({ "message": "registered", "user_id": id })))
}

pub async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Reply<User> {
    let store = db.read().await;
    store
        .users
        .values()
        .find(|u| u.id_number == input.id_number && u.password == input.password)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::unauthorized("wrong id number or password"))
}

pub async fn update_profile(
    State(db): State<Db>,
    Caller(user_id): Caller,
    Json(input): Json<ProfileUpdate>,
) -> Reply<User> {
    let mut store = db.write().await;
    let user = store
        .users
        .get_mut(&user_id)
        .ok_or_else(|| Failure::not_found("user not found"))?;
    if let Some(avatar_url) = input.avatar_url {
        user.avatar_url = Some(avatar_url);
    }
    if let Some(background_url) = input.background_url {
        user.background_url = Some(background_url);
    }
    Ok(Json(user.clone()))
}

pub async fn upload_avatar(Caller(user_id): Caller, body: Bytes) -> Reply<Value> {
    if body.is_empty() {
        return Err(Failure::unprocessable("file is required"));
    }
    let filename = format!("avatar_{user_id}_{}.png", Uuid::new_v4().simple());
    Ok(Json(json!({ "filename": filename, "url": format!("/images/{filename}") })))
}

/// Sets the caller's background to the stored image.
pub async fn upload_background(State(db): State<Db>, Caller(user_id): Caller, body: Bytes) -> Reply<Value> {
    if body.is_empty() {
        return Err(Failure::unprocessable("file is required"));
    }
    let filename = format!("background_{user_id}_{}.png", Uuid::new_v4().simple());
    let url = format!("/images/{filename}");
    let mut store = db.write().await;
    if let Some(user) = store.users.get_mut(&user_id) {
        user.background_url = Some(url.clone());
    }
    Ok(Json(json!({ "filename": filename, "url": url, "message": "background updated" })))
}

pub async fn forgot_password(State(db): State<Db>, Json(input): Json<ForgotPassword>) -> Reply<Value> {
    let store = db.read().await;
    if !store.users.values().any(|u| u.id_number == input.id_number) {
        return Err(Failure::not_found("id number is not registered"));
    }
    Ok(Json(json!({ "message": "id number verified" })))
}

pub async fn reset_password(State(db): State<Db>, Json(input): Json<ResetPassword>) -> Reply<Value> {
    let mut store = db.write().await;
    let user = store
        .users
        .values_mut()
        .find(|u| u.id_number == input.id_number)
        .ok_or_else(|| Failure::not_found("id number is not registered"))?;
    user.password = input.new_password;
    info!(user_id = user.id, "password reset");
    Ok(Json(json!({ "message": "password reset" })))
}

pub async fn profile(State(db): State<Db>, Path(user_id): Path<i64>) -> Reply<User> {
    let store = db.read().await;
    store
        .users
        .get(&user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("user not found"))
}

pub async fn info_by_id(State(db): State<Db>, Path(user_id): Path<i64>) -> Reply<User> {
    let store = db.read().await;
    store
        .users
        .get(&user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("user not found"))
}

pub async fn by_username(State(db): State<Db>, Path(username): Path<String>) -> Reply<User> {
    let store = db.read().await;
    store
        .users
        .values()
        .find(|u| u.username == username)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("user not found"))
}
