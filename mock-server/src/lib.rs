//! In-memory photo platform backend.
//!
//! Every route lives under `/api`. Callers identify themselves with the
//! `user_id` query parameter; see [`auth`].

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};

pub mod auth;
pub mod collections;
pub mod error;
pub mod messages;
pub mod posts;
pub mod social;
pub mod store;
pub mod users;

pub use store::{
    Collection, CollectionItem, Comment, Follow, Like, Message, Post, PostWithStats, Rating, Share, Store, User,
    UserStats,
};

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new().nest("/api", api()).with_state(db)
}

fn api() -> Router<Db> {
    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/profile", put(users::update_profile))
        .route("/users/upload-avatar", post(users::upload_avatar))
        .route("/users/upload-background", post(users::upload_background))
        .route("/users/forgot-password", post(users::forgot_password))
        .route("/users/reset-password", post(users::reset_password))
        .route("/users/profile/{id}", get(users::profile))
        .route("/users/info/{id}", get(users::info_by_id))
        .route("/users/{username}", get(users::by_username))
        .route("/posts/", get(posts::list).post(posts::create))
        .route("/posts/search/", get(posts::search))
        .route("/posts/upload-image", post(posts::upload_image))
        .route("/posts/user/{id}", get(posts::by_user))
        .route("/posts/{id}", get(posts::get).put(posts::update).delete(posts::delete))
        .route("/comments/", post(social::create_comment))
        .route("/comments/post/{id}", get(social::comments_by_post))
        .route("/comments/{id}", delete(social::delete_comment))
        .route("/interactions/likes", post(social::like).delete(social::unlike))
        .route("/interactions/likes/{id}", get(social::check_like))
        .route("/interactions/shares", post(social::share).delete(social::unshare))
        .route("/interactions/shares/{id}", get(social::check_share))
        .route("/follows/", post(social::follow))
        .route("/follows/stats/{id}", get(social::user_stats))
        .route("/follows/{id}", get(social::check_follow).delete(social::unfollow))
        .route("/ratings/", post(social::create_rating))
        .route("/ratings/{id}", put(social::update_rating).delete(social::delete_rating))
        .route("/ratings/{id}/stats", get(social::rating_stats))
        .route("/collections/", get(collections::list).post(collections::create))
        .route("/collections/items/", post(collections::collect))
        .route(
            "/collections/{id}",
            put(collections::update).delete(collections::delete),
        )
        .route(
            "/collections/{id}/items/",
            get(collections::items).post(collections::add_item),
        )
        .route(
            "/collections/{id}/items/{item_id}",
            delete(collections::remove_item),
        )
        .route("/leaderboard/hot", get(posts::hot))
        .route("/messages/", get(messages::inbox).post(messages::send))
        .route("/messages/upload-image", post(messages::upload_image))
        .route("/messages/conversation/{id}", get(messages::conversation))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
