use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{Caller, Viewer};
use crate::error::{Failure, Reply};
use crate::store::{Post, PostWithStats, Store};
use crate::Db;

pub const DEFAULT_LIMIT: usize = 20;

/// Offset pagination shared by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct Page {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl Page {
    pub fn apply<T>(&self, items: impl Iterator<Item = T>, default_limit: usize) -> Vec<T> {
        items
            .skip(self.skip.unwrap_or(0))
            .take(self.limit.unwrap_or(default_limit))
            .collect()
    }
}

#[derive(Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub images: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub images: Option<Vec<String>>,
    pub visibility: Option<i32>,
}

#[derive(Deserialize)]
pub struct Search {
    #[serde(default)]
    pub q: String,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// Newest first.
fn newest<'a>(store: &'a Store, keep: impl Fn(&Post) -> bool + 'a) -> impl Iterator<Item = &'a Post> + 'a {
    store.posts.values().rev().filter(move |p| keep(p))
}

pub async fn create(State(db): State<Db>, Caller(user_id): Caller, Json(input): Json<NewPost>) -> Reply<PostWithStats> {
    let mut store = db.write().await;
    let id = store.next_id();
    let post = Post {
        id,
        author_id: user_id,
        title: input.title,
        content: input.content,
        images: input.images,
        visibility: 0,
    };
    store.posts.insert(id, post.clone());
    Ok(Json(store.with_stats(&post, Some(user_id))))
}

pub async fn list(State(db): State<Db>, Query(page): Query<Page>) -> Json<Vec<PostWithStats>> {
    let store = db.read().await;
    let posts = page.apply(newest(&store, |_| true), DEFAULT_LIMIT);
    Json(posts.into_iter().map(|p| store.with_stats(p, None)).collect())
}

pub async fn by_user(
    State(db): State<Db>,
    Path(user_id): Path<i64>,
    Query(page): Query<Page>,
) -> Json<Vec<PostWithStats>> {
    let store = db.read().await;
    let posts = page.apply(newest(&store, move |p| p.author_id == user_id), DEFAULT_LIMIT);
    Json(posts.into_iter().map(|p| store.with_stats(p, None)).collect())
}

pub async fn search(State(db): State<Db>, Query(search): Query<Search>) -> Json<Vec<PostWithStats>> {
    let store = db.read().await;
    let needle = search.q.to_lowercase();
    let page = Page {
        skip: search.skip,
        limit: search.limit,
    };
    let posts = page.apply(
        newest(&store, move |p| {
            p.title.to_lowercase().contains(&needle) || p.content.to_lowercase().contains(&needle)
        }),
        DEFAULT_LIMIT,
    );
    Json(posts.into_iter().map(|p| store.with_stats(p, None)).collect())
}

pub async fn get(State(db): State<Db>, Path(post_id): Path<i64>, Viewer(viewer): Viewer) -> Reply<PostWithStats> {
    let store = db.read().await;
    let post = store
        .posts
        .get(&post_id)
        .ok_or_else(|| Failure::not_found("post not found"))?;
    Ok(Json(store.with_stats(post, viewer)))
}

pub async fn update(
    State(db): State<Db>,
    Path(post_id): Path<i64>,
    Caller(user_id): Caller,
    Json(input): Json<PostUpdate>,
) -> Reply<PostWithStats> {
    let mut store = db.write().await;
    let post = store
        .posts
        .get_mut(&post_id)
        .ok_or_else(|| Failure::not_found("post not found"))?;
    if post.author_id != user_id {
        return Err(Failure::forbidden("not the author of this post"));
    }
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(content) = input.content {
        post.content = content;
    }
    if let Some(images) = input.images {
        post.images = Some(images);
    }
    if let Some(visibility) = input.visibility {
        post.visibility = visibility;
    }
    let post = post.clone();
    Ok(Json(store.with_stats(&post, Some(user_id))))
}

pub async fn delete(State(db): State<Db>, Path(post_id): Path<i64>, Caller(user_id): Caller) -> Reply<Post> {
    let mut store = db.write().await;
    let author_id = store
        .posts
        .get(&post_id)
        .map(|p| p.author_id)
        .ok_or_else(|| Failure::not_found("post not found"))?;
    if author_id != user_id {
        return Err(Failure::forbidden("not the author of this post"));
    }
    store
        .remove_post(post_id)
        .map(Json)
        .ok_or_else(|| Failure::not_found("post not found"))
}

#[derive(Deserialize)]
pub struct HotQuery {
    pub limit: Option<usize>,
}

/// Most liked posts. Ties go to the newer post.
pub async fn hot(State(db): State<Db>, Query(query): Query<HotQuery>) -> Json<Vec<PostWithStats>> {
    let store = db.read().await;
    let mut ranked: Vec<PostWithStats> = newest(&store, |_| true).map(|p| store.with_stats(p, None)).collect();
    ranked.sort_by(|a, b| b.likes_count.cmp(&a.likes_count));
    ranked.truncate(query.limit.unwrap_or(10));
    Json(ranked)
}

pub async fn upload_image(body: Bytes) -> Reply<Value> {
    if body.is_empty() {
        return Err(Failure::unprocessable("file is required"));
    }
    let filename = format!("{}.png", Uuid::new_v4().simple());
    Ok(Json(json!({ "filename": filename, "url": format!("/images/{filename}") })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_bounds() {
        let page = Page::default();
        assert_eq!(page.apply(0..50, 20).len(), 20);

        let page = Page { skip: Some(45), limit: Some(10) };
        assert_eq!(page.apply(0..50, 20), vec![45, 46, 47, 48, 49]);
    }
}
