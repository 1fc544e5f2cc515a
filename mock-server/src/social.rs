//! Comments, likes, shares, follows and ratings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Caller, Viewer};
use crate::error::{Failure, Reply};
use crate::posts::Page;
use crate::store::{Comment, Follow, Like, Rating, Share, UserStats};
use crate::Db;

#[derive(Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
}

#[derive(Deserialize)]
pub struct PostRef {
    pub post_id: i64,
}

#[derive(Deserialize)]
pub struct NewFollow {
    pub following_id: i64,
}

#[derive(Deserialize)]
pub struct RatingInput {
    pub post_id: i64,
    pub score: f64,
}

fn check_score(score: f64) -> Result<(), Failure> {
    if !(0.0..=10.0).contains(&score) {
        return Err(Failure::unprocessable("score must be between 0 and 10"));
    }
    if ((score * 10.0).round() - score * 10.0).abs() > 1e-9 {
        return Err(Failure::unprocessable("score allows at most one decimal"));
    }
    Ok(())
}

// --- comments ---

pub async fn create_comment(
    State(db): State<Db>,
    Caller(user_id): Caller,
    Json(input): Json<NewComment>,
) -> Reply<Comment> {
    let mut store = db.write().await;
    if !store.posts.contains_key(&input.post_id) {
        return Err(Failure::not_found("post not found"));
    }
    let id = store.next_id();
    let comment = Comment {
        id,
        author_id: user_id,
        post_id: input.post_id,
        content: input.content,
    };
    store.comments.insert(id, comment.clone());
    Ok(Json(comment))
}

pub async fn comments_by_post(
    State(db): State<Db>,
    Path(post_id): Path<i64>,
    Query(page): Query<Page>,
) -> Json<Vec<Comment>> {
    let store = db.read().await;
    let comments = store.comments.values().filter(|c| c.post_id == post_id).cloned();
    Json(page.apply(comments, 100))
}

pub async fn delete_comment(
    State(db): State<Db>,
    Path(comment_id): Path<i64>,
    Caller(user_id): Caller,
) -> Reply<Comment> {
    let mut store = db.write().await;
    let comment = store
        .comments
        .get(&comment_id)
        .ok_or_else(|| Failure::not_found("comment not found"))?;
    let post_author = store.posts.get(&comment.post_id).map(|p| p.author_id);
    if comment.author_id != user_id && post_author != Some(user_id) {
        return Err(Failure::forbidden("cannot delete this comment"));
    }
    store
        .comments
        .remove(&comment_id)
        .map(Json)
        .ok_or_else(|| Failure::not_found("comment not found"))
}

// --- likes ---

pub async fn like(State(db): State<Db>, Caller(user_id): Caller, Json(input): Json<PostRef>) -> Reply<Like> {
    let mut store = db.write().await;
    if !store.posts.contains_key(&input.post_id) {
        return Err(Failure::not_found("post not found"));
    }
    if store
        .likes
        .values()
        .any(|l| l.user_id == user_id && l.post_id == input.post_id)
    {
        return Err(Failure::bad_request("already liked"));
    }
    let id = store.next_id();
    let like = Like {
        id,
        user_id,
        post_id: input.post_id,
    };
    store.likes.insert(id, like.clone());
    Ok(Json(like))
}

pub async fn unlike(State(db): State<Db>, Caller(user_id): Caller, Query(input): Query<PostRef>) -> Reply<Value> {
    let mut store = db.write().await;
    let before = store.likes.len();
    store
        .likes
        .retain(|_, l| !(l.user_id == user_id && l.post_id == input.post_id));
    if store.likes.len() == before {
        return Err(Failure::not_found("like not found"));
    }
    Ok(Json(json!({ "message": "unliked" })))
}

/// Anonymous callers have liked nothing.
pub async fn check_like(State(db): State<Db>, Path(post_id): Path<i64>, Viewer(viewer): Viewer) -> Json<bool> {
    let store = db.read().await;
    let liked = viewer.is_some_and(|user_id| {
        store
            .likes
            .values()
            .any(|l| l.user_id == user_id && l.post_id == post_id)
    });
    Json(liked)
}

// --- shares ---

/// Sharing again returns the existing share.
pub async fn share(State(db): State<Db>, Caller(user_id): Caller, Json(input): Json<PostRef>) -> Reply<Share> {
    let mut store = db.write().await;
    if !store.posts.contains_key(&input.post_id) {
        return Err(Failure::not_found("post not found"));
    }
    if let Some(existing) = store
        .shares
        .values()
        .find(|s| s.user_id == user_id && s.post_id == input.post_id)
    {
        return Ok(Json(existing.clone()));
    }
    let id = store.next_id();
    let share = Share {
        id,
        user_id,
        post_id: input.post_id,
    };
    store.shares.insert(id, share.clone());
    Ok(Json(share))
}

/// Unsharing a post that was never shared still succeeds.
pub async fn unshare(State(db): State<Db>, Caller(user_id): Caller, Query(input): Query<PostRef>) -> Json<Value> {
    db.write()
        .await
        .shares
        .retain(|_, s| !(s.user_id == user_id && s.post_id == input.post_id));
    Json(json!({ "message": "unshared" }))
}

pub async fn check_share(State(db): State<Db>, Path(post_id): Path<i64>, Caller(user_id): Caller) -> Json<bool> {
    let store = db.read().await;
    Json(
        store
            .shares
            .values()
            .any(|s| s.user_id == user_id && s.post_id == post_id),
    )
}

// --- follows ---

pub async fn follow(State(db): State<Db>, Caller(user_id): Caller, Json(input): Json<NewFollow>) -> Reply<Follow> {
    if input.following_id == user_id {
        return Err(Failure::bad_request("cannot follow yourself"));
    }
    let mut store = db.write().await;
    if !store.users.contains_key(&input.following_id) {
        return Err(Failure::not_found("user not found"));
    }
    if let Some(existing) = store
        .follows
        .values()
        .find(|f| f.follower_id == user_id && f.following_id == input.following_id)
    {
        return Ok(Json(existing.clone()));
    }
    let id = store.next_id();
    let follow = Follow {
        id,
        follower_id: user_id,
        following_id: input.following_id,
    };
    store.follows.insert(id, follow.clone());
    Ok(Json(follow))
}

pub async fn unfollow(State(db): State<Db>, Path(following_id): Path<i64>, Caller(user_id): Caller) -> Reply<Value> {
    let mut store = db.write().await;
    let before = store.follows.len();
    store
        .follows
        .retain(|_, f| !(f.follower_id == user_id && f.following_id == following_id));
    if store.follows.len() == before {
        return Err(Failure::not_found("not following"));
    }
    Ok(Json(json!({ "message": "unfollowed" })))
}

pub async fn check_follow(State(db): State<Db>, Path(following_id): Path<i64>, Caller(user_id): Caller) -> Json<bool> {
    let store = db.read().await;
    Json(
        store
            .follows
            .values()
            .any(|f| f.follower_id == user_id && f.following_id == following_id),
    )
}

pub async fn user_stats(State(db): State<Db>, Path(user_id): Path<i64>) -> Json<UserStats> {
    Json(db.read().await.user_stats(user_id))
}

// --- ratings ---

pub async fn create_rating(
    State(db): State<Db>,
    Caller(user_id): Caller,
    Json(input): Json<RatingInput>,
) -> Reply<Rating> {
    check_score(input.score)?;
    let mut store = db.write().await;
    if !store.posts.contains_key(&input.post_id) {
        return Err(Failure::not_found("post not found"));
    }
    if store
        .ratings
        .values()
        .any(|r| r.user_id == user_id && r.post_id == input.post_id)
    {
        return Err(Failure::bad_request("already rated"));
    }
    let id = store.next_id();
    let rating = Rating {
        id,
        user_id,
        post_id: input.post_id,
        score: input.score,
    };
    store.ratings.insert(id, rating.clone());
    Ok(Json(rating))
}

pub async fn update_rating(
    State(db): State<Db>,
    Path(post_id): Path<i64>,
    Caller(user_id): Caller,
    Json(input): Json<RatingInput>,
) -> Reply<Rating> {
    if input.post_id != post_id {
        return Err(Failure::bad_request("post id mismatch"));
    }
    check_score(input.score)?;
    let mut store = db.write().await;
    let rating = store
        .ratings
        .values_mut()
        .find(|r| r.user_id == user_id && r.post_id == post_id)
        .ok_or_else(|| Failure::not_found("rating not found"))?;
    rating.score = input.score;
    Ok(Json(rating.clone()))
}

pub async fn delete_rating(State(db): State<Db>, Path(post_id): Path<i64>, Caller(user_id): Caller) -> Reply<Value> {
    let mut store = db.write().await;
    let before = store.ratings.len();
    store
        .ratings
        .retain(|_, r| !(r.user_id == user_id && r.post_id == post_id));
    if store.ratings.len() == before {
        return Err(Failure::not_found("rating not found"));
    }
    Ok(Json(json!({ "message": "rating deleted" })))
}

pub async fn rating_stats(State(db): State<Db>, Path(post_id): Path<i64>) -> Reply<Value> {
    let store = db.read().await;
    let post = store
        .posts
        .get(&post_id)
        .ok_or_else(|| Failure::not_found("post not found"))?;
    let stats = store.with_stats(post, None);
    Ok(Json(json!({
        "rating_count": stats.rating_count,
        "average_rating": stats.average_rating,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_allow_one_decimal_in_range() {
        assert!(check_score(0.0).is_ok());
        assert!(check_score(8.5).is_ok());
        assert!(check_score(10.0).is_ok());
        assert!(check_score(8.55).is_err());
        assert!(check_score(10.5).is_err());
        assert!(check_score(-1.0).is_err());
    }
}
