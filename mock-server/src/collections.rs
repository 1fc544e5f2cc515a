use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Caller;
use crate::error::{Failure, Reply};
use crate::posts::{Page, DEFAULT_LIMIT};
use crate::social::PostRef;
use crate::store::{Collection, CollectionItem, PostWithStats, Store};
use crate::Db;

#[derive(Deserialize)]
pub struct CollectionName {
    pub name: String,
}

/// An item together with the post it points at.
#[derive(Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: CollectionItem,
    pub post: Option<PostWithStats>,
}

fn owned_collection(store: &Store, collection_id: i64, user_id: i64) -> Result<&Collection, Failure> {
    let collection = store
        .collections
        .get(&collection_id)
        .ok_or_else(|| Failure::not_found("collection not found"))?;
    if collection.user_id != user_id {
        return Err(Failure::forbidden("not your collection"));
    }
    Ok(collection)
}

fn insert_item(store: &mut Store, user_id: i64, collection_id: i64, post_id: i64) -> Result<CollectionItem, Failure> {
    let author_id = store
        .posts
        .get(&post_id)
        .map(|p| p.author_id)
        .ok_or_else(|| Failure::not_found("post not found"))?;
    if author_id == user_id {
        return Err(Failure::bad_request("cannot collect your own post"));
    }
    if store
        .items
        .values()
        .any(|i| i.collection_id == collection_id && i.post_id == post_id)
    {
        return Err(Failure::bad_request("already in collection"));
    }
    let id = store.next_id();
    let item = CollectionItem {
        id,
        user_id,
        collection_id,
        post_id,
    };
    store.items.insert(id, item.clone());
    Ok(item)
}

pub async fn list(State(db): State<Db>, Caller(user_id): Caller, Query(page): Query<Page>) -> Json<Vec<Collection>> {
    let store = db.read().await;
    let own = store.collections.values().filter(|c| c.user_id == user_id).cloned();
    Json(page.apply(own, DEFAULT_LIMIT))
}

pub async fn create(
    State(db): State<Db>,
    Caller(user_id): Caller,
    Json(input): Json<CollectionName>,
) -> Reply<Collection> {
    let mut store = db.write().await;
    if store
        .collections
        .values()
        .any(|c| c.user_id == user_id && c.name == input.name)
    {
        return Err(Failure::bad_request("collection name already used"));
    }
    let id = store.next_id();
    let collection = Collection {
        id,
        user_id,
        name: input.name,
        is_default: false,
    };
    store.collections.insert(id, collection.clone());
    Ok(Json(collection))
}

pub async fn update(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Caller(user_id): Caller,
    Json(input): Json<CollectionName>,
) -> Reply<Collection> {
    let mut store = db.write().await;
    owned_collection(&store, collection_id, user_id)?;
    let collection = store
        .collections
        .get_mut(&collection_id)
        .ok_or_else(|| Failure::not_found("collection not found"))?;
    collection.name = input.name;
    Ok(Json(collection.clone()))
}

pub async fn delete(State(db): State<Db>, Path(collection_id): Path<i64>, Caller(user_id): Caller) -> Reply<Value> {
    let mut store = db.write().await;
    if owned_collection(&store, collection_id, user_id)?.is_default {
        return Err(Failure::bad_request("the default collection cannot be deleted"));
    }
    store.collections.remove(&collection_id);
    store.items.retain(|_, i| i.collection_id != collection_id);
    Ok(Json(json!({ "message": "collection deleted" })))
}

/// Collect into the caller's default collection.
pub async fn collect(State(db): State<Db>, Caller(user_id): Caller, Json(input): Json<PostRef>) -> Reply<CollectionItem> {
    let mut store = db.write().await;
    let collection_id = store.default_collection(user_id);
    insert_item(&mut store, user_id, collection_id, input.post_id).map(Json)
}

pub async fn add_item(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Caller(user_id): Caller,
    Json(input): Json<PostRef>,
) -> Reply<CollectionItem> {
    let mut store = db.write().await;
    owned_collection(&store, collection_id, user_id)?;
    insert_item(&mut store, user_id, collection_id, input.post_id).map(Json)
}

pub async fn items(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Caller(user_id): Caller,
    Query(page): Query<Page>,
) -> Reply<Vec<ItemView>> {
    let store = db.read().await;
    owned_collection(&store, collection_id, user_id)?;
    let items = store
        .items
        .values()
        .filter(|i| i.collection_id == collection_id)
        .map(|item| ItemView {
            item: item.clone(),
            post: store.posts.get(&item.post_id).map(|p| store.with_stats(p, Some(user_id))),
        });
    Ok(Json(page.apply(items, DEFAULT_LIMIT)))
}

pub async fn remove_item(
    State(db): State<Db>,
    Path((collection_id, item_id)): Path<(i64, i64)>,
    Caller(user_id): Caller,
) -> Reply<CollectionItem> {
    let mut store = db.write().await;
    owned_collection(&store, collection_id, user_id)?;
    match store.items.get(&item_id) {
        Some(item) if item.collection_id == collection_id => {}
        _ => return Err(Failure::not_found("item not found")),
    }
    store
        .items
        .remove(&item_id)
        .map(Json)
        .ok_or_else(|| Failure::not_found("item not found"))
}
