//! In-memory records and the derived views the API returns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub id_number: String,
    pub is_active: bool,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub avatar_url: Option<String>,
    pub background_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub images: Option<Vec<String>>,
    pub visibility: i32,
}

/// A post with its author and interaction counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostWithStats {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<User>,
    pub likes_count: usize,
    pub shares_count: usize,
    pub comments_count: usize,
    pub collections_count: usize,
    pub rating_count: usize,
    pub average_rating: Option<f64>,
    pub can_collect: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    pub post_id: i64,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Share {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub followers_count: usize,
    pub following_count: usize,
    pub posts_count: usize,
    pub likes_received: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub is_default: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: i64,
    pub user_id: i64,
    pub collection_id: i64,
    pub post_id: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub is_read: bool,
}

/// Every table of the platform, keyed by id.
#[derive(Debug, Default)]
pub struct Store {
    last_id: i64,
    pub users: BTreeMap<i64, User>,
    pub posts: BTreeMap<i64, Post>,
    pub comments: BTreeMap<i64, Comment>,
    pub likes: BTreeMap<i64, Like>,
    pub shares: BTreeMap<i64, Share>,
    pub follows: BTreeMap<i64, Follow>,
    pub ratings: BTreeMap<i64, Rating>,
    pub collections: BTreeMap<i64, Collection>,
    pub items: BTreeMap<i64, CollectionItem>,
    pub messages: BTreeMap<i64, Message>,
}

impl Store {
    /// Ids are unique across all tables.
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn with_stats(&self, post: &Post, viewer: Option<i64>) -> PostWithStats {
        let scores: Vec<f64> = self
            .ratings
            .values()
            .filter(|r| r.post_id == post.id)
            .map(|r| r.score)
            .collect();
        let average_rating = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };
        PostWithStats {
            post: post.clone(),
            author: self.users.get(&post.author_id).cloned(),
            likes_count: self.likes.values().filter(|l| l.post_id == post.id).count(),
            shares_count: self.shares.values().filter(|s| s.post_id == post.id).count(),
            comments_count: self.comments.values().filter(|c| c.post_id == post.id).count(),
            collections_count: self.items.values().filter(|i| i.post_id == post.id).count(),
            rating_count: scores.len(),
            average_rating,
            can_collect: viewer != Some(post.author_id),
        }
    }

    pub fn user_stats(&self, user_id: i64) -> UserStats {
        let own_posts: Vec<i64> = self
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        UserStats {
            followers_count: self.follows.values().filter(|f| f.following_id == user_id).count(),
            following_count: self.follows.values().filter(|f| f.follower_id == user_id).count(),
            posts_count: own_posts.len(),
            likes_received: self
                .likes
                .values()
                .filter(|l| own_posts.contains(&l.post_id))
                .count(),
        }
    }

    /// Remove a post and everything hanging off it.
    pub fn remove_post(&mut self, post_id: i64) -> Option<Post> {
        let post = self.posts.remove(&post_id)?;
        self.comments.retain(|_, c| c.post_id != post_id);
        self.likes.retain(|_, l| l.post_id != post_id);
        self.shares.retain(|_, s| s.post_id != post_id);
        self.ratings.retain(|_, r| r.post_id != post_id);
        self.items.retain(|_, i| i.post_id != post_id);
        Some(post)
    }

    /// The caller's default collection, created on first use.
    pub fn default_collection(&mut self, user_id: i64) -> i64 {
        if let Some(existing) = self
            .collections
            .values()
            .find(|c| c.user_id == user_id && c.is_default)
        {
            return existing.id;
        }
        let id = self.next_id();
        self.collections.insert(
            id,
            Collection {
                id,
                user_id,
                name: "Default".to_string(),
                is_default: true,
            },
        );
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(store: &mut Store, author_id: i64) -> Post {
        let id = store.next_id();
        let post = Post {
            id,
            author_id,
            title: "Dunes".to_string(),
            content: "Namib".to_string(),
            images: None,
            visibility: 0,
        };
        store.posts.insert(id, post.clone());
        post
    }

    #[test]
    fn ids_are_unique_across_tables() {
        let mut store = Store::default();
        assert_eq!(store.next_id(), 1);
        assert_eq!(store.next_id(), 2);
    }

    #[test]
    fn stats_average_ratings() {
        let mut store = Store::default();
        let p = post(&mut store, 1);
        for (user_id, score) in [(2, 8.0), (3, 9.0)] {
            let id = store.next_id();
            store.ratings.insert(id, Rating { id, user_id, post_id: p.id, score });
        }
        let stats = store.with_stats(&p, Some(1));
        assert_eq!(stats.rating_count, 2);
        assert_eq!(stats.average_rating, Some(8.5));
        assert!(!stats.can_collect, "authors cannot collect their own post");
        assert!(store.with_stats(&p, None).can_collect);
    }

    #[test]
    fn removing_post_cascades() {
        let mut store = Store::default();
        let p = post(&mut store, 1);
        let id = store.next_id();
        store.likes.insert(id, Like { id, user_id: 2, post_id: p.id });
        let id = store.next_id();
        store.shares.insert(id, Share { id, user_id: 2, post_id: p.id });
        store.remove_post(p.id).unwrap();
        assert!(store.likes.is_empty());
        assert!(store.shares.is_empty());
        assert!(store.remove_post(p.id).is_none());
    }

    #[test]
    fn default_collection_is_reused() {
        let mut store = Store::default();
        let first = store.default_collection(4);
        let second = store.default_collection(4);
        assert_eq!(first, second);
        assert_eq!(store.collections.len(), 1);
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: 1,
            username: "ansel".to_string(),
            email: "a@x.io".to_string(),
            id_number: "1".to_string(),
            is_active: true,
            password: "secret".to_string(),
            avatar_url: None,
            background_url: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
    }
}
