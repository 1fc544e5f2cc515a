//! Endpoint groups of the photo platform API.
//!
//! Each method is one verb + path on one client instance. Paths are
//! relative to the API root. Comments-by-post and rating stats go through
//! the authenticated instance even though the server serves them without
//! an identity.

use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::api::PhotoApi;
use crate::error::ApiError;
use crate::http::Audience;
use crate::query::QueryParams;
use crate::transport::Transport;
use crate::upload::Upload;

macro_rules! endpoint_group {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<'a, T> {
            api: &'a PhotoApi<T>,
        }

        impl<'a, T: Transport> $name<'a, T> {
            pub(crate) fn new(api: &'a PhotoApi<T>) -> Self {
                Self { api }
            }
        }
    };
}

/// `format!` for API paths: every interpolated value is percent-encoded
/// as one path segment.
macro_rules! path {
    ($template:literal $(, $segment:expr)+ $(,)?) => {
        format!($template $(, urlencoding::encode(&$segment.to_string()))+)
    };
}

endpoint_group!(
    /// Accounts and profiles.
    Users
);
endpoint_group!(Posts);
endpoint_group!(Comments);
endpoint_group!(
    /// Likes live under `/interactions`.
    Likes
);
endpoint_group!(
    /// Shares also live under `/interactions`.
    Shares
);
endpoint_group!(Follows);
endpoint_group!(Ratings);
endpoint_group!(
    /// Collections (albums) and their items.
    Collections
);
endpoint_group!(Leaderboard);
endpoint_group!(
    /// Private messages.
    Messages
);

impl<T: Transport> Users<'_, T> {
    pub fn register<B: Serialize + ?Sized>(&self, form: &B) -> Result<Value, ApiError> {
        self.api.post("/users/register", form)
    }

    pub fn login<B: Serialize + ?Sized>(&self, credentials: &B) -> Result<Value, ApiError> {
        self.api.post("/users/login", credentials)
    }

    pub fn update_profile<B: Serialize + ?Sized>(&self, update: &B) -> Result<Value, ApiError> {
        self.api.put("/users/profile", update)
    }

    pub fn upload_avatar(&self, upload: &Upload) -> Result<Value, ApiError> {
        self.api.upload("/users/upload-avatar", upload)
    }

    pub fn user_info_by_id(&self, user_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, &path!("/users/info/{}", user_id), QueryParams::new())
    }

    pub fn user_by_username(&self, username: &str) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, &path!("/users/{}", username), QueryParams::new())
    }

    /// Full profile, including the background image.
    pub fn user_profile(&self, user_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, &path!("/users/profile/{}", user_id), QueryParams::new())
    }

    pub fn upload_background(&self, upload: &Upload) -> Result<Value, ApiError> {
        self.api.upload("/users/upload-background", upload)
    }

    /// Check that an id number is registered before a reset.
    pub fn forgot_password<B: Serialize + ?Sized>(&self, request: &B) -> Result<Value, ApiError> {
        self.api.post_as(Audience::Public, "/users/forgot-password", request)
    }

    pub fn reset_password<B: Serialize + ?Sized>(&self, request: &B) -> Result<Value, ApiError> {
        self.api.post_as(Audience::Public, "/users/reset-password", request)
    }
}

impl<T: Transport> Posts<'_, T> {
    pub fn create_post<B: Serialize + ?Sized>(&self, post: &B) -> Result<Value, ApiError> {
        self.api.post("/posts/", post)
    }

    pub fn get_posts<F: Serialize + ?Sized>(&self, filter: &F) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, "/posts/", QueryParams::from_filter(filter)?)
    }

    pub fn get_post(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, &path!("/posts/{}", post_id), QueryParams::new())
    }

    pub fn update_post<B: Serialize + ?Sized>(&self, post_id: impl Display, update: &B) -> Result<Value, ApiError> {
        self.api.put(&path!("/posts/{}", post_id), update)
    }

    pub fn delete_post(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api.delete(&path!("/posts/{}", post_id), QueryParams::new())
    }

    pub fn upload_image(&self, upload: &Upload) -> Result<Value, ApiError> {
        self.api.upload("/posts/upload-image", upload)
    }

    pub fn posts_by_user<F: Serialize + ?Sized>(&self, user_id: impl Display, filter: &F) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Public,
            &path!("/posts/user/{}", user_id),
            QueryParams::from_filter(filter)?,
        )
    }

    pub fn search_posts<F: Serialize + ?Sized>(&self, filter: &F) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, "/posts/search/", QueryParams::from_filter(filter)?)
    }
}

impl<T: Transport> Comments<'_, T> {
    pub fn create_comment<B: Serialize + ?Sized>(&self, comment: &B) -> Result<Value, ApiError> {
        self.api.post("/comments/", comment)
    }

    pub fn comments_by_post<F: Serialize + ?Sized>(&self, post_id: impl Display, filter: &F) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            &path!("/comments/post/{}", post_id),
            QueryParams::from_filter(filter)?,
        )
    }

    pub fn delete_comment(&self, comment_id: impl Display) -> Result<Value, ApiError> {
        self.api.delete(&path!("/comments/{}", comment_id), QueryParams::new())
    }
}

impl<T: Transport> Likes<'_, T> {
    pub fn like_post<B: Serialize + ?Sized>(&self, like: &B) -> Result<Value, ApiError> {
        self.api.post("/interactions/likes", like)
    }

    pub fn unlike_post(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .delete("/interactions/likes", QueryParams::new().push("post_id", post_id))
    }

    pub fn check_like(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            &path!("/interactions/likes/{}", post_id),
            QueryParams::new(),
        )
    }
}

impl<T: Transport> Shares<'_, T> {
    /// Sharing twice is not an error; the server returns the existing share.
    pub fn share_post<B: Serialize + ?Sized>(&self, share: &B) -> Result<Value, ApiError> {
        self.api.post("/interactions/shares", share)
    }

    pub fn unshare_post(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .delete("/interactions/shares", QueryParams::new().push("post_id", post_id))
    }

    pub fn check_share(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            &path!("/interactions/shares/{}", post_id),
            QueryParams::new(),
        )
    }
}

impl<T: Transport> Follows<'_, T> {
    pub fn follow_user<B: Serialize + ?Sized>(&self, follow: &B) -> Result<Value, ApiError> {
        self.api.post("/follows/", follow)
    }

    pub fn unfollow_user(&self, user_id: impl Display) -> Result<Value, ApiError> {
        self.api.delete(&path!("/follows/{}", user_id), QueryParams::new())
    }

    pub fn check_follow(&self, user_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Authenticated, &path!("/follows/{}", user_id), QueryParams::new())
    }

    pub fn user_stats(&self, user_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, &path!("/follows/stats/{}", user_id), QueryParams::new())
    }
}

impl<T: Transport> Ratings<'_, T> {
    pub fn create_rating<B: Serialize + ?Sized>(&self, rating: &B) -> Result<Value, ApiError> {
        self.api.post("/ratings/", rating)
    }

    pub fn update_rating<B: Serialize + ?Sized>(&self, post_id: impl Display, rating: &B) -> Result<Value, ApiError> {
        self.api.put(&path!("/ratings/{}", post_id), rating)
    }

    pub fn delete_rating(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api.delete(&path!("/ratings/{}", post_id), QueryParams::new())
    }

    pub fn rating_stats(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            &path!("/ratings/{}/stats", post_id),
            QueryParams::new(),
        )
    }
}

impl<T: Transport> Collections<'_, T> {
    /// Collect into the default collection.
    pub fn collect_post<B: Serialize + ?Sized>(&self, item: &B) -> Result<Value, ApiError> {
        self.api.post("/collections/items/", item)
    }

    pub fn get_collections<F: Serialize + ?Sized>(&self, filter: &F) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            "/collections/",
            QueryParams::from_filter(filter)?,
        )
    }

    pub fn create_collection<B: Serialize + ?Sized>(&self, collection: &B) -> Result<Value, ApiError> {
        self.api.post("/collections/", collection)
    }

    pub fn update_collection<B: Serialize + ?Sized>(
        &self,
        collection_id: impl Display,
        update: &B,
    ) -> Result<Value, ApiError> {
        self.api.put(&path!("/collections/{}", collection_id), update)
    }

    pub fn delete_collection(&self, collection_id: impl Display) -> Result<Value, ApiError> {
        self.api
            .delete(&path!("/collections/{}", collection_id), QueryParams::new())
    }

    pub fn add_to_collection<B: Serialize + ?Sized>(
        &self,
        collection_id: impl Display,
        item: &B,
    ) -> Result<Value, ApiError> {
        self.api.post(&path!("/collections/{}/items/", collection_id), item)
    }

    pub fn collection_items<F: Serialize + ?Sized>(
        &self,
        collection_id: impl Display,
        filter: &F,
    ) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            &path!("/collections/{}/items/", collection_id),
            QueryParams::from_filter(filter)?,
        )
    }

    pub fn remove_from_collection(&self, collection_id: impl Display, item_id: impl Display) -> Result<Value, ApiError> {
        self.api.delete(
            &path!("/collections/{}/items/{}", collection_id, item_id),
            QueryParams::new(),
        )
    }
}

impl<T: Transport> Leaderboard<'_, T> {
    pub fn hot_posts<F: Serialize + ?Sized>(&self, filter: &F) -> Result<Value, ApiError> {
        self.api
            .get(Audience::Public, "/leaderboard/hot", QueryParams::from_filter(filter)?)
    }
}

impl<T: Transport> Messages<'_, T> {
    pub fn send_message<B: Serialize + ?Sized>(&self, message: &B) -> Result<Value, ApiError> {
        self.api.post("/messages/", message)
    }

    /// Answers `{ "image_url" }` to put in a message.
    pub fn upload_message_image(&self, upload: &Upload) -> Result<Value, ApiError> {
        self.api.upload("/messages/upload-image", upload)
    }

    pub fn conversation<F: Serialize + ?Sized>(&self, user_id: impl Display, filter: &F) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            &path!("/messages/conversation/{}", user_id),
            QueryParams::from_filter(filter)?,
        )
    }

    pub fn inbox<F: Serialize + ?Sized>(&self, filter: &F) -> Result<Value, ApiError> {
        self.api.get(
            Audience::Authenticated,
            "/messages/",
            QueryParams::from_filter(filter)?,
        )
    }
}
