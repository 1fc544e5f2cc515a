//! End-to-end runs against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `PhotoApi` over
//! real HTTP with `UreqTransport`. Validates that request building,
//! identity injection and response interception work with the actual
//! server, including the 401 path.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use photo_core::types::{
    CollectionName, Credentials, ForgotPassword, NewComment, NewPost, Page, PostRef, RatingRequest, RegisterUser,
    ResetPassword,
};
use photo_core::{ApiError, Identity, MemorySession, PhotoApi, PhotoClient, SessionStore, Upload, UreqTransport};
use serde_json::json;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
    });
    addr
}

struct Harness {
    api: PhotoApi,
    session: Arc<MemorySession>,
    hook_calls: Arc<AtomicUsize>,
}

fn connect(addr: SocketAddr) -> Harness {
    let session = Arc::new(MemorySession::new());
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let counter = hook_calls.clone();
    let client = PhotoClient::new(&format!("http://{addr}/api"), session.clone()).on_unauthorized(move |path| {
        assert_eq!(path, "/login");
        counter.fetch_add(1, Ordering::SeqCst);
    });
    Harness {
        api: PhotoApi::new(client, UreqTransport::new(Duration::from_secs(5))),
        session,
        hook_calls,
    }
}

fn register_and_sign_in(api: &PhotoApi, username: &str) -> Identity {
    api.users()
        .register(&RegisterUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "pw".to_string(),
            id_number: format!("id-{username}"),
            confirm_password: "pw".to_string(),
        })
        .unwrap();
    api.sign_in(&Credentials {
        id_number: format!("id-{username}"),
        password: "pw".to_string(),
    })
    .unwrap()
}

#[test]
fn social_lifecycle() {
    let addr = start_server();
    let author = connect(addr);
    let fan = connect(addr);

    // Step 1: two users register and sign in.
    let author_id = register_and_sign_in(&author.api, "ansel");
    assert_eq!(author_id.username, "ansel");
    assert_eq!(author.session.user_id().as_deref(), Some(author_id.user_id.as_str()));
    let fan_id = register_and_sign_in(&fan.api, "dorothea");
    assert_ne!(author_id.user_id, fan_id.user_id);

    // Step 2: the author publishes; anyone can read it.
    let created = author
        .api
        .posts()
        .create_post(&NewPost {
            title: "Clearing Winter Storm".to_string(),
            content: "Yosemite valley".to_string(),
            images: None,
        })
        .unwrap();
    let post_id = created["id"].as_i64().unwrap();
    assert_eq!(created["author_id"].to_string(), author_id.user_id);

    let fetched = fan.api.posts().get_post(post_id).unwrap();
    assert_eq!(fetched["title"], "Clearing Winter Storm");
    let listed = fan.api.posts().get_posts(&Page::new(0, 10)).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let found = fan.api.posts().search_posts(&json!({ "q": "valley" })).unwrap();
    assert_eq!(found.as_array().unwrap().len(), 1);

    let upload = Upload::new("storm.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    let uploaded = author.api.posts().upload_image(&upload).unwrap();
    assert!(uploaded["url"].as_str().unwrap().starts_with("/images/"));

    // Step 3: like, check, unlike.
    let likes = fan.api.likes();
    likes.like_post(&PostRef { post_id }).unwrap();
    assert_eq!(likes.check_like(post_id).unwrap(), json!(true));
    let hot = fan.api.leaderboard().hot_posts(&json!({ "limit": 3 })).unwrap();
    assert_eq!(hot[0]["likes_count"], 1);
    likes.unlike_post(post_id).unwrap();
    assert_eq!(likes.check_like(post_id).unwrap(), json!(false));

    // Step 4: comments and ratings.
    fan.api
        .comments()
        .create_comment(&NewComment {
            post_id,
            content: "the light!".to_string(),
        })
        .unwrap();
    let comments = author.api.comments().comments_by_post(post_id, &Page::default()).unwrap();
    assert_eq!(comments.as_array().unwrap().len(), 1);

    fan.api
        .ratings()
        .create_rating(&RatingRequest { post_id, score: 9.5 })
        .unwrap();
    let stats = fan.api.ratings().rating_stats(post_id).unwrap();
    assert_eq!(stats["rating_count"], 1);

    // Step 5: follow.
    fan.api
        .follows()
        .follow_user(&json!({ "following_id": author_id.user_id.parse::<i64>().unwrap() }))
        .unwrap();
    let stats = fan.api.follows().user_stats(&author_id.user_id).unwrap();
    assert_eq!(stats["followers_count"], 1);

    // Step 6: collections.
    let collections = fan.api.collections();
    let item = collections.collect_post(&PostRef { post_id }).unwrap();
    let default_id = item["collection_id"].as_i64().unwrap();
    let items = collections.collection_items(default_id, &Page::default()).unwrap();
    assert_eq!(items[0]["post"]["title"], "Clearing Winter Storm");
    let named = collections
        .create_collection(&CollectionName {
            name: "Valleys".to_string(),
        })
        .unwrap();
    let named_id = named["id"].as_i64().unwrap();
    collections.add_to_collection(named_id, &PostRef { post_id }).unwrap();
    let all = collections.get_collections(&Page::default()).unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);
    collections.delete_collection(named_id).unwrap();

    // Step 7: messages.
    fan.api
        .messages()
        .send_message(&json!({ "recipient_id": created["author_id"], "content": "hello" }))
        .unwrap();
    let inbox = author.api.messages().inbox(&Page::default()).unwrap();
    assert_eq!(inbox[0]["content"], "hello");

    // Step 8: delete the post and confirm it is gone.
    author.api.posts().delete_post(post_id).unwrap();
    let err = fan.api.posts().get_post(post_id).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }), "{err:?}");

    assert_eq!(author.hook_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fan.hook_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_identity_clears_session_and_fires_hook() {
    let addr = start_server();
    let harness = connect(addr);
    harness.session.remember(&Identity::new("999", "ghost")).unwrap();

    let err = harness.api.collections().get_collections(&Page::default()).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }), "{err:?}");
    assert_eq!(err.status(), Some(401));
    assert!(harness.session.identity().is_none());
    assert_eq!(harness.hook_calls.load(Ordering::SeqCst), 1);

    // Signed out now, so the same call is a validation error and the hook stays quiet.
    let err = harness.api.collections().get_collections(&Page::default()).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 422, .. }), "{err:?}");
    assert_eq!(harness.hook_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn public_not_found_passes_through() {
    let addr = start_server();
    let harness = connect(addr);
    harness.session.remember(&Identity::new("1", "ansel")).unwrap();

    let err = harness.api.users().user_by_username("nobody").unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }), "{err:?}");
    assert!(harness.session.identity().is_some());
    assert_eq!(harness.hook_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn sign_out_forgets_identity() {
    let addr = start_server();
    let harness = connect(addr);
    register_and_sign_in(&harness.api, "vivian");
    assert!(harness.session.identity().is_some());

    harness.api.sign_out().unwrap();
    assert!(harness.session.identity().is_none());
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let harness = connect(addr);
    let err = harness.api.posts().get_posts(&Page::default()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert_eq!(harness.hook_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn usernames_with_reserved_characters_are_looked_up() {
    let addr = start_server();
    let harness = connect(addr);

    for username in ["ann lee", "a/b?c#d", "摄影师"] {
        let identity = register_and_sign_in(&harness.api, username);
        let user = harness.api.users().user_by_username(username).unwrap();
        assert_eq!(user["username"], username);
        assert_eq!(user["id"].to_string(), identity.user_id);
    }
}

#[test]
fn sign_up_then_share_and_reset_password() {
    let addr = start_server();
    let harness = connect(addr);

    let identity = harness
        .api
        .sign_up(&RegisterUser {
            username: "imogen".to_string(),
            email: "imogen@example.com".to_string(),
            password: "pw".to_string(),
            id_number: "id-imogen".to_string(),
            confirm_password: "pw".to_string(),
        })
        .unwrap();
    assert_eq!(harness.session.identity(), Some(identity.clone()));

    let post_id = harness
        .api
        .posts()
        .create_post(&json!({ "title": "Magnolia", "content": "close up" }))
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    let shares = harness.api.shares();
    shares.share_post(&PostRef { post_id }).unwrap();
    assert_eq!(shares.check_share(post_id).unwrap(), json!(true));
    shares.unshare_post(post_id).unwrap();
    assert_eq!(shares.check_share(post_id).unwrap(), json!(false));

    let profile = harness.api.users().user_profile(&identity.user_id).unwrap();
    assert_eq!(profile["username"], "imogen");

    harness.api.sign_out().unwrap();
    harness
        .api
        .users()
        .forgot_password(&ForgotPassword {
            id_number: "id-imogen".to_string(),
        })
        .unwrap();
    harness
        .api
        .users()
        .reset_password(&ResetPassword {
            id_number: "id-imogen".to_string(),
            new_password: "fresh".to_string(),
        })
        .unwrap();
    let signed_in = harness
        .api
        .sign_in(&Credentials {
            id_number: "id-imogen".to_string(),
            password: "fresh".to_string(),
        })
        .unwrap();
    assert_eq!(signed_in, identity);
}
