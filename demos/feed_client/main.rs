//! ViewStore demo - a feed session against the demo engine.
//!
//! This example demonstrates the store surface end to end:
//! - Constructing a store over an engine
//! - Registering typed decoders
//! - Subscribing to state slices
//! - Emitting actions and reading settled state with `get_sync`
//!
//! Run with: cargo run -p feed_client

use viewstore_codec::Value;
use viewstore_testkit::{AuthState, ComposeState, DemoStore, FeedState};

fn payload(field: &str, value: &str) -> Option<Value> {
    Some(Value::map(vec![(field.to_string(), Value::from(value))]))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let demo = DemoStore::new();
    let store = &demo.store;

    // Watch the slices a feed screen would render.
    let _auth_sub = store.subscribe("auth/state", |change| {
        tracing::info!(path = %change.path, version = change.version, "auth changed");
    });
    let _feed_sub = store.subscribe("timeline/feed", |change| {
        tracing::info!(path = %change.path, version = change.version, "feed changed");
    });

    // Bootstrap, then run a short session.
    store
        .initialize()
        .expect("enqueue bootstrap")
        .wait()
        .expect("bootstrap settles");

    store
        .emit("login", payload("username", "alice"))
        .expect("enqueue login");
    let auth = demo
        .get_sync_as::<AuthState>("auth/state")
        .expect("auth decodes");
    println!(
        "signed in as {}",
        auth.user.as_ref().map(|u| u.username.as_str()).unwrap_or("?")
    );

    store
        .emit("create-tweet", payload("content", "hello from the demo client"))
        .expect("enqueue tweet");
    store
        .emit("like", payload("tweet_id", "t1"))
        .expect("enqueue like");

    let feed = demo
        .get_sync_as::<FeedState>("timeline/feed")
        .expect("feed decodes");
    println!("timeline ({} tweets):", feed.tweets.len());
    for tweet in &feed.tweets {
        let marker = if tweet.liked_by_me { "*" } else { " " };
        println!(
            "  {marker} {:>2} likes  @{:<6} {}",
            tweet.like_count, tweet.author, tweet.content
        );
    }

    let compose = demo
        .get_sync_as::<ComposeState>("compose/state")
        .expect("compose decodes");
    if compose.has_error() {
        println!("compose error: {}", compose.error);
    }

    store.emit("logout", None).expect("enqueue logout");
    store.wait_idle().expect("queue drains");
    println!(
        "after logout, timeline absent: {}",
        store.snapshot("timeline/feed").is_none()
    );

    let stats = store.stats();
    println!(
        "session: {} actions, {} settled, {} failed, {} updates",
        stats.actions_enqueued, stats.actions_settled, stats.actions_failed, stats.updates_applied
    );
}
