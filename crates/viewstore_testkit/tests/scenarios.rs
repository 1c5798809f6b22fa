//! End-to-end scenarios against the demo engine.

use viewstore_codec::Value;
use viewstore_testkit::{
    with_demo_store, AuthPhase, AuthState, ComposeState, DemoStore, FeedState, Profile,
    CONTENT_LIMIT,
};

fn payload(field: &str, value: &str) -> Option<Value> {
    Some(Value::map(vec![(field.to_string(), Value::from(value))]))
}

#[test]
fn login_flow() {
    let demo = DemoStore::new();

    // Nothing is populated before the bootstrap action.
    assert!(demo.store.get("auth/state").unwrap().is_none());

    demo.store.initialize().unwrap().wait().unwrap();
    let auth = demo.get_as::<AuthState>("auth/state").unwrap();
    assert_eq!(auth.phase, AuthPhase::Unauthenticated);
    assert!(auth.user.is_none());

    demo.store.emit("login", payload("username", "alice")).unwrap();
    let auth = demo.get_sync_as::<AuthState>("auth/state").unwrap();
    assert_eq!(auth.phase, AuthPhase::Authenticated);
    assert_eq!(auth.user.as_ref().unwrap().username, "alice");
}

#[test]
fn compose_over_limit_reports_inline_error_and_leaves_timeline_alone() {
    with_demo_store(|demo| {
        demo.login("alice");
        let feed_before = demo.store.snapshot("timeline/feed").unwrap();

        let long_content = "x".repeat(CONTENT_LIMIT + 1);
        demo.store
            .emit(
                "create-tweet",
                Some(Value::map(vec![(
                    "content".to_string(),
                    Value::from(long_content),
                )])),
            )
            .unwrap();

        let compose = demo.get_sync_as::<ComposeState>("compose/state").unwrap();
        assert!(compose.has_error());
        assert!(compose.error.contains("280"));

        // The batch did not include the timeline: same value, same version.
        let feed_after = demo.store.snapshot("timeline/feed").unwrap();
        assert_eq!(feed_after.version, feed_before.version);
        assert_eq!(feed_after.value, feed_before.value);
    });
}

#[test]
fn compose_within_limit_lands_in_timeline() {
    with_demo_store(|demo| {
        demo.login("alice");

        demo.store
            .emit("create-tweet", payload("content", "hello world"))
            .unwrap();

        let compose = demo.get_sync_as::<ComposeState>("compose/state").unwrap();
        assert!(!compose.has_error());

        let feed = demo.get_as::<FeedState>("timeline/feed").unwrap();
        assert_eq!(feed.tweets[0].content, "hello world");
        assert_eq!(feed.tweets[0].author, "alice");
    });
}

#[test]
fn like_unlike_round_trip_restores_counts() {
    with_demo_store(|demo| {
        demo.login("alice");

        let feed = demo.get_sync_as::<FeedState>("timeline/feed").unwrap();
        let before = feed.tweet("t1").unwrap().clone();

        demo.store.emit("like", payload("tweet_id", "t1")).unwrap();
        let feed = demo.get_sync_as::<FeedState>("timeline/feed").unwrap();
        let liked = feed.tweet("t1").unwrap();
        assert!(liked.liked_by_me);
        assert_eq!(liked.like_count, before.like_count + 1);

        demo.store.emit("unlike", payload("tweet_id", "t1")).unwrap();
        let feed = demo.get_sync_as::<FeedState>("timeline/feed").unwrap();
        let after = feed.tweet("t1").unwrap();
        assert_eq!(after.liked_by_me, before.liked_by_me);
        assert_eq!(after.like_count, before.like_count);
    });
}

#[test]
fn logout_clears_derived_state() {
    with_demo_store(|demo| {
        demo.login("alice");
        assert!(demo.get_as::<FeedState>("timeline/feed").is_some());

        demo.store.emit("logout", None).unwrap();
        demo.store.wait_idle().unwrap();

        assert!(demo.store.get("timeline/feed").unwrap().is_none());
        let auth = demo.get_as::<AuthState>("auth/state").unwrap();
        assert_eq!(auth.phase, AuthPhase::Unauthenticated);
    });
}

#[test]
fn follow_updates_parameterized_profile_path() {
    with_demo_store(|demo| {
        demo.login("alice");

        demo.store.emit("follow", payload("username", "carol")).unwrap();
        demo.store.wait_idle().unwrap();

        // `profile/{username}` decodes through the parameterized pattern.
        let profile = demo.get_as::<Profile>("profile/carol").unwrap();
        assert_eq!(profile.username, "carol");
        assert_eq!(profile.follower_count, 1);
        assert!(profile.followed_by_me);

        demo.store
            .emit("unfollow", payload("username", "carol"))
            .unwrap();
        demo.store.wait_idle().unwrap();

        let profile = demo.get_as::<Profile>("profile/carol").unwrap();
        assert_eq!(profile.follower_count, 0);
        assert!(!profile.followed_by_me);
    });
}

#[test]
fn rejected_action_surfaces_on_the_ticket() {
    with_demo_store(|demo| {
        demo.login("alice");

        let ticket = demo
            .store
            .emit("like", payload("tweet_id", "no-such-tweet"))
            .unwrap();
        let err = ticket.wait().unwrap_err();
        assert!(err.to_string().contains("unknown tweet"));

        // The failure left the cache usable and the queue alive.
        demo.store.emit("like", payload("tweet_id", "t1")).unwrap();
        let feed = demo.get_sync_as::<FeedState>("timeline/feed").unwrap();
        assert!(feed.tweet("t1").unwrap().liked_by_me);
    });
}

#[test]
fn subscriber_follows_a_full_session() {
    with_demo_store(|demo| {
        let events = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let events_clone = std::sync::Arc::clone(&events);
        let handle = demo.store.subscribe("auth/state", move |change| {
            events_clone.lock().push(change.version);
        });

        demo.login("alice");
        demo.store.emit("logout", None).unwrap();
        demo.store.wait_idle().unwrap();

        let seen = events.lock().clone();
        // Login changed auth/state, logout changed it back; versions in
        // order of application (a cleared path reports version 0, but
        // auth/state is replaced, not cleared).
        assert_eq!(seen.len(), 2);
        assert!(seen[0] < seen[1]);

        handle.release();
        demo.login("bob");
        assert_eq!(events.lock().len(), 2);
    });
}

#[test]
fn stats_count_a_session() {
    with_demo_store(|demo| {
        demo.login("alice");
        demo.store.emit("like", payload("tweet_id", "t1")).unwrap();
        let _ = demo
            .store
            .emit("like", payload("tweet_id", "missing"))
            .unwrap()
            .wait();
        demo.store.wait_idle().unwrap();

        let stats = demo.store.stats();
        // initialize + login + 2 likes.
        assert_eq!(stats.actions_enqueued, 4);
        assert_eq!(stats.actions_settled, 3);
        assert_eq!(stats.actions_failed, 1);
        assert!(stats.updates_applied >= 4);
        assert_eq!(stats.stale_writes_discarded, 0);
    });
}
