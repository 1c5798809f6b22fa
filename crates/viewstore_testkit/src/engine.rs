//! In-process reference engine for the demo social-feed domain.
//!
//! `DemoEngine` is the authoritative state machine the scenario tests
//! run against: it owns true state, executes business logic per action,
//! and answers each call with the batch of path updates that action
//! produced. Every update in a batch carries the action's sequence
//! number, so versions strictly increase per engine.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use viewstore_codec::Value;
use viewstore_core::Engine;
use viewstore_protocol::{
    ActionRequest, Batch, EngineError, EngineResult, SnapshotUpdate, BOOTSTRAP_ACTION,
};

/// Maximum tweet length in characters.
pub const CONTENT_LIMIT: usize = 280;

#[derive(Debug, Clone)]
struct TweetRecord {
    id: String,
    author: String,
    content: String,
    like_count: i64,
    liked_by_me: bool,
}

#[derive(Default)]
struct DemoState {
    sequence: u64,
    user: Option<String>,
    tweets: Vec<TweetRecord>,
    next_tweet_id: u64,
    follower_counts: HashMap<String, i64>,
    following: HashSet<String>,
}

/// The demo engine: a serial state machine behind the engine bridge.
///
/// Supported actions: `initialize`, `login`, `logout`, `create-tweet`,
/// `like`, `unlike`, `follow`, `unfollow`. Compose failures land in an
/// inline `error` field of `compose/state` rather than failing the
/// action; structurally invalid requests (unknown action, unknown
/// tweet) are rejected.
#[derive(Default)]
pub struct DemoEngine {
    state: Mutex<DemoState>,
}

impl DemoEngine {
    /// Creates a fresh engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// The engine's current action sequence number.
    pub fn sequence(&self) -> u64 {
        self.state.lock().sequence
    }

    fn text_arg(request: &ActionRequest, field: &str) -> EngineResult<String> {
        let text = request
            .payload
            .as_ref()
            .map(|payload| payload.req_text(field))
            .transpose()
            .map_err(|e| EngineError::rejected(&request.name, e.to_string()))?
            .unwrap_or_default();
        if text.is_empty() {
            return Err(EngineError::rejected(
                &request.name,
                format!("missing `{field}`"),
            ));
        }
        Ok(text)
    }
}

fn auth_value(state: &DemoState) -> Value {
    match &state.user {
        Some(username) => Value::map(vec![
            ("phase".to_string(), Value::from("authenticated")),
            (
                "user".to_string(),
                Value::map(vec![(
                    "username".to_string(),
                    Value::from(username.as_str()),
                )]),
            ),
        ]),
        None => Value::map(vec![(
            "phase".to_string(),
            Value::from("unauthenticated"),
        )]),
    }
}

fn feed_value(state: &DemoState) -> Value {
    let tweets = state
        .tweets
        .iter()
        .map(|t| {
            Value::map(vec![
                ("id".to_string(), Value::from(t.id.as_str())),
                ("author".to_string(), Value::from(t.author.as_str())),
                ("content".to_string(), Value::from(t.content.as_str())),
                ("like_count".to_string(), Value::Integer(t.like_count)),
                ("liked_by_me".to_string(), Value::Bool(t.liked_by_me)),
            ])
        })
        .collect();
    Value::map(vec![("tweets".to_string(), Value::Array(tweets))])
}

fn compose_value(error: &str) -> Value {
    Value::map(vec![("error".to_string(), Value::from(error))])
}

fn profile_value(state: &DemoState, username: &str) -> Value {
    Value::map(vec![
        ("username".to_string(), Value::from(username)),
        (
            "follower_count".to_string(),
            Value::Integer(*state.follower_counts.get(username).unwrap_or(&0)),
        ),
        (
            "followed_by_me".to_string(),
            Value::Bool(state.following.contains(username)),
        ),
    ])
}

fn seed_tweets(state: &mut DemoState) {
    state.tweets = vec![
        TweetRecord {
            id: "t1".to_string(),
            author: "carol".to_string(),
            content: "welcome to the demo feed".to_string(),
            like_count: 2,
            liked_by_me: false,
        },
        TweetRecord {
            id: "t2".to_string(),
            author: "dave".to_string(),
            content: "second post".to_string(),
            like_count: 0,
            liked_by_me: false,
        },
    ];
    state.next_tweet_id = 3;
}

impl Engine for DemoEngine {
    fn call(&self, request: &ActionRequest) -> EngineResult<Batch> {
        let mut state = self.state.lock();
        state.sequence += 1;
        let version = state.sequence;

        match request.name.as_str() {
            BOOTSTRAP_ACTION => Ok(Batch::new(vec![SnapshotUpdate::put(
                "auth/state",
                version,
                auth_value(&state),
            )])),

            "login" => {
                let username = Self::text_arg(request, "username")?;
                state.user = Some(username);
                seed_tweets(&mut state);
                Ok(Batch::new(vec![
                    SnapshotUpdate::put("auth/state", version, auth_value(&state)),
                    SnapshotUpdate::put("timeline/feed", version, feed_value(&state)),
                    SnapshotUpdate::put("compose/state", version, compose_value("")),
                ]))
            }

            "logout" => {
                state.user = None;
                state.tweets.clear();
                state.following.clear();
                Ok(Batch::new(vec![
                    SnapshotUpdate::put("auth/state", version, auth_value(&state)),
                    SnapshotUpdate::clear("timeline/feed", version),
                    SnapshotUpdate::clear("compose/state", version),
                ]))
            }

            "create-tweet" => {
                let Some(author) = state.user.clone() else {
                    return Ok(Batch::new(vec![SnapshotUpdate::put(
                        "compose/state",
                        version,
                        compose_value("not signed in"),
                    )]));
                };
                let content = request
                    .payload
                    .as_ref()
                    .map(|p| p.opt_text("content"))
                    .unwrap_or_default();
                if content.is_empty() {
                    return Ok(Batch::new(vec![SnapshotUpdate::put(
                        "compose/state",
                        version,
                        compose_value("content is empty"),
                    )]));
                }
                if content.chars().count() > CONTENT_LIMIT {
                    // The timeline is deliberately not in this batch.
                    return Ok(Batch::new(vec![SnapshotUpdate::put(
                        "compose/state",
                        version,
                        compose_value(&format!(
                            "content exceeds {CONTENT_LIMIT} characters"
                        )),
                    )]));
                }
                let id = format!("t{}", state.next_tweet_id);
                state.next_tweet_id += 1;
                state.tweets.insert(
                    0,
                    TweetRecord {
                        id,
                        author,
                        content,
                        like_count: 0,
                        liked_by_me: false,
                    },
                );
                Ok(Batch::new(vec![
                    SnapshotUpdate::put("timeline/feed", version, feed_value(&state)),
                    SnapshotUpdate::put("compose/state", version, compose_value("")),
                ]))
            }

            "like" | "unlike" => {
                if state.user.is_none() {
                    return Err(EngineError::rejected(&request.name, "not signed in"));
                }
                let id = Self::text_arg(request, "tweet_id")?;
                let liking = request.name == "like";
                let tweet = state
                    .tweets
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| EngineError::rejected(&request.name, "unknown tweet"))?;
                if liking && !tweet.liked_by_me {
                    tweet.liked_by_me = true;
                    tweet.like_count += 1;
                } else if !liking && tweet.liked_by_me {
                    tweet.liked_by_me = false;
                    tweet.like_count -= 1;
                }
                Ok(Batch::new(vec![SnapshotUpdate::put(
                    "timeline/feed",
                    version,
                    feed_value(&state),
                )]))
            }

            "follow" | "unfollow" => {
                if state.user.is_none() {
                    return Err(EngineError::rejected(&request.name, "not signed in"));
                }
                let username = Self::text_arg(request, "username")?;
                let following = request.name == "follow";
                if following && state.following.insert(username.clone()) {
                    *state.follower_counts.entry(username.clone()).or_insert(0) += 1;
                } else if !following && state.following.remove(&username) {
                    *state.follower_counts.entry(username.clone()).or_insert(0) -= 1;
                }
                Ok(Batch::new(vec![SnapshotUpdate::put(
                    format!("profile/{username}"),
                    version,
                    profile_value(&state, &username),
                )]))
            }

            other => Err(EngineError::rejected(other, "unknown action")),
        }
    }
}
