//! Typed demo models.
//!
//! These are the hand-written equivalents of the typed decoders a host
//! binding would generate from the engine's state shapes. Each one
//! satisfies the decode contract: absent fields default, and only a
//! required field present with the wrong shape is an error.

use viewstore_codec::{DecodeError, DecodeResult, FromValue, Value};

/// Authentication phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// No user is signed in.
    Unauthenticated,
    /// A user is signed in.
    Authenticated,
}

/// Reference to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    /// Account name.
    pub username: String,
}

impl FromValue for UserRef {
    fn from_value(value: &Value) -> DecodeResult<Self> {
        Ok(Self {
            username: value.req_text("username")?,
        })
    }
}

/// State slice at `auth/state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// Current phase.
    pub phase: AuthPhase,
    /// Signed-in user; absent while unauthenticated.
    pub user: Option<UserRef>,
}

impl FromValue for AuthState {
    fn from_value(value: &Value) -> DecodeResult<Self> {
        let phase = match value.req_text("phase")?.as_str() {
            "" | "unauthenticated" => AuthPhase::Unauthenticated,
            "authenticated" => AuthPhase::Authenticated,
            other => return Err(DecodeError::invalid(format!("unknown auth phase `{other}`"))),
        };
        let user = value
            .opt_field("user")
            .map(UserRef::from_value)
            .transpose()?;
        Ok(Self { phase, user })
    }
}

/// One tweet in the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    /// Tweet id.
    pub id: String,
    /// Author username.
    pub author: String,
    /// Tweet text.
    pub content: String,
    /// Number of likes.
    pub like_count: i64,
    /// Whether the signed-in user liked it.
    pub liked_by_me: bool,
}

impl FromValue for Tweet {
    fn from_value(value: &Value) -> DecodeResult<Self> {
        Ok(Self {
            id: value.req_text("id")?,
            author: value.req_text("author")?,
            content: value.req_text("content")?,
            like_count: value.req_i64("like_count")?,
            liked_by_me: value.req_bool("liked_by_me")?,
        })
    }
}

/// State slice at `timeline/feed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    /// Tweets, newest first.
    pub tweets: Vec<Tweet>,
}

impl FeedState {
    /// Finds a tweet by id.
    pub fn tweet(&self, id: &str) -> Option<&Tweet> {
        self.tweets.iter().find(|t| t.id == id)
    }
}

impl FromValue for FeedState {
    fn from_value(value: &Value) -> DecodeResult<Self> {
        let tweets = value
            .req_array("tweets")?
            .iter()
            .map(Tweet::from_value)
            .collect::<DecodeResult<Vec<_>>>()?;
        Ok(Self { tweets })
    }
}

/// State slice at `compose/state`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeState {
    /// Inline error from the last compose attempt; empty when the
    /// attempt succeeded.
    pub error: String,
}

impl ComposeState {
    /// Returns true if the last compose attempt failed.
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

impl FromValue for ComposeState {
    fn from_value(value: &Value) -> DecodeResult<Self> {
        Ok(Self {
            error: value.req_text("error")?,
        })
    }
}

/// State slice at `profile/{username}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Account name.
    pub username: String,
    /// Follower count.
    pub follower_count: i64,
    /// Whether the signed-in user follows this account.
    pub followed_by_me: bool,
}

impl FromValue for Profile {
    fn from_value(value: &Value) -> DecodeResult<Self> {
        Ok(Self {
            username: value.req_text("username")?,
            follower_count: value.req_i64("follower_count")?,
            followed_by_me: value.req_bool("followed_by_me")?,
        })
    }
}
