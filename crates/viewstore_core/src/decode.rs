//! Decoder registry: typed projection of raw snapshots.
//!
//! A decoder turns one path's raw [`Value`] into a typed model. Lookup
//! precedence: an exact path registration wins over a parameterized
//! pattern (`"profile/{id}"`), which wins over no registration at all
//! (the raw value passes through untyped).

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use viewstore_codec::{DecodeResult, FromValue, Value};

/// A type-erased decoded value.
///
/// Typed callers downcast to the model type their decoder produced;
/// unregistered paths decode to a passthrough wrapping the raw
/// [`Value`].
#[derive(Clone)]
pub struct DecodedValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl DecodedValue {
    /// Wraps a typed value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Downcasts to the concrete decoded type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Returns the raw value if this is an untyped passthrough.
    pub fn as_raw(&self) -> Option<Arc<Value>> {
        self.downcast::<Value>()
    }
}

impl std::fmt::Debug for DecodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.as_raw() {
            Some(raw) => write!(f, "DecodedValue(raw: {raw:?})"),
            None => write!(f, "DecodedValue(typed)"),
        }
    }
}

type DecodeFn = Arc<dyn Fn(&Value) -> DecodeResult<DecodedValue> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern: literal segments and `{param}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
    raw: String,
}

impl PathPattern {
    /// Parses a pattern such as `"profile/{id}"`.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
                    Segment::Param(segment[1..segment.len() - 1].to_string())
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        Self {
            segments,
            raw: pattern.to_string(),
        }
    }

    /// Returns true if the pattern has no parameter segments.
    pub fn is_exact(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Number of literal segments; more literals means more specific.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Returns true if `path` matches this pattern segment for segment.
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('/');
        for segment in &self.segments {
            let Some(part) = parts.next() else {
                return false;
            };
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return false;
                    }
                }
                Segment::Param(_) => {
                    if part.is_empty() {
                        return false;
                    }
                }
            }
        }
        parts.next().is_none()
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Maps path patterns to typed decode functions.
pub struct DecoderRegistry {
    exact: RwLock<HashMap<String, DecodeFn>>,
    // Sorted by literal count, most specific first; insertion order
    // breaks ties.
    patterns: RwLock<Vec<(PathPattern, DecodeFn)>>,
}

impl DecoderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            exact: RwLock::new(HashMap::new()),
            patterns: RwLock::new(Vec::new()),
        }
    }

    /// Registers a decode function for a pattern.
    ///
    /// An exact pattern replaces any previous registration for the same
    /// path.
    pub fn register<F>(&self, pattern: &str, decode: F)
    where
        F: Fn(&Value) -> DecodeResult<DecodedValue> + Send + Sync + 'static,
    {
        let parsed = PathPattern::parse(pattern);
        let decode: DecodeFn = Arc::new(decode);
        if parsed.is_exact() {
            self.exact.write().insert(pattern.to_string(), decode);
        } else {
            let mut patterns = self.patterns.write();
            let literal_count = parsed.literal_count();
            let position = patterns
                .iter()
                .position(|(p, _)| p.literal_count() < literal_count)
                .unwrap_or(patterns.len());
            patterns.insert(position, (parsed, decode));
        }
    }

    /// Registers a typed model for a pattern.
    ///
    /// The model's [`FromValue`] impl becomes the decode function; read
    /// it back with [`DecodedValue::downcast`].
    pub fn register_typed<T>(&self, pattern: &str)
    where
        T: FromValue + Any + Send + Sync,
    {
        self.register(pattern, |value| {
            T::from_value(value).map(DecodedValue::new)
        });
    }

    /// Decodes a snapshot value for a path.
    ///
    /// Resolution: exact registration, then the most specific matching
    /// parameterized pattern, then untyped passthrough.
    pub fn decode(&self, path: &str, value: &Value) -> DecodeResult<DecodedValue> {
        if let Some(decode) = self.exact.read().get(path) {
            return decode(value);
        }
        if let Some(decode) = self
            .patterns
            .read()
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, decode)| Arc::clone(decode))
        {
            return decode(value);
        }
        Ok(DecodedValue::new(value.clone()))
    }

    /// Number of registered patterns (exact plus parameterized).
    pub fn len(&self) -> usize {
        self.exact.read().len() + self.patterns.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewstore_codec::DecodeError;

    #[derive(Debug, PartialEq)]
    struct Profile {
        username: String,
        follower_count: i64,
    }

    impl FromValue for Profile {
        fn from_value(value: &Value) -> DecodeResult<Self> {
            Ok(Self {
                username: value.req_text("username")?,
                follower_count: value.req_i64("follower_count")?,
            })
        }
    }

    fn profile_value(name: &str) -> Value {
        Value::map(vec![
            ("username".to_string(), Value::from(name)),
            ("follower_count".to_string(), Value::Integer(2)),
        ])
    }

    #[test]
    fn pattern_matching() {
        let exact = PathPattern::parse("auth/state");
        assert!(exact.is_exact());
        assert!(exact.matches("auth/state"));
        assert!(!exact.matches("auth/other"));
        assert!(!exact.matches("auth/state/extra"));

        let param = PathPattern::parse("profile/{id}");
        assert!(!param.is_exact());
        assert_eq!(param.literal_count(), 1);
        assert!(param.matches("profile/bob"));
        assert!(param.matches("profile/alice"));
        assert!(!param.matches("profile"));
        assert!(!param.matches("profile/bob/feed"));
        assert!(!param.matches("timeline/bob"));
    }

    #[test]
    fn typed_decode_via_registry() {
        let registry = DecoderRegistry::new();
        registry.register_typed::<Profile>("profile/{id}");

        let decoded = registry
            .decode("profile/bob", &profile_value("bob"))
            .unwrap();
        let profile = decoded.downcast::<Profile>().unwrap();
        assert_eq!(profile.username, "bob");
        assert_eq!(profile.follower_count, 2);
    }

    #[test]
    fn exact_wins_over_parameterized() {
        let registry = DecoderRegistry::new();
        registry.register_typed::<Profile>("profile/{id}");
        registry.register("profile/me", |_| {
            Ok(DecodedValue::new("special".to_string()))
        });

        let decoded = registry.decode("profile/me", &profile_value("me")).unwrap();
        assert_eq!(*decoded.downcast::<String>().unwrap(), "special");

        // Other ids still hit the parameterized decoder.
        let decoded = registry
            .decode("profile/bob", &profile_value("bob"))
            .unwrap();
        assert!(decoded.downcast::<Profile>().is_some());
    }

    #[test]
    fn more_literal_segments_win_among_parameterized() {
        let registry = DecoderRegistry::new();
        registry.register("{section}/{id}", |_| {
            Ok(DecodedValue::new("generic".to_string()))
        });
        registry.register("profile/{id}", |_| {
            Ok(DecodedValue::new("profile".to_string()))
        });

        let decoded = registry.decode("profile/bob", &Value::Null).unwrap();
        assert_eq!(*decoded.downcast::<String>().unwrap(), "profile");

        let decoded = registry.decode("timeline/feed", &Value::Null).unwrap();
        assert_eq!(*decoded.downcast::<String>().unwrap(), "generic");
    }

    #[test]
    fn unregistered_path_passes_through_raw() {
        let registry = DecoderRegistry::new();
        let value = profile_value("bob");
        let decoded = registry.decode("anything/else", &value).unwrap();
        assert_eq!(*decoded.as_raw().unwrap(), value);
    }

    #[test]
    fn decode_errors_propagate() {
        let registry = DecoderRegistry::new();
        registry.register_typed::<Profile>("profile/{id}");

        let malformed = Value::map(vec![("username".to_string(), Value::Integer(7))]);
        let err = registry.decode("profile/bob", &malformed).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { .. }));
    }

    #[test]
    fn missing_optional_fields_default() {
        let registry = DecoderRegistry::new();
        registry.register_typed::<Profile>("profile/{id}");

        let sparse = Value::map(vec![]);
        let decoded = registry.decode("profile/bob", &sparse).unwrap();
        let profile = decoded.downcast::<Profile>().unwrap();
        assert_eq!(profile.username, "");
        assert_eq!(profile.follower_count, 0);
    }
}
