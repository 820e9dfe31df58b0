//! Key Namespace Module
//!
//! Pure, deterministic builders for cache keys and invalidation patterns.
//! Keys look like `coldcalls:list:<digest>`, `coldcalls:detail:<id>`,
//! `transcripts:childrenOf:<callId>`; the family segment groups keys for
//! bulk invalidation, the discriminator makes the key unique.

use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

// == Key Builders ==
/// Key for a list query of `resource`, discriminated by its parameters.
///
/// Logically equal parameters always map to the same key; different
/// filter/sort/limit combinations map to different keys (up to hash
/// collisions of the full-width digest, which are not expected in
/// practice).
pub fn list_key(resource: &str, params: &Value) -> String {
    format!("{}:list:{}", resource, query_digest(params))
}

/// Key for a single record of `resource`.
pub fn detail_key(resource: &str, id: &str) -> String {
    format!("{}:detail:{}", resource, id)
}

/// Key for the canonical child collection of one parent record, e.g. the
/// transcript belonging to a call or the alerts targeting a user.
pub fn children_key(resource: &str, parent_id: &str) -> String {
    format!("{}:childrenOf:{}", resource, parent_id)
}

/// Pattern matching every list-query key of `resource`.
///
/// Mutation handlers use this for bulk invalidation after a write.
pub fn list_pattern(resource: &str) -> KeyPattern {
    KeyPattern::Prefix(format!("{}:list:", resource))
}

/// Pattern matching every cached key of `resource`, lists and details alike.
pub fn family_pattern(resource: &str) -> KeyPattern {
    KeyPattern::Prefix(format!("{}:", resource))
}

// == Query Digest ==
/// Full-width SHA-256 hex digest of the canonical form of `params`.
///
/// The digest covers the whole serialization; truncating it would let two
/// distinct queries collide onto one key and silently serve each other's
/// data.
pub fn query_digest(params: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(params).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Serializes `value` with object keys in sorted order at every depth.
///
/// Key order must not depend on how serde_json backs its maps, otherwise
/// the digest (and with it the cache key) would change under a feature
/// flag.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

// == Key Pattern ==
/// Closed set of invalidation patterns.
///
/// Free-form wildcard strings are deliberately not supported; the only
/// accepted glob form is a single trailing `*` (see
/// [`KeyPattern::from_glob`]), which keeps multi-wildcard and mid-string
/// wildcard behavior out of the contract entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPattern {
    /// Matches exactly one key
    Exact(String),
    /// Matches every key starting with the prefix
    Prefix(String),
}

impl KeyPattern {
    // == Matches ==
    /// Returns true if `key` falls under this pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Exact(exact) => key == exact,
            KeyPattern::Prefix(prefix) => key.starts_with(prefix),
        }
    }

    // == From Glob ==
    /// Parses the string form used at invalidation call sites.
    ///
    /// A single trailing `*` makes a prefix pattern; no `*` makes an exact
    /// one. Any other wildcard placement is a programmer error: debug
    /// builds assert, release builds fall back to an exact match on the
    /// raw string so no unintended keys are removed.
    pub fn from_glob(pattern: &str) -> Self {
        match pattern.strip_suffix('*') {
            Some(prefix) if !prefix.contains('*') => KeyPattern::Prefix(prefix.to_string()),
            None if !pattern.contains('*') => KeyPattern::Exact(pattern.to_string()),
            _ => {
                debug_assert!(false, "unsupported wildcard placement in {:?}", pattern);
                KeyPattern::Exact(pattern.to_string())
            }
        }
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPattern::Exact(exact) => write!(f, "{}", exact),
            KeyPattern::Prefix(prefix) => write!(f, "{}*", prefix),
        }
    }
}
