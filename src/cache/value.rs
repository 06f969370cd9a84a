//! Cache Value Module
//!
//! Defines what a cache can hold and how its size is estimated.

use serde::de::DeserializeOwned;
use serde::Serialize;

// == Cache Value ==
/// Bound for values stored in a cache.
///
/// Values are cloned out on every hit and serialized when a cache is
/// persistent. String-like values expose a text view through [`as_text`],
/// which is what compression operates on.
///
/// [`as_text`]: CacheValue::as_text
pub trait CacheValue: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Text view of a string-like value, `None` for everything else.
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Rebuilds a value from text produced by [`CacheValue::as_text`].
    fn from_text(_text: String) -> Option<Self> {
        None
    }

    /// Approximate footprint in bytes.
    ///
    /// Text is counted as two bytes per UTF-16 code unit; anything else as
    /// the length of its JSON encoding.
    fn size_estimate(&self) -> usize {
        match self.as_text() {
            Some(text) => text_size(text),
            None => serde_json::to_vec(self).map(|b| b.len()).unwrap_or(0),
        }
    }
}

/// Size estimate for a piece of text.
pub fn text_size(text: &str) -> usize {
    text.encode_utf16().count() * 2
}

impl CacheValue for String {
    fn as_text(&self) -> Option<&str> {
        Some(self)
    }

    fn from_text(text: String) -> Option<Self> {
        Some(text)
    }
}

impl CacheValue for serde_json::Value {
    fn as_text(&self) -> Option<&str> {
        self.as_str()
    }

    fn from_text(text: String) -> Option<Self> {
        Some(serde_json::Value::String(text))
    }
}

impl<T: CacheValue> CacheValue for Vec<T> {}

impl<T: CacheValue> CacheValue for Option<T> {}

macro_rules! opaque_cache_value {
    ($($ty:ty),* $(,)?) => {
        $(impl CacheValue for $ty {})*
    };
}

opaque_cache_value!(bool, i32, i64, u32, u64, usize, f32, f64);
