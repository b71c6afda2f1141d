//! OriginTag - Cheap-to-clone identifier of the producing client/session
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Identifier of the logical client/session that produced a record.
///
/// Internally uses `Arc<str>` so cloning only increments a reference count.
/// Origin tags are created once per logical session and cloned onto every
/// record that session submits, so cheap cloning matters here.
///
/// # Examples
/// ```
/// use contracts::OriginTag;
///
/// let tag: OriginTag = "client1".into();
/// let tag2 = tag.clone();  // O(1) - just increments ref count
/// assert_eq!(tag, tag2);
/// assert_eq!(tag.as_str(), "client1");
/// ```
#[derive(Clone, Default)]
pub struct OriginTag(Arc<str>);

impl OriginTag {
    /// Create a new OriginTag from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for OriginTag {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for OriginTag {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OriginTag {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OriginTag {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for OriginTag {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl PartialEq for OriginTag {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for OriginTag {}

impl PartialEq<str> for OriginTag {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl Hash for OriginTag {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Debug for OriginTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OriginTag({:?})", &*self.0)
    }
}

impl fmt::Display for OriginTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for OriginTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OriginTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self(Arc::from(s)))
    }
}
