//! Destination identity and routing primitives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a registered remote destination.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DestinationId(Arc<str>);

impl DestinationId {
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DestinationId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for DestinationId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Debug for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DestinationId({:?})", &*self.0)
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DestinationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DestinationId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self(Arc::from(s)))
    }
}

/// Opaque handle to a remote chat, interpreted only by the channel
/// implementation (a numeric chat id, a username, a webhook slug, ...).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ChatRef(Arc<str>);

impl ChatRef {
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChatRef {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ChatRef {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Debug for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChatRef({:?})", &*self.0)
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ChatRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChatRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self(Arc::from(s)))
    }
}

/// How a destination selects the records it receives.
///
/// Exclusive destinations only receive records whose origin tag matches the
/// destination's owning origin; broadcast destinations receive every
/// qualifying record regardless of tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    Exclusive,
    #[default]
    Broadcast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_mode_serde() {
        let json = serde_json::to_string(&RoutingMode::Exclusive).unwrap();
        assert_eq!(json, "\"exclusive\"");
        let back: RoutingMode = serde_json::from_str("\"broadcast\"").unwrap();
        assert_eq!(back, RoutingMode::Broadcast);
    }
}
