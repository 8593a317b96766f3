use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a liquidity point, assigned by the upstream detector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a derived context: the point it reads plus the evaluation instant.
///
/// Contexts are never persisted on their own, so the id is a readable composite
/// (`{point_id}@{epoch_nanos}`) rather than a digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub String);

impl ContextId {
    pub fn derive(point_id: &PointId, evaluated_at: DateTime<Utc>) -> Self {
        Self(format!("{}@{}", point_id.0, instant_key(evaluated_at)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic scenario id (template + context + evaluation instant).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    /// BLAKE3 over a canonical pipe-joined key.
    pub fn derive(template: &str, context_id: &ContextId, evaluated_at: DateTime<Utc>) -> Self {
        let canonical = format!("{template}|{}|{}", context_id.0, instant_key(evaluated_at));
        let hash = blake3::hash(canonical.as_bytes());
        Self(hash.to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Epoch nanoseconds where representable, so instants one nanosecond apart
/// never share an id; `{millis}ms` outside that range (years ~1677..2262).
fn instant_key(at: DateTime<Utc>) -> String {
    at.timestamp_nanos_opt()
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("{}ms", at.timestamp_millis()))
}
