use std::fmt::Display;

use rand::{Rng, distr::Alphanumeric};

// -------------------------------------------------------------------------------------------------------

pub const DEFAULT_ID_LENGTH: usize = 12;

/// Opaque token linking an outbound request or subscription to the notifications the backend
/// sends back for it. The backend treats it as a plain string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        CorrelationId(id.into())
    }

    /// draws `len` characters uniformly from `[A-Za-z0-9]`.
    /// Not cryptographically secure, only collision resistant enough for one session.
    pub fn random(len: usize) -> Self {
        let id: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        CorrelationId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        CorrelationId::new(id)
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        CorrelationId(id)
    }
}

impl From<CorrelationId> for serde_json::Value {
    fn from(id: CorrelationId) -> Self {
        serde_json::Value::String(id.0)
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn random_ids_are_alphanumeric_with_requested_length() {
        let id = CorrelationId::random(DEFAULT_ID_LENGTH);
        assert_eq!(id.as_str().len(), DEFAULT_ID_LENGTH);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ten_thousand_ids_do_not_collide() {
        let ids: HashSet<CorrelationId> = (0..10_000)
            .map(|_| CorrelationId::random(DEFAULT_ID_LENGTH))
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CorrelationId::new("abcDEF123456");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abcDEF123456\"");
        let back: CorrelationId = serde_json::from_str("\"abcDEF123456\"").unwrap();
        assert_eq!(back, id);
    }
}
