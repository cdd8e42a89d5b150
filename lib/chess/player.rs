use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque identifier of a player.
#[derive(Debug, Display, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, From)]
#[derive(Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// A fresh identifier that is unique with overwhelming probability.
    pub fn random() -> Self {
        PlayerId(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}
