use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};
use std::{num::NonZeroU32, str::FromStr, time::Duration};

#[cfg(test)]
use proptest::prelude::*;

/// When players may spawn pieces.
#[derive(Debug, Display, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// At any time, regardless of whose turn it is.
    #[default]
    #[display(fmt = "anytime")]
    Anytime,

    /// Only on one's own turn.
    #[display(fmt = "own turn")]
    OwnTurn,
}

/// Whether moves and spawns are serviced while a proposal awaits votes.
#[derive(Debug, Display, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum VotePolicy {
    #[default]
    #[display(fmt = "allow")]
    Allow,

    #[display(fmt = "reject")]
    Reject,
}

/// The reason why parsing [`Config`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse server configuration")]
pub struct ParseConfigError(ron::de::SpannedError);

/// Runtime configuration for an [`Arbiter`][`crate::arbiter::Arbiter`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How many rejected proposals end the match.
    #[cfg_attr(test, strategy((1..=10u32).prop_filter_map("zero", NonZeroU32::new)))]
    pub max_disagreements: NonZeroU32,

    /// How long a proposal may await votes before it lapses.
    #[cfg_attr(test, strategy(proptest::option::of((1..3600u64).prop_map(Duration::from_secs))))]
    #[serde(with = "humantime_serde")]
    pub proposal_timeout: Option<Duration>,

    pub spawn: SpawnPolicy,

    pub during_vote: VotePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_disagreements: NonZeroU32::MIN.saturating_add(2),
            proposal_timeout: None,
            spawn: SpawnPolicy::default(),
            during_vote: VotePolicy::default(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for Config {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}
