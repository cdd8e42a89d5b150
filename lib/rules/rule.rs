use crate::chess::Coord;
use crate::rules::Capability;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The reason why a [`PieceRule`] may not be adopted.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum InvalidRule {
    #[display(fmt = "the piece type must have a name")]
    EmptyName,

    #[display(fmt = "the piece type must have a symbol")]
    EmptySymbol,

    #[display(fmt = "the piece type must have at least one capability")]
    NoCapabilities,

    #[display(fmt = "slide range {range} does not fit on the board")]
    RangeTooLong { range: u8 },

    #[display(fmt = "leap must have at least one offset")]
    EmptyLeap,

    #[display(fmt = "leap offset ({dx}, {dy}) does not move the piece")]
    NullOffset { dx: i8, dy: i8 },
}

/// The reason why parsing a [`PieceRule`] failed.
#[derive(Debug, Display, Error)]
#[display(fmt = "failed to parse piece rule")]
pub struct ParsePieceRuleError(serde_json::Error);

/// The movement rules of a named piece type.
///
/// A piece type never changes once adopted, amendments introduce new names.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{name}")]
pub struct PieceRule {
    #[cfg_attr(test, strategy("[A-Z][a-z]{1,8}"))]
    pub name: String,
    #[cfg_attr(test, strategy("[a-z♚♛♜♝♞♟]{1,3}"))]
    pub symbol: String,
    #[cfg_attr(test, strategy(proptest::collection::vec(proptest::prelude::any::<Capability>(), 1..4)))]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub is_royal: bool,
}

impl PieceRule {
    /// Constructs a non-royal [`PieceRule`].
    pub fn new<N, S, I>(name: N, symbol: S, capabilities: I) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        I: IntoIterator<Item = Capability>,
    {
        PieceRule {
            name: name.into(),
            symbol: symbol.into(),
            capabilities: capabilities.into_iter().collect(),
            is_royal: false,
        }
    }

    /// Marks this piece type as royal.
    pub fn royal(self) -> Self {
        PieceRule {
            is_royal: true,
            ..self
        }
    }

    /// Checks whether this rule is well formed.
    pub fn validate(&self) -> Result<(), InvalidRule> {
        if self.name.trim().is_empty() {
            return Err(InvalidRule::EmptyName);
        }

        if self.symbol.trim().is_empty() {
            return Err(InvalidRule::EmptySymbol);
        }

        if self.capabilities.is_empty() {
            return Err(InvalidRule::NoCapabilities);
        }

        for c in &self.capabilities {
            match c {
                Capability::Slide { range, .. } if *range >= Coord::SIZE => {
                    return Err(InvalidRule::RangeTooLong { range: *range });
                }

                Capability::Leap { offsets } if offsets.is_empty() => {
                    return Err(InvalidRule::EmptyLeap);
                }

                Capability::Leap { offsets } => {
                    if let Some(&(dx, dy)) = offsets.get(&(0, 0)) {
                        return Err(InvalidRule::NullOffset { dx, dy });
                    }
                }

                Capability::Slide { .. } => {}
            }
        }

        Ok(())
    }
}

impl FromStr for PieceRule {
    type Err = ParsePieceRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(ParsePieceRuleError)
    }
}
