use crate::rules::{Capability, PieceRule, SlidePattern};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The reason why a [`PieceRule`] could not be inserted into the [`Registry`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "piece type `{name}` is already defined")]
pub struct DuplicateRule {
    pub name: String,
}

/// The reason why a piece type could not be found in the [`Registry`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "piece type `{name}` is not defined")]
pub struct UnknownPieceType {
    pub name: String,
}

/// The authoritative collection of piece types, keyed by name.
///
/// The registry only ever grows, existing rules are never replaced.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Registry(BTreeMap<String, PieceRule>);

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// The name of the piece type that captures diagonally.
    pub const PAWN: &'static str = "Pawn";

    /// A registry with no piece types.
    pub fn empty() -> Self {
        Registry(BTreeMap::new())
    }

    /// A registry with the six standard piece types.
    pub fn standard() -> Self {
        use SlidePattern::*;

        let knight = [
            (1, 2),
            (2, 1),
            (2, -1),
            (1, -2),
            (-1, -2),
            (-2, -1),
            (-2, 1),
            (-1, 2),
        ];

        let king = Capability::Slide {
            pattern: Omni,
            range: 1,
            can_jump: false,
            only_forward: false,
        };

        let pawn = Capability::Slide {
            pattern: Linear,
            range: 1,
            can_jump: false,
            only_forward: true,
        };

        let mut registry = Registry::empty();
        for rule in [
            PieceRule::new("King", "♚", [king]).royal(),
            PieceRule::new("Queen", "♛", [Capability::slide(Omni)]),
            PieceRule::new("Rook", "♜", [Capability::slide(Linear)]),
            PieceRule::new("Bishop", "♝", [Capability::slide(Diagonal)]),
            PieceRule::new("Knight", "♞", [Capability::leap(knight)]),
            PieceRule::new(Self::PAWN, "♟", [pawn]),
        ] {
            registry.0.insert(rule.name.clone(), rule);
        }

        registry
    }

    /// Looks up a piece type by name.
    pub fn get(&self, name: &str) -> Result<&PieceRule, UnknownPieceType> {
        self.0.get(name).ok_or_else(|| UnknownPieceType {
            name: name.to_string(),
        })
    }

    /// Whether a piece type with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Adds a new piece type, failing if the name is already taken.
    pub fn insert(&mut self, rule: PieceRule) -> Result<(), DuplicateRule> {
        if self.contains(&rule.name) {
            return Err(DuplicateRule { name: rule.name });
        }

        self.0.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Whether pieces of the given type are royal.
    ///
    /// Unknown piece types are not royal.
    pub fn is_royal(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|r| r.is_royal)
    }

    /// The number of piece types.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no piece types.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An iterator over all piece types in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PieceRule> {
        self.0.values()
    }
}
