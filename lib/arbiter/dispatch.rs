use crate::chess::PlayerId;
use crate::protocol::Event;
use derive_more::Display;

/// The recipients of an [`Event`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash)]
pub enum Audience {
    #[display(fmt = "everyone")]
    Everyone,
    #[display(fmt = "{_0}")]
    Player(PlayerId),
    #[display(fmt = "everyone but {_0}")]
    Except(PlayerId),
}

impl Audience {
    /// Whether `player` is among the recipients.
    pub fn includes(&self, player: &PlayerId) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Player(p) => p == player,
            Audience::Except(p) => p != player,
        }
    }
}

/// An [`Event`] addressed to an [`Audience`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Dispatch {
    pub audience: Audience,
    pub event: Event,
}

impl Dispatch {
    /// Addresses `event` to every player.
    pub fn everyone(event: Event) -> Self {
        Dispatch {
            audience: Audience::Everyone,
            event,
        }
    }

    /// Addresses `event` to `player` only.
    pub fn to(player: PlayerId, event: Event) -> Self {
        Dispatch {
            audience: Audience::Player(player),
            event,
        }
    }

    /// Addresses `event` to every player but `player`.
    pub fn except(player: PlayerId, event: Event) -> Self {
        Dispatch {
            audience: Audience::Except(player),
            event,
        }
    }
}
