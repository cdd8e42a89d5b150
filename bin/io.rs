use async_trait::async_trait;
use derive_more::{Display, Error};
use lib::protocol::{Event, Intent, ParseMessageError};
use std::io;

mod pipe;

pub use pipe::*;

/// The reason why a [`Channel`] failed.
#[derive(Debug, Display, Error)]
pub enum ChannelError {
    #[display(fmt = "the connection was closed")]
    Closed,

    #[display(fmt = "{_0}")]
    Io(io::Error),

    #[display(fmt = "{_0}")]
    Malformed(ParseMessageError),
}

/// Trait for types that exchange messages with a client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Channel {
    /// Receive the next intent.
    async fn recv(&mut self) -> Result<Intent, ChannelError>;

    /// Send an event.
    async fn send(&mut self, event: &Event) -> Result<(), ChannelError>;
}
