use crate::hub::{Hub, HubError};
use crate::io::{Channel, ChannelError};
use anyhow::Error as Anyhow;
use lib::arbiter::Dispatch;
use lib::chess::PlayerId;
use lib::protocol::{Event, Intent};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};

/// A client connected to the [`Hub`].
#[derive(Debug)]
pub struct Session<C: Channel> {
    channel: C,
    hub: Hub,
    player: Option<PlayerId>,
}

impl<C: Channel + Send> Session<C> {
    pub fn new(channel: C, hub: Hub) -> Self {
        Session {
            channel,
            hub,
            player: None,
        }
    }

    /// Relays intents to the [`Hub`] and events back to the client until either side hangs up.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn run(mut self) -> Result<(), Anyhow> {
        let mut dispatches = self.hub.subscribe();

        loop {
            tokio::select! {
                intent = self.channel.recv() => match intent {
                    Ok(intent) => self.handle(intent).await?,

                    Err(ChannelError::Malformed(e)) => {
                        warn!("{e}");
                        self.channel.send(&Event::error(e)).await?;
                    }

                    Err(ChannelError::Closed) => {
                        info!(player = ?self.player, "client disconnected");
                        break Ok(());
                    }

                    Err(e) => break Err(e.into()),
                },

                dispatch = dispatches.recv() => match dispatch {
                    Ok(d) => self.deliver(&d).await?,
                    Err(RecvError::Lagged(n)) => warn!(n, "dropped events"),
                    Err(RecvError::Closed) => break Ok(()),
                },
            }
        }
    }

    /// Forwards `intent` to the [`Hub`], reporting refusals back to the client only.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn handle(&mut self, intent: Intent) -> Result<(), Anyhow> {
        let result = match (self.player.clone(), intent) {
            (Some(player), intent) => self.hub.submit(player, intent).await,

            (None, Intent::Join { name }) => self.hub.join(name).await.map(|id| {
                info!(player = %id, "seated");
                self.player = Some(id);
            }),

            (None, _) => {
                let event = Event::error("join the match first");
                return Ok(self.channel.send(&event).await?);
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(e @ HubError::Gone) => Err(e.into()),
            Err(HubError::Rejected(r)) if r.is_reported() => {
                debug!(kind = %r.kind(), "{r}");
                Ok(self.channel.send(&Event::error(r)).await?)
            }

            Err(HubError::Rejected(r)) => {
                debug!(kind = %r.kind(), "ignoring {r}");
                Ok(())
            }
        }
    }

    /// Sends the event to the client if it is among the recipients.
    pub async fn deliver(&mut self, dispatch: &Dispatch) -> Result<(), ChannelError> {
        match &self.player {
            Some(p) if dispatch.audience.includes(p) => self.channel.send(&dispatch.event).await,
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MockChannel;
    use lib::arbiter::{Audience, Config};
    use lib::chess::Coord;
    use mockall::Sequence;
    use test_strategy::proptest;
    use tokio::runtime;

    fn malformed() -> ChannelError {
        ChannelError::Malformed("garbage".parse::<Intent>().unwrap_err())
    }

    #[proptest]
    fn events_for_others_are_not_delivered(#[strategy("[a-z]+")] text: String) {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });

        let mut channel = MockChannel::new();
        channel.expect_send().never();

        let mut session = Session::new(channel, hub);
        session.player = Some(PlayerId::from("me"));

        let dispatch = Dispatch::to(PlayerId::from("you"), Event::info(&text));
        rt.block_on(session.deliver(&dispatch))?;

        let dispatch = Dispatch::except(PlayerId::from("me"), Event::info(&text));
        rt.block_on(session.deliver(&dispatch))?;
    }

    #[proptest]
    fn events_for_the_player_are_delivered(#[strategy("[a-z]+")] text: String) {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });

        let event = Event::info(&text);
        let expected = event.clone();

        let mut channel = MockChannel::new();
        channel
            .expect_send()
            .once()
            .withf(move |e| e == &expected)
            .returning(|_| Ok(()));

        let mut session = Session::new(channel, hub);
        session.player = Some(PlayerId::from("me"));

        let dispatch = Dispatch {
            audience: Audience::Everyone,
            event,
        };

        rt.block_on(session.deliver(&dispatch))?;
    }

    #[proptest]
    fn nothing_is_delivered_before_joining(#[strategy("[a-z]+")] text: String) {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });

        let mut channel = MockChannel::new();
        channel.expect_send().never();

        let mut session = Session::new(channel, hub);
        rt.block_on(session.deliver(&Dispatch::everyone(Event::info(&text))))?;
    }

    #[proptest]
    fn intents_before_joining_are_refused(accept: bool) {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });

        let mut channel = MockChannel::new();
        channel
            .expect_send()
            .once()
            .withf(|e| matches!(e, Event::Error { .. }))
            .returning(|_| Ok(()));

        let mut session = Session::new(channel, hub);
        assert!(rt.block_on(session.handle(Intent::Vote { accept })).is_ok());
        assert_eq!(session.player, None);
    }

    #[test]
    fn joining_seats_the_player() -> Result<(), Anyhow> {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });

        let mut channel = MockChannel::new();
        channel.expect_send().never();

        let mut session = Session::new(channel, hub);
        let intent = Intent::Join {
            name: "alice".into(),
        };

        rt.block_on(session.handle(intent))?;
        assert!(session.player.is_some());
        Ok(())
    }

    #[test]
    fn refused_intents_are_reported_to_the_sender() -> Result<(), Anyhow> {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });
        let _ = rt.block_on(hub.join("alice".into()))?;
        let bob = rt.block_on(hub.join("bob".into()))?;

        let mut channel = MockChannel::new();
        channel
            .expect_send()
            .once()
            .withf(|e| matches!(e, Event::Error { message } if message.contains("turn")))
            .returning(|_| Ok(()));

        let mut session = Session::new(channel, hub);
        session.player = Some(bob);

        let intent = Intent::Move {
            from: Coord::new(4, 6)?,
            to: Coord::new(4, 5)?,
        };

        rt.block_on(session.handle(intent))?;
        Ok(())
    }

    #[test]
    fn out_of_sequence_votes_are_ignored() -> Result<(), Anyhow> {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });
        let alice = rt.block_on(hub.join("alice".into()))?;
        let _ = rt.block_on(hub.join("bob".into()))?;

        let mut channel = MockChannel::new();
        channel.expect_send().never();

        let mut session = Session::new(channel, hub);
        session.player = Some(alice);

        rt.block_on(session.handle(Intent::Vote { accept: true }))?;
        Ok(())
    }

    #[test]
    fn malformed_messages_are_answered_and_the_session_goes_on() -> Result<(), Anyhow> {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });

        let mut channel = MockChannel::new();
        let mut seq = Sequence::new();

        channel
            .expect_recv()
            .once()
            .in_sequence(&mut seq)
            .returning(|| Err(malformed()));

        channel
            .expect_send()
            .once()
            .in_sequence(&mut seq)
            .withf(|e| matches!(e, Event::Error { .. }))
            .returning(|_| Ok(()));

        channel
            .expect_recv()
            .once()
            .in_sequence(&mut seq)
            .returning(|| Err(ChannelError::Closed));

        rt.block_on(Session::new(channel, hub).run())?;
        Ok(())
    }

    #[proptest]
    fn io_failures_end_the_session(#[strategy(".*")] reason: String) {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
        let hub = rt.block_on(async { Hub::spawn(Config::default()) });

        let mut channel = MockChannel::new();
        channel.expect_recv().once().returning(move || {
            Err(ChannelError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                reason.clone(),
            )))
        });

        assert!(rt.block_on(Session::new(channel, hub).run()).is_err());
    }
}
