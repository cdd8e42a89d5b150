use derive_more::{Display, Error};
use lib::arbiter::{Arbiter, Config, Dispatch, Rejection};
use lib::chess::PlayerId;
use lib::protocol::Intent;
use std::{future::pending, sync::Arc};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, instrument, warn};

/// The reason why the [`Hub`] refused a request.
#[derive(Debug, Display, Error)]
pub enum HubError {
    #[display(fmt = "{_0}")]
    Rejected(Rejection),

    #[display(fmt = "the match is no longer being refereed")]
    Gone,
}

#[derive(Debug)]
enum Command {
    Join {
        name: String,
        reply: oneshot::Sender<Result<PlayerId, Rejection>>,
    },

    Submit {
        player: PlayerId,
        intent: Intent,
        reply: oneshot::Sender<Result<(), Rejection>>,
    },
}

/// A handle to the task that owns the [`Arbiter`].
///
/// Requests are serialized through a queue, so intents are applied one at a time
/// in the order they arrive. Every resulting [`Dispatch`] is published to all subscribers.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<Command>,
    dispatches: broadcast::Sender<Arc<Dispatch>>,
}

impl Hub {
    const QUEUE: usize = 64;
    const BACKLOG: usize = 256;

    /// Spawns the referee task.
    pub fn spawn(config: Config) -> Self {
        let (commands, rx) = mpsc::channel(Self::QUEUE);
        let (dispatches, _) = broadcast::channel(Self::BACKLOG);
        tokio::spawn(referee(Arbiter::new(config), rx, dispatches.clone()));
        Hub {
            commands,
            dispatches,
        }
    }

    /// Subscribes to every [`Dispatch`] published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Dispatch>> {
        self.dispatches.subscribe()
    }

    /// Asks for a seat in the match.
    pub async fn join(&self, name: String) -> Result<PlayerId, HubError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Join { name, reply }, rx).await
    }

    /// Submits an intent on behalf of `player`.
    pub async fn submit(&self, player: PlayerId, intent: Intent) -> Result<(), HubError> {
        let (reply, rx) = oneshot::channel();
        let cmd = Command::Submit {
            player,
            intent,
            reply,
        };

        self.request(cmd, rx).await
    }

    async fn request<T>(
        &self,
        cmd: Command,
        rx: oneshot::Receiver<Result<T, Rejection>>,
    ) -> Result<T, HubError> {
        self.commands.send(cmd).await.map_err(|_| HubError::Gone)?;
        rx.await.map_err(|_| HubError::Gone)?.map_err(HubError::Rejected)
    }
}

#[instrument(level = "debug", skip_all)]
async fn referee(
    mut arbiter: Arbiter,
    mut commands: mpsc::Receiver<Command>,
    dispatches: broadcast::Sender<Arc<Dispatch>>,
) {
    let publish = |batch: Vec<Dispatch>| {
        for d in batch {
            debug!(audience = %d.audience, event = ?d.event, "publishing");
            // Nobody may be listening.
            dispatches.send(Arc::new(d)).ok();
        }
    };

    loop {
        let deadline = arbiter.deadline().map(Instant::from_std);
        let expiry = async move {
            match deadline {
                Some(d) => sleep_until(d).await,
                None => pending().await,
            }
        };

        tokio::select! {
            cmd = commands.recv() => match cmd {
                None => break,

                Some(Command::Join { name, reply }) => {
                    let result = arbiter.join(&name).map(|(id, batch)| {
                        publish(batch);
                        id
                    });

                    if reply.send(result).is_err() {
                        warn!(%name, "the requester is gone");
                    }
                }

                Some(Command::Submit { player, intent, reply }) => {
                    let now = Instant::now().into_std();
                    let result = arbiter.submit(&player, intent, now).map(&publish);

                    if reply.send(result).is_err() {
                        warn!(%player, "the requester is gone");
                    }
                }
            },

            _ = expiry => publish(arbiter.expire(Instant::now().into_std())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::chess::Coord;
    use lib::consensus::RejectReason;
    use lib::protocol::Event;
    use lib::rules::{Capability, PieceRule};
    use std::time::Duration;
    use tokio::{runtime, time::timeout};

    fn archer() -> PieceRule {
        PieceRule::new("Archer", "a", [Capability::leap([(0, 3)])])
    }

    #[test]
    fn dispatches_are_published_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        rt.block_on(async {
            let hub = Hub::spawn(Config::default());
            let mut events = hub.subscribe();

            let a = hub.join("alice".into()).await?;
            let b = hub.join("bob".into()).await?;

            let mut received = Vec::new();
            while let Ok(d) = events.try_recv() {
                received.push(d);
            }

            assert_eq!(
                received.first().map(|d| &d.event),
                Some(&Event::JoinSuccess { player_id: a })
            );

            assert!(matches!(
                received.last().map(|d| &d.event),
                Some(Event::State(s)) if s.players()[1] == &b
            ));

            Ok::<_, Box<dyn std::error::Error>>(())
        })
    }

    #[test]
    fn rejections_are_returned_to_the_sender() -> Result<(), Box<dyn std::error::Error>> {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        rt.block_on(async {
            let hub = Hub::spawn(Config::default());
            let _ = hub.join("alice".into()).await?;
            let b = hub.join("bob".into()).await?;
            let mut events = hub.subscribe();

            let intent = Intent::Move {
                from: Coord::new(4, 6)?,
                to: Coord::new(4, 5)?,
            };

            assert!(matches!(
                hub.submit(b, intent).await,
                Err(HubError::Rejected(Rejection::Move(_)))
            ));

            assert!(events.try_recv().is_err());
            Ok::<_, Box<dyn std::error::Error>>(())
        })
    }

    #[test]
    fn lapsed_proposals_are_rejected_in_the_background() -> Result<(), Box<dyn std::error::Error>>
    {
        let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

        rt.block_on(async {
            let config = Config {
                proposal_timeout: Some(Duration::from_millis(10)),
                ..Config::default()
            };

            let hub = Hub::spawn(config);
            let a = hub.join("alice".into()).await?;
            let _ = hub.join("bob".into()).await?;
            let mut events = hub.subscribe();

            hub.submit(a, Intent::ProposeRule { rule: archer() }).await?;

            let rejected = timeout(Duration::from_secs(5), async {
                loop {
                    match events.recv().await {
                        Ok(d) => {
                            if let Event::VoteRejected { reason, .. } = &d.event {
                                break Ok(*reason);
                            }
                        }

                        Err(e) => break Err(e),
                    }
                }
            });

            assert_eq!(rejected.await??, RejectReason::Expired);
            Ok::<_, Box<dyn std::error::Error>>(())
        })
    }
}
