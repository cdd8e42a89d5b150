use crate::chess::{Coord, Outcome, PlayerId};
use crate::consensus::{Phase, Resolution};
use crate::game::GameState;
use crate::protocol::{Event, Intent};
use std::time::Instant;
use tracing::{debug, info, instrument};

mod config;
mod dispatch;
mod rejection;

pub use config::*;
pub use dispatch::*;
pub use rejection::*;

#[derive(Debug, Clone, Eq, PartialEq)]
struct Seat {
    id: PlayerId,
    name: String,
}

/// The authoritative referee of a match.
///
/// Intents are validated and applied one at a time, each producing the events
/// that must be delivered and to whom. Nothing here knows about the transport.
#[derive(Debug, Clone)]
pub struct Arbiter {
    config: Config,
    seats: Vec<Seat>,
    state: Option<GameState>,
    phase: Phase,
}

impl Arbiter {
    /// How many players a match seats.
    pub const SEATS: usize = 2;

    /// An empty lobby.
    pub fn new(config: Config) -> Self {
        Arbiter {
            config,
            seats: Vec::with_capacity(Self::SEATS),
            state: None,
            phase: Phase::Idle,
        }
    }

    /// This arbiter's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The state of the match, once both players have joined.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// The amendment phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The display name of `player`, if seated.
    pub fn name_of(&self, player: &PlayerId) -> Option<&str> {
        self.seats
            .iter()
            .find(|s| &s.id == player)
            .map(|s| s.name.as_str())
    }

    /// The instant past which the pending proposal lapses, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.phase.deadline()
    }

    /// Seats a new player, starting the match once the table is full.
    #[instrument(level = "debug", skip(self), err)]
    pub fn join(&mut self, name: &str) -> Result<(PlayerId, Vec<Dispatch>), Rejection> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Rejection::Join(JoinError::EmptyName));
        } else if self.seats.len() >= Self::SEATS {
            return Err(Rejection::Join(JoinError::GameFull));
        } else if self.seats.iter().any(|s| s.name == name) {
            return Err(Rejection::Join(JoinError::NameTaken(name.to_string())));
        }

        let id = PlayerId::random();
        self.seats.push(Seat {
            id: id.clone(),
            name: name.to_string(),
        });

        info!(%id, name, "player joined");

        let mut dispatches = vec![
            Dispatch::to(id.clone(), Event::JoinSuccess { player_id: id.clone() }),
            Dispatch::everyone(Event::info(format!("{name} joined"))),
        ];

        if let [first, second] = &self.seats[..] {
            let max = self.config.max_disagreements.get();
            let state = GameState::new(first.id.clone(), second.id.clone(), max);
            info!(first = %first.name, second = %second.name, "match started");
            dispatches.push(Dispatch::everyone(Event::info(format!(
                "the match begins, {} moves first",
                first.name
            ))));

            dispatches.push(Dispatch::everyone(Event::State(state.clone())));
            self.state = Some(state);
        }

        Ok((id, dispatches))
    }

    /// Validates and applies an intent on behalf of `player`.
    ///
    /// The instant `now` is used to schedule the expiry of new proposals.
    #[instrument(level = "debug", skip(self, intent, now), fields(intent = intent.name()), err)]
    pub fn submit(
        &mut self,
        player: &PlayerId,
        intent: Intent,
        now: Instant,
    ) -> Result<Vec<Dispatch>, Rejection> {
        let name = self.name_of(player).unwrap_or_default().to_string();
        let state = match (&intent, self.state.as_mut()) {
            (Intent::Join { .. }, _) => return Err(Rejection::Join(JoinError::AlreadyJoined)),
            (_, None) => return Err(Rejection::NotStarted),
            (_, Some(state)) => state,
        };

        match intent {
            Intent::Join { .. } => Err(Rejection::Join(JoinError::AlreadyJoined)),

            Intent::Move { from, to } => {
                if self.phase.is_ended() {
                    return Err(Rejection::GameOver);
                } else if self.config.during_vote == VotePolicy::Reject
                    && self.phase.pending().is_some()
                {
                    return Err(Rejection::VotePending);
                }

                let outcome = state.apply_move(player, from, to).map_err(Rejection::Move)?;
                let mut dispatches = vec![Dispatch::everyone(Event::State(state.clone()))];

                if let Some(outcome) = outcome {
                    dispatches.extend(self.end(outcome));
                }

                Ok(dispatches)
            }

            Intent::Spawn { piece_type, x, y } => {
                if self.phase.is_ended() {
                    return Err(Rejection::GameOver);
                } else if self.config.during_vote == VotePolicy::Reject
                    && self.phase.pending().is_some()
                {
                    return Err(Rejection::VotePending);
                } else if self.config.spawn == SpawnPolicy::OwnTurn
                    && state.is_player(player)
                    && state.current_turn() != player
                {
                    return Err(Rejection::OutOfTurn(state.current_turn().clone()));
                }

                let at = Coord::new(x, y).map_err(Rejection::OutOfBounds)?;
                state
                    .apply_spawn(player, &piece_type, at)
                    .map_err(Rejection::Spawn)?;

                Ok(vec![
                    Dispatch::everyone(Event::info(format!(
                        "{name} spawned a {piece_type} on {at}"
                    ))),
                    Dispatch::everyone(Event::State(state.clone())),
                ])
            }

            Intent::ProposeRule { rule } => {
                let deadline = self.config.proposal_timeout.and_then(|t| now.checked_add(t));
                let proposal = self
                    .phase
                    .propose(state, player, rule, deadline)
                    .map_err(Rejection::Propose)?;

                Ok(vec![
                    Dispatch::except(
                        player.clone(),
                        Event::VoteRequested {
                            proposer_id: proposal.proposer,
                            proposer_name: name.clone(),
                            rule: proposal.rule.clone(),
                        },
                    ),
                    Dispatch::everyone(Event::info(format!(
                        "{name} proposed the piece type {}",
                        proposal.rule
                    ))),
                ])
            }

            Intent::Vote { accept } => {
                let resolution = self
                    .phase
                    .vote(state, player, accept)
                    .map_err(Rejection::Vote)?;

                let verb = if accept { "accepted" } else { "rejected" };
                let mut dispatches = vec![Dispatch::everyone(Event::info(format!(
                    "{name} {verb} the proposal"
                )))];

                dispatches.extend(self.resolve(resolution));
                Ok(dispatches)
            }

            Intent::Withdraw => {
                let proposal = self.phase.withdraw(player).map_err(Rejection::Withdraw)?;
                Ok(vec![Dispatch::everyone(Event::info(format!(
                    "{name} withdrew the piece type {}",
                    proposal.rule
                )))])
            }
        }
    }

    /// Rejects the pending proposal if it lapsed by `now`.
    #[instrument(level = "debug", skip(self))]
    pub fn expire(&mut self, now: Instant) -> Vec<Dispatch> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };

        match self.phase.expire(state, now) {
            None => Vec::new(),
            Some(resolution) => self.resolve(resolution),
        }
    }

    fn resolve(&mut self, resolution: Resolution) -> Vec<Dispatch> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };

        match resolution {
            Resolution::Undecided => Vec::new(),

            Resolution::Committed(rule) => vec![
                Dispatch::everyone(Event::info(format!("the piece type {rule} was adopted"))),
                Dispatch::everyone(Event::State(state.clone())),
            ],

            Resolution::Rejected {
                rule,
                reason,
                outcome,
            } => {
                let mut dispatches = vec![
                    Dispatch::everyone(Event::VoteRejected {
                        rule,
                        reason,
                        disagreement_count: state.disagreement_count(),
                    }),
                    Dispatch::everyone(Event::State(state.clone())),
                ];

                if let Some(outcome) = outcome {
                    dispatches.extend(self.end(outcome));
                }

                dispatches
            }
        }
    }

    fn end(&mut self, outcome: Outcome) -> Vec<Dispatch> {
        info!(%outcome, "match ended");
        self.phase.end(outcome.clone());

        let text = match outcome.winner().and_then(|w| self.name_of(w)) {
            Some(winner) => format!("{winner} wins, {outcome}"),
            None => format!("draw, {outcome}"),
        };

        debug!(%text, "announcing outcome");

        vec![
            Dispatch::everyone(Event::info(text)),
            Dispatch::everyone(Event::GameEnded(outcome)),
        ]
    }
}
