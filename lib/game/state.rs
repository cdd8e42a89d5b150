use crate::chess::{Board, Coord, Outcome, Piece, PlayerId};
use crate::game::standard_setup;
use crate::rules::{check_move, DuplicateRule, IllegalMove, PieceRule, Registry, UnknownPieceType};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// The reason why a move was refused.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum MoveError {
    #[display(fmt = "{_0} is not playing this match")]
    NotAPlayer(#[error(not(source))] PlayerId),

    #[display(fmt = "it is {_0}'s turn")]
    NotYourTurn(#[error(not(source))] PlayerId),

    #[display(fmt = "{_0}")]
    Illegal(IllegalMove),
}

/// The reason why a spawn was refused.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum SpawnError {
    #[display(fmt = "{_0} is not playing this match")]
    NotAPlayer(#[error(not(source))] PlayerId),

    #[display(fmt = "{_0}")]
    UnknownPieceType(UnknownPieceType),

    #[display(fmt = "{_0} is occupied")]
    Occupied(#[error(not(source))] Coord),
}

/// The state of a match, broadcast to every player after each change.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct GameState {
    board: Board,
    current_turn: PlayerId,
    players: (PlayerId, PlayerId),
    rules: Registry,
    disagreement_count: u32,
    max_disagreements: u32,
}

impl GameState {
    /// A match in the standard opening arrangement, the first player moves first.
    pub fn new(first: PlayerId, second: PlayerId, max_disagreements: u32) -> Self {
        let board = standard_setup(&first, &second);
        Self::with_board(first, second, board, max_disagreements)
    }

    /// A match on an arbitrary board with the standard piece types.
    pub fn with_board(
        first: PlayerId,
        second: PlayerId,
        board: Board,
        max_disagreements: u32,
    ) -> Self {
        GameState {
            board,
            current_turn: first.clone(),
            players: (first, second),
            rules: Registry::standard(),
            disagreement_count: 0,
            max_disagreements: max_disagreements.max(1),
        }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The player to move.
    pub fn current_turn(&self) -> &PlayerId {
        &self.current_turn
    }

    /// Both players in seating order.
    pub fn players(&self) -> [&PlayerId; 2] {
        [&self.players.0, &self.players.1]
    }

    /// The piece types in use.
    pub fn rules(&self) -> &Registry {
        &self.rules
    }

    /// How many rule proposals were rejected so far.
    pub fn disagreement_count(&self) -> u32 {
        self.disagreement_count
    }

    /// How many rejected proposals end the match.
    pub fn max_disagreements(&self) -> u32 {
        self.max_disagreements
    }

    /// Whether `player` is seated in this match.
    pub fn is_player(&self, player: &PlayerId) -> bool {
        self.players().contains(&player)
    }

    /// The other player, if `player` is seated in this match.
    pub fn opponent(&self, player: &PlayerId) -> Option<&PlayerId> {
        match self.players() {
            [a, b] if a == player => Some(b),
            [a, b] if b == player => Some(a),
            _ => None,
        }
    }

    /// The direction `player` moves forward, `1` towards increasing `y` and `-1` otherwise.
    pub fn forward(&self, player: &PlayerId) -> i8 {
        if player == &self.players.0 {
            1
        } else {
            -1
        }
    }

    /// How many royal pieces `player` still has on the board.
    pub fn royals_of(&self, player: &PlayerId) -> usize {
        self.board
            .pieces_of(player)
            .filter(|(_, p)| self.rules.is_royal(&p.piece_type))
            .count()
    }

    /// Moves the piece on `from` to `to`, capturing whatever stands on `to`.
    ///
    /// Returns the [`Outcome`] if the move leaves a side without royal pieces.
    #[instrument(level = "debug", skip(self), err)]
    pub fn apply_move(
        &mut self,
        player: &PlayerId,
        from: Coord,
        to: Coord,
    ) -> Result<Option<Outcome>, MoveError> {
        let opponent = self
            .opponent(player)
            .cloned()
            .ok_or_else(|| MoveError::NotAPlayer(player.clone()))?;

        if player != &self.current_turn {
            return Err(MoveError::NotYourTurn(self.current_turn.clone()));
        }

        let forward = self.forward(player);
        check_move(&self.board, from, to, &self.rules, player, forward)
            .map_err(MoveError::Illegal)?;

        let royals = (self.royals_of(player), self.royals_of(&opponent));

        let piece = self.board.take(from);
        if let Some(captured) = self.board.set(to, piece) {
            debug!(%captured, %to, "captured");
        }

        self.current_turn = opponent.clone();

        let outcome = if royals.1 > 0 && self.royals_of(&opponent) == 0 {
            Some(Outcome::RoyalElimination {
                winner: player.clone(),
            })
        } else if royals.0 > 0 && self.royals_of(player) == 0 {
            Some(Outcome::RoyalElimination { winner: opponent })
        } else {
            None
        };

        Ok(outcome)
    }

    /// Places a new piece of type `piece_type` owned by `player` on an empty cell.
    ///
    /// Spawning does not pass the turn.
    #[instrument(level = "debug", skip(self), err)]
    pub fn apply_spawn(
        &mut self,
        player: &PlayerId,
        piece_type: &str,
        at: Coord,
    ) -> Result<(), SpawnError> {
        if !self.is_player(player) {
            return Err(SpawnError::NotAPlayer(player.clone()));
        }

        let rule = self
            .rules
            .get(piece_type)
            .map_err(SpawnError::UnknownPieceType)?;

        if self.board.is_occupied(at) {
            return Err(SpawnError::Occupied(at));
        }

        let piece = Piece::new(rule.name.clone(), player.clone());
        self.board.set(at, Some(piece));
        Ok(())
    }

    /// Adds a piece type to the rules.
    pub fn adopt(&mut self, rule: PieceRule) -> Result<(), DuplicateRule> {
        self.rules.insert(rule)
    }

    /// Counts a rejected proposal, returning whether doomsday was reached.
    pub fn disagree(&mut self) -> bool {
        self.disagreement_count = (self.disagreement_count + 1).min(self.max_disagreements);
        self.disagreement_count == self.max_disagreements
    }
}
