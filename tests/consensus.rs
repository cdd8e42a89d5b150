use lib::arbiter::{Arbiter, Config, Dispatch};
use lib::chess::{Coord, Outcome, Piece, PlayerId};
use lib::consensus::RejectReason;
use lib::protocol::{Event, Intent};
use lib::rules::{Capability, PieceRule};
use std::{num::NonZeroU32, time::Instant};
use test_strategy::proptest;

fn archer() -> PieceRule {
    PieceRule::new("Archer", "a", [Capability::leap([(0, 3)])])
}

fn seat_two(config: Config) -> (Arbiter, PlayerId, PlayerId) {
    let mut arbiter = Arbiter::new(config);
    let (first, _) = arbiter.join("first").unwrap();
    let (second, _) = arbiter.join("second").unwrap();
    (arbiter, first, second)
}

fn seen_by(dispatches: &[Dispatch], player: &PlayerId) -> Vec<Event> {
    dispatches
        .iter()
        .filter(|d| d.audience.includes(player))
        .map(|d| d.event.clone())
        .collect()
}

#[test]
fn rejected_rule_is_not_adopted_and_accepted_rule_can_be_spawned() {
    let (mut arbiter, first, second) = seat_two(Config::default());
    let now = Instant::now();

    let propose = Intent::ProposeRule { rule: archer() };
    let dispatches = arbiter.submit(&first, propose.clone(), now).unwrap();
    assert!(seen_by(&dispatches, &second)
        .iter()
        .any(|e| matches!(e, Event::VoteRequested { .. })));

    let dispatches = arbiter
        .submit(&second, Intent::Vote { accept: false }, now)
        .unwrap();

    let state = arbiter.state().unwrap();
    assert_eq!(state.disagreement_count(), 1);
    assert!(!state.rules().contains("Archer"));
    assert!(seen_by(&dispatches, &first).contains(&Event::VoteRejected {
        rule: archer(),
        reason: RejectReason::Votes,
        disagreement_count: 1,
    }));

    arbiter.submit(&first, propose, now).unwrap();
    arbiter
        .submit(&second, Intent::Vote { accept: true }, now)
        .unwrap();

    let state = arbiter.state().unwrap();
    assert_eq!(state.disagreement_count(), 1);
    assert_eq!(state.rules().get("Archer"), Ok(&archer()));

    let spawn = Intent::Spawn {
        piece_type: "Archer".into(),
        x: 3,
        y: 4,
    };

    arbiter.submit(&first, spawn, now).unwrap();
    let at = Coord::new(3, 4).unwrap();
    assert_eq!(
        arbiter.state().unwrap().board()[at],
        Some(Piece::new("Archer".into(), first.clone()))
    );
}

#[test]
fn adopted_rule_drives_movement() {
    let (mut arbiter, first, second) = seat_two(Config::default());
    let now = Instant::now();

    arbiter
        .submit(&first, Intent::ProposeRule { rule: archer() }, now)
        .unwrap();

    arbiter
        .submit(&second, Intent::Vote { accept: true }, now)
        .unwrap();

    let spawn = Intent::Spawn {
        piece_type: "Archer".into(),
        x: 3,
        y: 2,
    };

    arbiter.submit(&first, spawn, now).unwrap();

    let leap = Intent::Move {
        from: Coord::new(3, 2).unwrap(),
        to: Coord::new(3, 5).unwrap(),
    };

    arbiter.submit(&first, leap, now).unwrap();
    assert_eq!(arbiter.state().unwrap().current_turn(), &second);
}

#[proptest]
fn repeated_disagreement_ends_the_match(#[strategy(1u32..6)] max: u32) {
    let config = Config {
        max_disagreements: NonZeroU32::new(max).unwrap(),
        ..Config::default()
    };

    let (mut arbiter, first, second) = seat_two(config);
    let now = Instant::now();

    for n in 1..=max {
        arbiter.submit(&first, Intent::ProposeRule { rule: archer() }, now)?;
        let dispatches = arbiter.submit(&second, Intent::Vote { accept: false }, now)?;

        let ended = seen_by(&dispatches, &first).contains(&Event::GameEnded(Outcome::Doomsday));
        assert_eq!(ended, n == max);
        assert_eq!(arbiter.state().unwrap().disagreement_count(), n);
    }

    assert!(arbiter.phase().is_ended());
    assert!(arbiter
        .submit(&first, Intent::ProposeRule { rule: archer() }, now)
        .is_err());
}
