//! Engine behavior on a small line board.
//!
//! Five tiles `a`..`e` joined east/west. White has a rook on `a` and a pawn
//! on `c` that only moves east; black has a rook on `e`.

use std::sync::Arc;

use rust_tabletop::condition::builtin::{
    DestinationNotOwn, EventIs, FollowsPattern, IsActivePlayer, PathUnobstructed, PieceAtOrigin,
    PieceOwnedByPlayer,
};
use rust_tabletop::mutator::builtin::{EndGame, MovePiece, PassTurn, RemoveOccupant};
use rust_tabletop::plan::Decision;
use rust_tabletop::{
    ArtifactId, ArtifactKind, ConditionExpr, Engine, EngineConfig, EngineError, Event, EventKind,
    GameState, MutatorChain, Pattern, Phase, PhaseId, RejectionReason, Rule, StateKind,
};

const RESIGN: EventKind = EventKind::FIRST_CUSTOM;
const STEP: EventKind = EventKind::new(EventKind::FIRST_CUSTOM.raw() + 1);

struct Line {
    engine: Engine,
    state: GameState,
    tiles: [ArtifactId; 5],
    white: ArtifactId,
    black: ArtifactId,
    rook: ArtifactId,
    pawn: ArtifactId,
    enemy: ArtifactId,
}

/// "step" expands to a one-tile move east.
fn expand_step(engine: &Engine, state: &GameState, event: &Event) -> Vec<Event> {
    if event.kind() != STEP {
        return vec![event.clone()];
    }
    let (Some(player), Some(piece)) = (event.player(), event.artifacts().get(1).copied()) else {
        return Vec::new();
    };
    let Some(from) = state.tile_of(piece) else {
        return Vec::new();
    };
    let east = engine.artifacts().find(ArtifactKind::Direction, "east");
    east.and_then(|east| engine.topology().step(from, east))
        .map(|relation| vec![Event::piece_move(player, piece, from, relation.to)])
        .unwrap_or_default()
}

fn move_condition(check_origin: bool) -> ConditionExpr {
    let mut parts = vec![
        ConditionExpr::condition(IsActivePlayer),
        ConditionExpr::condition(PieceOwnedByPlayer),
    ];
    if check_origin {
        parts.push(ConditionExpr::condition(PieceAtOrigin));
    }
    parts.extend([
        ConditionExpr::condition(FollowsPattern),
        ConditionExpr::condition(PathUnobstructed),
        ConditionExpr::condition(DestinationNotOwn),
    ]);
    ConditionExpr::all(parts)
}

fn line_with(config: EngineConfig, check_origin: bool) -> Line {
    let mut builder = Engine::builder().with_config(config);
    let board = builder.add_artifact(ArtifactKind::Other, "board", None);
    let east = builder.add_direction("east");
    let west = builder.add_direction("west");
    let tiles = ["a", "b", "c", "d", "e"].map(|name| builder.add_tile(name));
    for pair in tiles.windows(2) {
        builder.relate_pair(pair[0], pair[1], east, west, 1);
    }

    let white = builder.add_player("white");
    let black = builder.add_player("black");
    let rook = builder.add_piece("white rook", white, Some(tiles[0]));
    let pawn = builder.add_piece("white pawn", white, Some(tiles[2]));
    let enemy = builder.add_piece("black rook", black, Some(tiles[4]));
    for piece in [rook, enemy] {
        builder.add_pattern(piece, Pattern::Repeat(east));
        builder.add_pattern(piece, Pattern::Repeat(west));
    }
    builder.add_pattern(pawn, Pattern::any_of([east]));

    builder.add_phase(
        Phase::new(PhaseId(0), "play")
            .with_preprocessor(expand_step)
            .with_rule(
                Rule::new(
                    "move",
                    move_condition(check_origin),
                    MutatorChain::new()
                        .then(RemoveOccupant::off_board())
                        .then(MovePiece)
                        .then(PassTurn),
                )
                .with_event_kind(EventKind::MOVE),
            )
            .with_rule(
                Rule::when("pass", IsActivePlayer, PassTurn).with_event_kind(EventKind::PASS),
            )
            .with_rule(
                Rule::new(
                    "resign",
                    ConditionExpr::condition(EventIs(RESIGN))
                        .and(ConditionExpr::condition(IsActivePlayer)),
                    EndGame::draw(board),
                )
                .with_event_kind(RESIGN),
            ),
    );

    let (engine, state) = builder.build().expect("line board builds");
    Line {
        engine,
        state,
        tiles,
        white,
        black,
        rook,
        pawn,
        enemy,
    }
}

fn line() -> Line {
    line_with(EngineConfig::default(), true)
}

fn reason(line: &Line, event: &Event) -> Option<RejectionReason> {
    line.engine.validate(event, &line.state).reason
}

#[test]
fn test_legal_move_applies() {
    let g = line();
    let event = Event::piece_move(g.white, g.rook, g.tiles[0], g.tiles[1]);
    assert!(g.engine.validate(&event, &g.state).legal);

    let next = g.engine.handle(&g.state, &event).unwrap();
    assert_eq!(next.tile_of(g.rook), Some(g.tiles[1]));
    assert_eq!(next.active_player(), Some(g.black));
}

#[test]
fn test_structured_rejections() {
    let g = line();
    let [a, b, c, d, e] = g.tiles;

    let blocked = g.engine.validate(&Event::piece_move(g.white, g.rook, a, d), &g.state);
    assert_eq!(blocked.reason, Some(RejectionReason::PathObstructed));
    assert!(blocked.explanation.contains("path obstructed at c"), "{}", blocked.explanation);

    assert_eq!(
        reason(&g, &Event::piece_move(g.white, g.rook, a, c)),
        Some(RejectionReason::DestinationOccupied)
    );
    assert_eq!(
        reason(&g, &Event::piece_move(g.white, g.enemy, e, d)),
        Some(RejectionReason::NotOwner)
    );
    assert_eq!(
        reason(&g, &Event::piece_move(g.black, g.enemy, e, d)),
        Some(RejectionReason::NotOwner)
    );
    assert_eq!(
        reason(&g, &Event::piece_move(g.white, g.pawn, c, b)),
        Some(RejectionReason::InvalidPattern)
    );
    assert_eq!(
        reason(&g, &Event::piece_move(g.white, g.rook, b, c)),
        Some(RejectionReason::RuleViolation)
    );
    assert_eq!(reason(&g, &Event::roll(g.white)), Some(RejectionReason::WrongPhase));
}

#[test]
fn test_capture_removes_occupant() {
    let g = line();
    let [_, _, c, d, _] = g.tiles;
    let state = g.state.with_state(rust_tabletop::ArtifactState::on_tile(g.enemy, d));

    let next = g
        .engine
        .handle(&state, &Event::piece_move(g.white, g.pawn, c, d))
        .unwrap();
    assert_eq!(next.tile_of(g.pawn), Some(d));
    assert_eq!(next.tile_of(g.enemy), None);
    assert_eq!(next.pieces_on(d).collect::<Vec<_>>(), vec![g.pawn]);
}

#[test]
fn test_handle_rejection_is_typed() {
    let g = line();
    let [a, _, _, d, _] = g.tiles;
    match g.engine.handle(&g.state, &Event::piece_move(g.white, g.rook, a, d)) {
        Err(EngineError::Rejected { response, .. }) => {
            assert_eq!(response.rejection_reason(), RejectionReason::PathObstructed);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn test_unhandled_event_keeps_state() {
    let g = line();
    let next = g.engine.handle(&g.state, &Event::roll(g.white)).unwrap();
    assert_eq!(next, g.state);
    assert_eq!(next.hash(), g.state.hash());
}

#[test]
fn test_mutator_invariant_is_fatal() {
    let g = line_with(EngineConfig::default(), false);
    let [a, b, ..] = g.tiles;

    // the rook is on a, not b; without an origin check the rule accepts
    let event = Event::piece_move(g.white, g.rook, b, a);
    let error = g.engine.handle(&g.state, &event).unwrap_err();
    assert!(matches!(error, EngineError::Invariant(_)));
    assert!(!error.is_rejection());
}

#[test]
fn test_states_are_immutable_and_shared() {
    let g = line();
    let [a, b, ..] = g.tiles;
    let before = g.state.clone();

    let next = g
        .engine
        .handle(&g.state, &Event::piece_move(g.white, g.rook, a, b))
        .unwrap();

    assert_eq!(g.state, before);
    assert_eq!(g.state.tile_of(g.rook), Some(a));
    assert_eq!(next.tile_of(g.rook), Some(b));

    let shared = |s: &GameState| s.shared_state_of(g.enemy, StateKind::OnTile).cloned().unwrap();
    assert!(Arc::ptr_eq(&shared(&g.state), &shared(&next)));
    assert_ne!(
        g.state.state_of(g.rook, StateKind::OnTile),
        next.state_of(g.rook, StateKind::OnTile)
    );
}

#[test]
fn test_resign_ends_game() {
    let g = line();
    let over = g
        .engine
        .handle(&g.state, &Event::custom(RESIGN, Some(g.white)))
        .unwrap();
    assert!(over.is_ended());
    assert_eq!(over.winner(), None);

    assert!(g.engine.legal_moves(&over).is_empty());
    let resign = Event::custom(RESIGN, Some(g.white));
    for event in [Event::pass(g.white), Event::roll(g.black), resign] {
        let validation = g.engine.validate(&event, &over);
        assert!(!validation.legal);
        assert_eq!(validation.reason, Some(RejectionReason::GameEnded));
    }
    assert!(matches!(
        g.engine.handle(&over, &Event::pass(g.white)),
        Err(EngineError::GameEnded)
    ));
}

#[test]
fn test_preprocessor_expands_step() {
    let g = line();
    let step = Event::custom(STEP, Some(g.white)).with_artifact(g.rook);

    match g.engine.decide(&g.state, &step) {
        Decision::Accepted { event, .. } => {
            assert_eq!(event, Event::piece_move(g.white, g.rook, g.tiles[0], g.tiles[1]));
        }
        other => panic!("expected acceptance, got {other:?}"),
    }

    let next = g.engine.handle(&g.state, &step).unwrap();
    assert_eq!(next.tile_of(g.rook), Some(g.tiles[1]));
}

fn every_event(g: &Line) -> Vec<Event> {
    let mut events = Vec::new();
    for player in [g.white, g.black] {
        for piece in [g.rook, g.pawn, g.enemy] {
            for &from in &g.tiles {
                for &to in &g.tiles {
                    events.push(Event::piece_move(player, piece, from, to));
                }
            }
            events.push(Event::custom(STEP, Some(player)).with_artifact(piece));
        }
        events.push(Event::pass(player));
        events.push(Event::roll(player));
        events.push(Event::custom(RESIGN, Some(player)));
    }
    events
}

#[test]
fn test_fast_paths_are_transparent() {
    let fast = line();
    let slow = line_with(EngineConfig::exhaustive(), true);

    for event in every_event(&fast) {
        assert_eq!(
            fast.engine.validate(&event, &fast.state),
            slow.engine.validate(&event, &slow.state),
            "{event}"
        );
    }
    assert!(fast.engine.stats().kind_filter_skips > 0);
    assert_eq!(slow.engine.stats().kind_filter_skips, 0);
    assert!(fast.engine.stats().condition_evaluations < slow.engine.stats().condition_evaluations);
}

#[test]
fn test_validate_is_deterministic() {
    let g = line();
    for event in every_event(&g) {
        assert_eq!(g.engine.validate(&event, &g.state), g.engine.validate(&event, &g.state));
    }
}

#[test]
fn test_stats_reset() {
    let g = line();
    let _ = g.engine.validate(&Event::pass(g.white), &g.state);
    let stats = g.engine.stats();
    assert_eq!(stats.decisions, 1);
    assert_eq!(stats.accepted, 1);

    g.engine.reset_stats();
    assert_eq!(g.engine.stats().decisions, 0);

    let quiet = line_with(EngineConfig::default().with_stats(false), true);
    let _ = quiet.engine.validate(&Event::pass(quiet.white), &quiet.state);
    assert_eq!(quiet.engine.stats().decisions, 0);
}
