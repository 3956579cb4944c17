//! Decision-plan throughput on the ring race.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rust_tabletop::games::ring::{Ring, RingGame};
use rust_tabletop::{EngineConfig, GameRng, GameState};

/// A mid-game state reached by seeded random play.
fn midgame(ring: &Ring) -> GameState {
    let mut chooser = GameRng::new(17);
    let mut state = ring.initial.clone();
    for _ in 0..40 {
        let moves = ring.engine.legal_moves(&state);
        let Some(event) = chooser.choose(&moves).cloned() else {
            break;
        };
        match ring.engine.handle(&state, &event) {
            Ok(next) => state = next,
            Err(_) => break,
        }
    }
    state
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for (label, config) in [
        ("fast", EngineConfig::default().with_stats(false)),
        ("exhaustive", EngineConfig::exhaustive().with_stats(false)),
    ] {
        let ring = RingGame::new(4, 48)
            .with_runners(3)
            .with_seed(5)
            .with_config(config)
            .build()
            .expect("ring builds");
        let state = midgame(&ring);
        group.bench_with_input(BenchmarkId::from_parameter(label), &state, |b, state| {
            b.iter(|| ring.engine.legal_moves(black_box(state)))
        });
    }
    group.finish();
}

fn bench_state_hash(c: &mut Criterion) {
    let ring = RingGame::new(4, 48).with_runners(3).with_seed(5).build().expect("ring builds");
    let state = midgame(&ring);
    c.bench_function("state_hash_uncached", |b| {
        // a fresh snapshot each time so the cached hash isn't reused
        b.iter(|| black_box(state.advance(std::iter::empty::<rust_tabletop::Delta>())).hash())
    });
}

criterion_group!(benches, bench_legal_moves, bench_state_hash);
criterion_main!(benches);
