//! Benchmarks for the hot paths: market movement, candidate generation,
//! and processing actions with their move sets.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rust_18xx::core::Action;
use rust_18xx::games::sample;
use rust_18xx::market::{Cell, StockMarket};
use rust_18xx::GameSession;

fn bench_market_moves(c: &mut Criterion) {
    let market = StockMarket::from_config(&sample::config().market).unwrap();
    let from = Cell::new(2, 6);

    c.bench_function("market_moves", |b| {
        b.iter(|| {
            let a = market.right_or_up(black_box(from));
            let b2 = market.left_or_down(black_box(from));
            let d = market.down(black_box(from), black_box(3));
            black_box((a, b2, d))
        });
    });
}

fn bench_possible_actions(c: &mut Criterion) {
    let session = GameSession::new(sample::config(), &["A", "B", "C", "D"], 42).unwrap();

    c.bench_function("possible_actions_start_round", |b| {
        b.iter(|| black_box(session.possible_actions()));
    });
}

fn bench_start_round(c: &mut Criterion) {
    let config = sample::config();
    let names = ["SV", "CS", "DH", "MH", "CA", "BO"];

    c.bench_function("start_round_with_undo", |b| {
        b.iter(|| {
            let mut session = GameSession::new(config.clone(), &["A", "B", "C", "D"], 42).unwrap();
            for name in names {
                let company = session.state().config.company_id(name).unwrap();
                session.process(Action::BuyStartItem { company });
            }
            while session.undo() {}
            black_box(session.history().len())
        });
    });
}

criterion_group!(benches, bench_market_moves, bench_possible_actions, bench_start_round);
criterion_main!(benches);
