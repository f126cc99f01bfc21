//! Full-game flow tests.
//!
//! These drive a `GameSession` through the public API only: the start
//! round, a first stock round that floats a company, and an operating
//! round with a tile lay and a train purchase.

use rust_18xx::core::{Action, CompanyId, PlayerId, PortfolioId, ShareSource};
use rust_18xx::game::replay;
use rust_18xx::games::sample;
use rust_18xx::rounds::{ActiveRound, OperatingStep};
use rust_18xx::GameSession;

const NAMES: [&str; 4] = ["Ann", "Bob", "Cy", "Di"];

fn company(s: &GameSession, name: &str) -> CompanyId {
    s.state().config.company_id(name).unwrap()
}

fn act(s: &mut GameSession, action: Action) {
    let shown = format!("{action:?}");
    assert!(s.process(action), "{shown} rejected: {:?}", s.last_error());
}

/// Buy every start item, cheapest first.
fn finish_start_round(s: &mut GameSession) {
    for name in ["SV", "CS", "DH", "MH", "CA", "BO"] {
        let company = company(s, name);
        act(s, Action::BuyStartItem { company });
    }
}

/// Float PRR in the first stock round and let everybody pass.
fn float_prr(s: &mut GameSession) {
    let prr = company(s, "PRR");
    act(s, Action::StartCompany { company: prr, price: 100 }); // Cy
    act(s, Action::Done);
    for _ in 0..3 {
        act(s, Action::BuyCertificate { company: prr, from: ShareSource::Ipo }); // Di, Ann, Bob
        act(s, Action::Done);
    }
    for _ in 0..4 {
        act(s, Action::Done);
    }
}

// =============================================================================
// Start Round
// =============================================================================

#[test]
fn test_start_round_hands_out_bonuses() {
    let mut s = GameSession::new(sample::config(), &NAMES, 1).unwrap();
    finish_start_round(&mut s);

    let state = s.state();
    let prr = company(&s, "PRR");
    let bo = company(&s, "B&O");
    // Ann bought SV and CA; CA carries a PRR share.
    assert_eq!(state.percent(PortfolioId::Player(PlayerId::new(0)), prr), 10);
    assert_eq!(state.players[PlayerId::new(0)].cash, 600 - 20 - 160);
    // Bob bought CS and BO; BO carries the B&O presidency.
    assert_eq!(state.president(bo), Some(PlayerId::new(1)));
    assert_eq!(state.par_price(bo), Some(100));
    assert!(s.report().contains("Start round ends"));
}

#[test]
fn test_start_round_leads_to_first_stock_round() {
    let mut s = GameSession::new(sample::config(), &NAMES, 1).unwrap();
    finish_start_round(&mut s);

    assert!(matches!(s.state().round, ActiveRound::Stock(_)));
    assert_eq!(s.current_player(), PlayerId::new(2));
    assert!(s.report().contains("Stock round 1 begins"));
    assert!(s.possible_actions().contains(&Action::Done));
}

#[test]
fn test_no_sales_in_first_stock_round() {
    let mut s = GameSession::new(sample::config(), &NAMES, 1).unwrap();
    finish_start_round(&mut s);
    let prr = company(&s, "PRR");
    act(&mut s, Action::StartCompany { company: prr, price: 100 });

    assert!(!s.process(Action::SellShares { company: prr, shares: 1 }));
    assert_eq!(s.last_error(), Some("no shares may be sold in the first stock round"));
}

// =============================================================================
// Stock Round
// =============================================================================

#[test]
fn test_flotation_after_sixty_percent() {
    let mut s = GameSession::new(sample::config(), &NAMES, 1).unwrap();
    finish_start_round(&mut s);
    let prr = company(&s, "PRR");
    let bank = s.state().bank.cash;

    act(&mut s, Action::StartCompany { company: prr, price: 100 });
    act(&mut s, Action::Done);
    act(&mut s, Action::BuyCertificate { company: prr, from: ShareSource::Ipo });
    act(&mut s, Action::Done);
    act(&mut s, Action::BuyCertificate { company: prr, from: ShareSource::Ipo });
    act(&mut s, Action::Done);
    // 20 + 10 bonus + 10 + 10: not yet.
    assert!(!s.state().company(prr).status().floated);

    act(&mut s, Action::BuyCertificate { company: prr, from: ShareSource::Ipo });
    let state = s.state();
    assert!(state.company(prr).status().floated);
    assert_eq!(state.public(prr).cash, 1000);
    // 500 in share sales less 1000 of capital.
    assert_eq!(state.bank.cash, bank + 500 - 1000);
    assert!(s.report().contains("PRR floats and receives 1000"));
    assert!(s.report().contains("PRR places its home token on H12"));
    assert_eq!(state.total_cash(), state.config.bank_cash);
}

#[test]
fn test_priority_follows_last_actor() {
    let mut s = GameSession::new(sample::config(), &NAMES, 1).unwrap();
    finish_start_round(&mut s);
    float_prr(&mut s);

    // Bob bought last, so Cy holds priority.
    assert_eq!(s.state().manager.priority, PlayerId::new(2));
    assert!(matches!(s.state().round, ActiveRound::Operating(_)));
}

// =============================================================================
// Operating Round
// =============================================================================

#[test]
fn test_operating_round_flow() {
    let mut s = GameSession::new(sample::config(), &NAMES, 1).unwrap();
    finish_start_round(&mut s);
    float_prr(&mut s);
    let prr = company(&s, "PRR");
    let dh = company(&s, "DH");
    let hex = s.state().config.hex_id("E5").unwrap();
    let tile = s.state().config.tile_id("7").unwrap();

    assert!(s.report().contains("Operating round 1.1 begins"));
    // Cy presides PRR; DH paid its revenue to Cy.
    assert_eq!(s.current_player(), PlayerId::new(2));
    assert_eq!(s.state().private_owner(dh), PortfolioId::Player(PlayerId::new(2)));
    assert_eq!(s.state().players[PlayerId::new(2)].cash, 600 - 70 - 200 + 15);
    assert!(!s.can_undo());

    act(&mut s, Action::LayTile { hex, tile, rotation: 2, special: None });
    assert_eq!(s.state().public(prr).cash, 920);
    act(&mut s, Action::Skip);
    assert!(s.report().contains("PRR owns no trains and earns nothing"));
    // Withholding nothing still moves the price left.
    assert_eq!(s.state().price(prr), Some(90));

    let ActiveRound::Operating(round) = &s.state().round else {
        panic!("expected an operating round");
    };
    assert_eq!(round.step(), OperatingStep::BuyTrain);

    let train = s.state().next_new_train().unwrap();
    act(&mut s, Action::BuyTrain { train, price: 80, president_cash: 0 });
    act(&mut s, Action::Done);

    let state = s.state();
    assert_eq!(state.trains_of(prr), &[train]);
    assert_eq!(state.public(prr).cash, 840);
    assert!(matches!(state.round, ActiveRound::Stock(_)));
    assert_eq!(state.manager.stock_round, 2);
    assert!(s.report().contains("Stock round 2 begins"));
    assert_eq!(state.total_cash(), state.config.bank_cash);
}

#[test]
fn test_undo_inside_operating_turn() {
    let mut s = GameSession::new(sample::config(), &NAMES, 1).unwrap();
    finish_start_round(&mut s);
    float_prr(&mut s);
    let prr = company(&s, "PRR");
    let hex = s.state().config.hex_id("E5").unwrap();
    let tile = s.state().config.tile_id("7").unwrap();
    let before = s.state().clone();

    act(&mut s, Action::LayTile { hex, tile, rotation: 0, special: None });
    assert_eq!(s.state().map.hex(hex).tile, Some(tile));

    assert!(s.undo());
    assert_eq!(s.state(), &before);
    assert_eq!(s.state().public(prr).cash, 1000);
    assert!(!s.undo());

    assert!(s.redo());
    assert_eq!(s.state().map.hex(hex).tile, Some(tile));
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn test_saved_game_replays_to_same_state() {
    let mut config = sample::config();
    config.randomize_seating = true;
    let mut s = GameSession::new(config.clone(), &NAMES, 77).unwrap();
    finish_start_round(&mut s);
    float_prr(&mut s);

    let bytes = s.save().unwrap();
    let (seed, records) = replay::decode(&bytes).unwrap();
    assert_eq!(seed, 77);
    assert_eq!(records.len(), s.history().len());

    let replayed = GameSession::replay(config, &NAMES, seed, &records).unwrap();
    assert_eq!(replayed.state(), s.state());
}
