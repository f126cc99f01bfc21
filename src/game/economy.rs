//! Ledger operations shared by several rounds.
//!
//! Each function takes an open `Transaction`, assumes its preconditions
//! were validated by the calling round, and records every change as moves.

use crate::core::{
    Capitalisation, CashHolder, CompanyId, DividendDestination, PlayerId, PortfolioId, TrainId,
};
use crate::ledger::Company;
use crate::market::{Cell, PriceMove};
use crate::moves::Transaction;

use super::phase;

/// Set the par price of a company and put its token on the grid.
pub fn start_company(tx: &mut Transaction, company: CompanyId, par: Cell) {
    tx.update_company(company, |s| {
        s.started = true;
        s.par = Some(par);
    });
    tx.move_price(company, Some(par));
    let price = tx.state().market.price(par);
    let name = tx.state().company(company).name().to_string();
    tx.report(format!("{name} is started at {price}"));
}

/// Percentage of a company that has left the IPO and the reserve.
fn sold_percent(tx: &Transaction, company: CompanyId) -> u32 {
    let state = tx.state();
    100 - state.percent(PortfolioId::Ipo, company) - state.percent(PortfolioId::Unavailable, company)
}

/// Float the company if enough shares have been sold.
pub fn check_flotation(tx: &mut Transaction, company: CompanyId) {
    let state = tx.state();
    let public = state.public(company);
    let status = &public.core.status;
    if !status.started || status.floated || status.closed {
        return;
    }
    if sold_percent(tx, company) < state.config.stock.float_percent {
        return;
    }

    let capital = if public.has_stock_price {
        match state.config.stock.capitalisation {
            Capitalisation::Full => state
                .par_price(company)
                .map_or(0, |par| par * state.config.stock.capital_multiple),
            Capitalisation::Incremental => 0,
        }
    } else {
        public.starting_treasury
    };
    let name = public.core.name.clone();
    let home = public.home;

    tx.update_company(company, |s| s.floated = true);
    tx.bank_pays(company, capital);
    tx.report(format!("{name} floats and receives {capital}"));

    if let Some(hex) = home {
        let state = tx.state();
        if state.map.free_slots(&state.config, hex) > 0 {
            tx.place_token(hex, company);
            tx.update_company(company, |s| s.tokens_laid += 1);
            let hex_name = tx.state().config.map.hexes[hex.index()].name.clone();
            tx.report(format!("{name} places its home token on {hex_name}"));
        }
    }
}

/// Hand the president's certificate from `from` to `to`, who returns the
/// same percentage in ordinary shares.
pub fn swap_presidency(tx: &mut Transaction, company: CompanyId, from: PlayerId, to: PlayerId) {
    let state = tx.state();
    let president_cert = state.public(company).president_certificate();
    let president_percent = state.certificate(president_cert).percent;

    let mut returned = Vec::new();
    let mut remaining = president_percent;
    for cert in state
        .certificates_of(PortfolioId::Player(to), company)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
    {
        if remaining == 0 {
            break;
        }
        if !cert.president && cert.percent <= remaining {
            remaining -= cert.percent;
            returned.push(cert.id);
        }
    }
    assert_eq!(remaining, 0, "{to} cannot cover the president's certificate");

    tx.move_certificate(president_cert, PortfolioId::Player(to));
    for cert in returned {
        tx.move_certificate(cert, PortfolioId::Player(from));
    }
    let state = tx.state();
    let line = format!(
        "{} becomes president of {}",
        state.players[to].name,
        state.company(company).name()
    );
    tx.report(line);
}

/// Transfer presidency to the largest holder if someone now holds more
/// than the president. Ties go to the first holder in seat order after the
/// current president.
pub fn check_presidency(tx: &mut Transaction, company: CompanyId) {
    let state = tx.state();
    let Some(president) = state.president(company) else {
        return;
    };
    let current = state.percent(PortfolioId::Player(president), company);

    let mut best: Option<(PlayerId, u32)> = None;
    for other in president.following(state.player_count()) {
        let percent = state.percent(PortfolioId::Player(other), company);
        if percent > current && best.map_or(true, |(_, b)| percent > b) {
            best = Some((other, percent));
        }
    }
    if let Some((successor, _)) = best {
        swap_presidency(tx, company, president, successor);
    }
}

/// Apply a price movement: close the company, move its token, and flag
/// the game end when the destination says so.
pub fn apply_price_move(tx: &mut Transaction, company: CompanyId, mv: PriceMove) {
    if mv.closes {
        close_company(tx, company);
        return;
    }
    if !mv.moved() {
        return;
    }
    tx.move_price(company, Some(mv.to));
    let state = tx.state();
    let line = format!(
        "{} moves from {} ({}) to {} ({})",
        state.company(company).name(),
        mv.from,
        state.market.price(mv.from),
        mv.to,
        state.market.price(mv.to)
    );
    tx.report(line);
    if mv.ends_game && !tx.state().manager.end_triggered {
        tx.update_manager(|m| m.end_triggered = true);
        tx.report("The stock market has reached its end: the game will end");
    }
}

/// Close a company. Public companies return their treasury to the Bank;
/// their certificates and trains go to the scrap heap and their tokens
/// leave the map and the market.
pub fn close_company(tx: &mut Transaction, company: CompanyId) {
    let state = tx.state();
    let name = state.company(company).name().to_string();
    match state.company(company) {
        Company::Private(private) => {
            let cert = private.certificate();
            tx.move_certificate(cert, PortfolioId::ScrapHeap);
        }
        Company::Public(public) => {
            let cash = public.cash;
            let certs = public.core.certificates.clone();
            let trains = state.trains_of(company).to_vec();
            let hexes: Vec<_> = state.map.tokens_of(company).collect();
            let owned_privates: Vec<_> = state
                .privates()
                .filter(|p| state.certs.owner(p.certificate()) == PortfolioId::Company(company))
                .map(|p| p.core.id)
                .collect();

            tx.pay_bank(company, cash);
            for train in trains {
                tx.move_train(train, PortfolioId::ScrapHeap);
            }
            for cert in certs {
                tx.move_certificate(cert, PortfolioId::ScrapHeap);
            }
            for hex in hexes {
                tx.remove_token(hex, company);
            }
            tx.move_price(company, None);
            for private in owned_privates {
                close_company(tx, private);
            }
        }
    }
    tx.update_company(company, |s| s.closed = true);
    tx.report(format!("{name} closes"));
}

/// Every open private pays its revenue to its holder.
pub fn pay_private_revenue(tx: &mut Transaction) {
    let payments: Vec<(CashHolder, i64, String)> = {
        let state = tx.state();
        state
            .privates()
            .filter(|p| !p.core.status.closed && p.revenue > 0)
            .filter_map(|p| {
                let holder = match state.certs.owner(p.certificate()) {
                    PortfolioId::Player(player) => CashHolder::Player(player),
                    PortfolioId::Company(company) => CashHolder::Company(company),
                    _ => return None,
                };
                Some((holder, p.revenue, p.core.name.clone()))
            })
            .collect()
    };
    for (holder, amount, name) in payments {
        tx.bank_pays(holder, amount);
        let line = format!("{name} pays {amount} to {}", tx.state().holder_name(holder));
        tx.report(line);
    }
}

/// Pay `per_unit` for every share unit of a company to its holders.
/// Returns the total paid.
pub fn pay_dividends(tx: &mut Transaction, company: CompanyId, per_unit: i64) -> i64 {
    let payments: Vec<(CashHolder, i64)> = {
        let state = tx.state();
        let unit = state.config.stock.share_unit;
        let rules = &state.config.stock;
        let mut payments: Vec<(CashHolder, i64)> = Vec::new();
        for &cert_id in &state.public(company).core.certificates {
            let cert = state.certificate(cert_id);
            let holder = match state.certs.owner(cert_id) {
                PortfolioId::Player(p) => Some(CashHolder::Player(p)),
                PortfolioId::Company(c) => Some(CashHolder::Company(c)),
                PortfolioId::Ipo => destination(rules.ipo_pays, company),
                PortfolioId::Pool => destination(rules.pool_pays, company),
                PortfolioId::Unavailable | PortfolioId::ScrapHeap => None,
            };
            if let Some(holder) = holder {
                let amount = per_unit * i64::from(cert.units(unit));
                match payments.iter_mut().find(|(h, _)| *h == holder) {
                    Some((_, total)) => *total += amount,
                    None => payments.push((holder, amount)),
                }
            }
        }
        payments
    };

    let mut total = 0;
    for (holder, amount) in payments {
        tx.bank_pays(holder, amount);
        total += amount;
    }
    total
}

fn destination(rule: DividendDestination, company: CompanyId) -> Option<CashHolder> {
    match rule {
        DividendDestination::Company => Some(CashHolder::Company(company)),
        DividendDestination::Bank => None,
    }
}

/// Buy a train for a company at `price`, paying its current holder.
/// Handles phase changes and rusting triggered by a first purchase.
pub fn buy_train(tx: &mut Transaction, company: CompanyId, train: TrainId, price: i64) {
    let state = tx.state();
    let seller = state.train_holdings.owner(train);
    let kind = state.train(train).kind;
    let first_of_kind = seller == PortfolioId::Ipo && state.untouched_train_type(kind);
    let train_name = state.train(train).name.clone();

    match seller {
        PortfolioId::Company(other) => tx.cash(company, other, price),
        _ => tx.pay_bank(company, price),
    }
    tx.move_train(train, PortfolioId::Company(company));

    let state = tx.state();
    let line = format!(
        "{} buys a {} train from {} for {}",
        state.company(company).name(),
        train_name,
        state.portfolio_name(seller),
        price
    );
    tx.report(line);

    if first_of_kind {
        phase::first_train_bought(tx, kind);
    }
}

/// Companies above the train limit discard their cheapest trains to the
/// Pool.
pub fn discard_excess_trains(tx: &mut Transaction) {
    let limit = tx.state().phase().train_limit as usize;
    let companies: Vec<CompanyId> = tx
        .state()
        .publics()
        .filter(|c| !c.core.status.closed)
        .map(|c| c.core.id)
        .collect();

    for company in companies {
        let state = tx.state();
        let mut trains = state.trains_of(company).to_vec();
        if trains.len() <= limit {
            continue;
        }
        trains.sort_by_key(|&t| (state.train(t).price, t));
        let excess: Vec<TrainId> = trains[..trains.len() - limit].to_vec();
        for train in excess {
            tx.move_train(train, PortfolioId::Pool);
            let state = tx.state();
            let line = format!(
                "{} discards a {} train",
                state.company(company).name(),
                state.train(train).name
            );
            tx.report(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameConfig, ReportLog};
    use crate::game::GameState;
    use crate::games::sample;
    use crate::moves::MoveStack;

    fn run(state: &mut GameState, change: impl FnOnce(&mut Transaction)) -> ReportLog {
        let mut stack = MoveStack::new();
        let mut report = ReportLog::new();
        stack.start();
        {
            let mut tx = Transaction::new(state, &mut stack, &mut report);
            change(&mut tx);
        }
        stack.finish();
        report
    }

    /// PRR started at 100 with A holding the president's certificate.
    fn started(config: GameConfig) -> (GameState, CompanyId) {
        let mut state = GameState::new(config, &["A", "B", "C", "D"]).unwrap();
        let prr = state.config.company_id("PRR").unwrap();
        let par = state.market.par_cell(100).unwrap();
        let president = state.public(prr).president_certificate();
        run(&mut state, |tx| {
            start_company(tx, prr, par);
            tx.move_certificate(president, PortfolioId::Player(PlayerId::new(0)));
            tx.update_company(prr, |s| s.floated = true);
        });
        (state, prr)
    }

    #[test]
    fn test_close_public_company_clears_everything() {
        let (mut state, prr) = started(sample::config());
        let dh = state.config.company_id("DH").unwrap();
        let h12 = state.config.hex_id("H12").unwrap();
        let train = state.next_new_train().unwrap();
        let dh_cert = state.private(dh).certificate();
        run(&mut state, |tx| {
            tx.bank_pays(prr, 500);
            tx.place_token(h12, prr);
            tx.move_train(train, PortfolioId::Company(prr));
            tx.move_certificate(dh_cert, PortfolioId::Company(prr));
        });
        let bank = state.bank.cash;

        let report = run(&mut state, |tx| close_company(tx, prr));

        assert!(state.company(prr).is_closed());
        assert_eq!(state.public(prr).cash, 0);
        assert_eq!(state.bank.cash, bank + 500);
        assert_eq!(state.public(prr).price, None);
        assert_eq!(state.train_holdings.owner(train), PortfolioId::ScrapHeap);
        assert!(state
            .public(prr)
            .core
            .certificates
            .iter()
            .all(|&c| state.certs.owner(c) == PortfolioId::ScrapHeap));
        assert_eq!(state.president(prr), None);
        assert!(state.map.hex(h12).tokens.is_empty());
        assert!(state.company(dh).is_closed());
        assert!(report.contains("DH closes"));
        assert!(report.contains("PRR closes"));
    }

    #[test]
    fn test_end_cell_triggers_game_end_once() {
        let mut config = sample::config();
        config.market.rows[0][7] = "112e".into();
        let (mut state, prr) = started(config);
        let start = state.public(prr).price.unwrap();

        let report = run(&mut state, |tx| {
            let mv = tx.state().market.right_or_up(start);
            apply_price_move(tx, prr, mv);
        });
        assert!(state.manager.end_triggered);
        assert_eq!(state.market.price(state.public(prr).price.unwrap()), 112);
        assert!(report.contains("the game will end"));

        let cell = state.public(prr).price.unwrap();
        let report = run(&mut state, |tx| {
            let mv = tx.state().market.left_or_down(cell);
            apply_price_move(tx, prr, mv);
        });
        assert!(state.manager.end_triggered);
        assert!(!report.contains("the game will end"));
    }

    #[test]
    fn test_pool_shares_pay_the_company() {
        let (mut state, prr) = started(sample::config());
        let certs = state.public(prr).core.certificates.clone();
        run(&mut state, |tx| {
            tx.move_certificate(certs[1], PortfolioId::Pool);
            assert_eq!(pay_dividends(tx, prr, 5), 15);
        });
        // 20% president plus 10% in the Pool; the IPO pays the Bank.
        assert_eq!(state.players[PlayerId::new(0)].cash, 600 + 10);
        assert_eq!(state.public(prr).cash, 5);
    }
}
