//! Matching and settlement together, without the async engine.
//!
//! These tests drive an `AssetBook` with a real `Settler` and check the
//! bookkeeping properties: pending-share bounds, position conservation,
//! and the trade log.

use rand::Rng;
use rust_decimal::Decimal;
use tradebook_matchcore::AssetBook;
use tradebook_settlement::{CompletionTracker, PositionConservation, PositionLedger, Settler};
use tradebook_types::*;

struct Desk {
    asset: AssetId,
    book: AssetBook,
    settler: Settler,
    ledger: PositionLedger,
    sequence: u64,
}

impl Desk {
    fn new(asset: &str) -> Self {
        let ledger = PositionLedger::new();
        Self {
            asset: AssetId::from(asset),
            book: AssetBook::new(AssetId::from(asset)),
            settler: Settler::new(ledger.clone()),
            ledger,
            sequence: 0,
        }
    }

    fn investor(&self, shares: i64) -> InvestorId {
        let id = InvestorId::new();
        self.ledger
            .register(Investor::new(id).with_position(self.asset.clone(), Decimal::new(shares, 0)));
        id
    }

    fn submit(
        &mut self,
        investor: InvestorId,
        side: OrderSide,
        price: i64,
        shares: i64,
        policy: MatchPolicy,
    ) -> tradebook_matchcore::MatchOutcome {
        let mut order = Order::dummy_limit_for(
            investor,
            self.asset.as_str(),
            side,
            Decimal::new(price, 0),
            Decimal::new(shares, 0),
        );
        order.sequence = self.sequence;
        self.sequence += 1;
        self.book
            .submit(order, policy, &mut self.settler)
            .expect("matching should succeed")
    }
}

#[test]
fn partial_fill_updates_positions_and_log() {
    let mut desk = Desk::new("PETR4");
    let buyer = desk.investor(0);
    let seller = desk.investor(100);

    let rest = desk.submit(buyer, OrderSide::Buy, 10, 100, MatchPolicy::SingleMatch);
    assert!(rest.is_empty());
    assert_eq!(rest.order.pending_shares, Decimal::new(100, 0));

    let outcome = desk.submit(seller, OrderSide::Sell, 9, 40, MatchPolicy::SingleMatch);
    assert_eq!(outcome.fills.len(), 1);
    let tx = &outcome.fills[0].transaction;
    assert_eq!(tx.shares, Decimal::new(40, 0));
    assert_eq!(tx.price, Decimal::new(10, 0), "executes at the resting bid");
    assert_eq!(tx.total, Decimal::new(400, 0));

    assert_eq!(desk.ledger.position(&buyer, &desk.asset), Decimal::new(40, 0));
    assert_eq!(desk.ledger.position(&seller, &desk.asset), Decimal::new(60, 0));
    assert_eq!(desk.settler.log().len(), 1);
    assert_eq!(
        desk.book.bids().peek_best().map(|o| o.pending_shares),
        Some(Decimal::new(60, 0))
    );
}

#[test]
fn conservation_and_bounds_hold_over_random_flow() {
    let mut rng = rand::thread_rng();
    for policy in [MatchPolicy::SingleMatch, MatchPolicy::Sweep] {
        let mut desk = Desk::new("VALE3");
        let investors: Vec<InvestorId> = (0..6).map(|_| desk.investor(1_000)).collect();
        let conservation = PositionConservation::capture(&desk.ledger);

        for _ in 0..500 {
            let investor = investors[rng.gen_range(0..investors.len())];
            let side = if rng.gen_bool(0.5) {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            };
            let price = rng.gen_range(95..=105);
            let shares = rng.gen_range(1..=50);
            let outcome = desk.submit(investor, side, price, shares, policy);

            for fill in &outcome.fills {
                let tx = &fill.transaction;
                assert!(tx.shares > Decimal::ZERO);
                assert_eq!(tx.price, fill.maker.price, "maker price rule");
                assert_eq!(tx.total, tx.shares * tx.price);
                for order in [&fill.maker, &fill.taker] {
                    assert!(order.pending_shares >= Decimal::ZERO);
                    assert!(order.pending_shares <= order.shares);
                }
            }
            if policy == MatchPolicy::SingleMatch {
                assert!(outcome.fills.len() <= 1);
            }
            // The book never rests a crossed spread once an arrival is done
            // sweeping.
            if policy == MatchPolicy::Sweep {
                if let (Some(bid), Some(ask)) = (desk.book.best_bid(), desk.book.best_ask()) {
                    assert!(bid < ask, "crossed book: bid {bid} ask {ask}");
                }
            }
        }

        conservation.verify_ledger(&desk.ledger).unwrap();
        for order in desk.book.bids().iter().chain(desk.book.asks().iter()) {
            assert!(order.pending_shares > Decimal::ZERO);
        }
    }
}

#[test]
fn traded_volume_matches_position_deltas() {
    let mut desk = Desk::new("ITUB4");
    let buyer = desk.investor(0);
    let seller = desk.investor(500);

    desk.submit(seller, OrderSide::Sell, 20, 30, MatchPolicy::Sweep);
    desk.submit(seller, OrderSide::Sell, 21, 30, MatchPolicy::Sweep);
    desk.submit(buyer, OrderSide::Buy, 21, 45, MatchPolicy::Sweep);

    let volume = desk.settler.log().total_volume(&desk.asset);
    assert_eq!(volume, Decimal::new(45, 0));
    assert_eq!(desk.ledger.position(&buyer, &desk.asset), volume);
    assert_eq!(
        desk.settler.log().total_value(&desk.asset),
        Decimal::new(30 * 20 + 15 * 21, 0)
    );
}

#[tokio::test]
async fn tracker_counts_down_with_settlements() {
    let tracker = CompletionTracker::new();
    let ledger = PositionLedger::new();
    let asset = AssetId::from("BBAS3");
    let mut book = AssetBook::new(asset.clone());
    let mut settler = Settler::new(ledger).with_tracker(tracker.clone());

    tracker.arm(1);
    let sell = Order::dummy_limit_for(
        InvestorId::new(),
        "BBAS3",
        OrderSide::Sell,
        Decimal::new(30, 0),
        Decimal::new(10, 0),
    )
    .with_sequence(0);
    let buy = Order::dummy_limit_for(
        InvestorId::new(),
        "BBAS3",
        OrderSide::Buy,
        Decimal::new(31, 0),
        Decimal::new(10, 0),
    )
    .with_sequence(1);
    book.submit(sell, MatchPolicy::SingleMatch, &mut settler).unwrap();
    book.submit(buy, MatchPolicy::SingleMatch, &mut settler).unwrap();

    tracker.wait().await.unwrap();
    assert_eq!(tracker.pending(), 0);
    assert!(book.is_empty());
}
