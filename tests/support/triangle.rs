use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use triarb::application::cycle::ScanSchedule;
use triarb::application::planner::PlanBuilder;
use triarb::application::scanner::{candidate_triangles, OpportunityScanner};
use triarb::domain::book::Book;
use triarb::domain::id::Asset;
use triarb::domain::money::Quantity;
use triarb::domain::opportunity::Opportunity;
use triarb::domain::pair::PairRegistry;
use triarb::domain::plan::TradePlan;
use triarb::domain::quote::QuoteSnapshot;
use triarb::testkit::domain::{book, eth_btc_usdt, params, snapshot, tight_book};
use triarb::testkit::venue::ScriptedVenue;

/// Quotes where the reverse ETH/BTC/USDT cycle yields about 0.67%.
pub fn profitable_snapshot() -> QuoteSnapshot {
    snapshot(&[
        ("ETHUSDT", dec!(2000), dec!(2002)),
        ("BTCUSDT", dec!(29990), dec!(30001)),
        ("ETHBTC", dec!(0.0672), dec!(0.0673)),
    ])
}

/// Quotes where neither direction clears three maker fees.
pub fn flat_snapshot() -> QuoteSnapshot {
    snapshot(&[
        ("ETHUSDT", dec!(2000), dec!(2001)),
        ("BTCUSDT", dec!(30000), dec!(30001)),
        ("ETHBTC", dec!(0.0666), dec!(0.0667)),
    ])
}

/// Books matching [`profitable_snapshot`], deep enough for a 20k cycle.
pub fn profitable_books() -> Vec<Book> {
    vec![
        tight_book("ETHUSDT", dec!(2000), dec!(2002), dec!(50)),
        tight_book("BTCUSDT", dec!(29990), dec!(30001), dec!(10)),
        book(
            "ETHBTC",
            &[(dec!(0.0672), dec!(50))],
            &[(dec!(0.0673), dec!(45))],
        ),
    ]
}

/// Books where the ETHBTC bid has dropped since the snapshot.
pub fn stale_books() -> Vec<Book> {
    vec![
        tight_book("ETHUSDT", dec!(2000), dec!(2002), dec!(50)),
        tight_book("BTCUSDT", dec!(29990), dec!(30001), dec!(10)),
        tight_book("ETHBTC", dec!(0.0668), dec!(0.0673), dec!(50)),
    ]
}

pub fn venue_with_books(books: Vec<Book>) -> ScriptedVenue {
    books
        .into_iter()
        .fold(ScriptedVenue::new(eth_btc_usdt()), ScriptedVenue::with_book)
}

pub fn registry() -> Arc<PairRegistry> {
    Arc::new(PairRegistry::new(eth_btc_usdt()))
}

/// Best opportunity in `snap` over the ETH/BTC/USDT triangle.
pub fn best_opportunity(snap: &QuoteSnapshot) -> Opportunity {
    let triangles = candidate_triangles(&registry(), &Asset::new("USDT"));
    OpportunityScanner::new(triangles)
        .scan(snap)
        .best
        .expect("triangle is priced")
}

/// Plan the profitable reverse cycle against `venue` from `tradable` USDT.
pub async fn plan_reverse(venue: Arc<ScriptedVenue>, tradable: Quantity) -> TradePlan {
    let planner = PlanBuilder::new(venue, registry(), params());
    planner
        .build(1, &best_opportunity(&profitable_snapshot()), tradable)
        .await
        .expect("plan builds")
}

/// No pauses, three snapshot attempts.
pub fn schedule() -> ScanSchedule {
    ScanSchedule {
        num_scans: 3,
        interval: Duration::ZERO,
        snapshot_max_retries: 3,
        snapshot_retry_delay: Duration::ZERO,
    }
}
