//! Leg-by-leg execution against a scripted venue.

mod support;

use std::sync::Arc;

use rust_decimal_macros::dec;
use triarb::application::execution::{ExecutionEngine, LossReason};
use triarb::domain::order::OrderSide;
use triarb::error::VenueError;
use triarb::testkit::domain::params;
use triarb::testkit::venue::{Fill, ScriptedVenue};

use support::triangle::{plan_reverse, profitable_books, registry, venue_with_books};

/// 20020 USDT buys exactly 10 ETH at 2002.
const TRADABLE: rust_decimal::Decimal = dec!(20020);

fn engine(venue: &Arc<ScriptedVenue>) -> ExecutionEngine {
    ExecutionEngine::new(venue.clone(), registry(), params())
}

#[tokio::test]
async fn full_fills_complete_the_cycle() {
    let venue = Arc::new(venue_with_books(profitable_books()));
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;

    let outcome = engine(&venue).execute(&plan).await;

    assert!(!outcome.is_lost());
    assert_eq!(outcome.orders.len(), 3);
    let placed = venue.placed();
    assert_eq!(placed[0].quantity, dec!(10));
    assert_eq!(placed[1].quantity, dec!(10));
    assert_eq!(placed[2].quantity, dec!(0.672));
    // 0.672 BTC at 29990
    assert_eq!(outcome.report.ending_qty, Some(dec!(20153.28)));
    assert_eq!(outcome.report.profit, dec!(133.28));
    assert_eq!(venue.cancel_count(), 0);
}

#[tokio::test]
async fn partial_fill_cancels_refreshes_and_resubmits_remainder() {
    let venue = Arc::new(
        venue_with_books(profitable_books()).with_fills(vec![Fill::Partial(dec!(6))]),
    );
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;
    venue.reset_book_count();

    let outcome = engine(&venue).execute(&plan).await;

    assert_eq!(venue.cancel_count(), 1);
    assert_eq!(venue.book_count(), 1);
    let placed = venue.placed();
    assert_eq!(placed.len(), 4);
    assert_eq!(placed[0].quantity, dec!(10));
    assert_eq!(placed[1].pair.as_str(), "ETHUSDT");
    assert_eq!(placed[1].side, OrderSide::Buy);
    assert_eq!(placed[1].quantity, dec!(4));
    assert_eq!(placed[1].price, dec!(2002));

    // Both leg 0 orders are reported; the third leg still sells the full 0.672 BTC.
    assert_eq!(outcome.orders[0].filled_qty, dec!(6));
    assert_eq!(outcome.orders[1].filled_qty, dec!(4));
    assert_eq!(placed[3].quantity, dec!(0.672));
    assert!(!outcome.is_lost());
    assert_eq!(outcome.report.profit, dec!(133.28));
}

#[tokio::test]
async fn unfilled_first_leg_loses_the_cycle() {
    let venue = Arc::new(venue_with_books(profitable_books()).with_fills(vec![Fill::Unfilled]));
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;

    let outcome = engine(&venue).execute(&plan).await;

    assert_eq!(outcome.lost, Some(LossReason::FirstLegUnfilled));
    assert!(outcome.report.arbitrage_lost);
    assert_eq!(outcome.report.profit, dec!(0));
    assert_eq!(outcome.report.ending_qty, None);
    assert_eq!(venue.place_count(), 1);
    assert_eq!(venue.cancel_count(), 1);
}

#[tokio::test]
async fn first_leg_that_fills_while_cancelling_continues() {
    let venue = Arc::new(
        venue_with_books(profitable_books())
            .with_fills(vec![Fill::Late {
                first: dec!(0),
                then: dec!(10),
            }])
            .with_cancels(vec![false]),
    );
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;

    let outcome = engine(&venue).execute(&plan).await;

    assert!(!outcome.is_lost());
    assert_eq!(venue.place_count(), 3);
    assert_eq!(venue.cancel_count(), 1);
    assert_eq!(outcome.report.profit, dec!(133.28));
}

#[tokio::test]
async fn short_second_leg_shrinks_the_third() {
    // 0.00005 ETH left over is below the pair's quantity step, so leg 1 resolves short.
    let venue = Arc::new(venue_with_books(profitable_books()).with_fills(vec![
        Fill::Full,
        Fill::Partial(dec!(9.99995)),
    ]));
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;
    venue.reset_book_count();

    let outcome = engine(&venue).execute(&plan).await;

    assert!(!outcome.is_lost());
    assert_eq!(venue.cancel_count(), 1);
    assert_eq!(venue.book_count(), 1);
    let placed = venue.placed();
    assert_eq!(placed.len(), 3);
    assert_eq!(placed[2].pair.as_str(), "BTCUSDT");
    assert_eq!(placed[2].quantity, dec!(0.6719));
    assert_eq!(outcome.report.profit, dec!(0.6719) * dec!(29990) - TRADABLE);
}

#[tokio::test]
async fn repeated_rejection_loses_the_cycle() {
    let venue = Arc::new(
        venue_with_books(profitable_books())
            .with_fills(vec![
                Fill::Full,
                Fill::Reject(VenueError::InsufficientBalance {
                    asset: "ETH".into(),
                }),
                Fill::Reject(VenueError::InsufficientBalance {
                    asset: "ETH".into(),
                }),
            ])
            .with_balance("ETH", dec!(10)),
    );
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;

    let outcome = engine(&venue).execute(&plan).await;

    assert_eq!(outcome.lost, Some(LossReason::RejectedTwice));
    assert_eq!(venue.balance_count(), 1);
    assert_eq!(venue.place_count(), 3);
    // Only leg 0 was ever accepted
    assert_eq!(venue.placed().len(), 1);
    assert_eq!(outcome.orders.len(), 1);
}

#[tokio::test]
async fn rejection_retries_with_buffered_balance() {
    let venue = Arc::new(
        venue_with_books(profitable_books())
            .with_fills(vec![
                Fill::Full,
                Fill::Reject(VenueError::Rejected("insufficient funds".into())),
            ])
            .with_balance("ETH", dec!(10)),
    );
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;

    let outcome = engine(&venue).execute(&plan).await;

    assert!(!outcome.is_lost());
    let placed = venue.placed();
    // ETH keeps a 0.5% settlement buffer
    assert_eq!(placed[1].quantity, dec!(9.95));
    assert_eq!(placed[1].side, OrderSide::Sell);
    // Leg 2 is scaled to the 0.66864 BTC leg 1 produced
    assert_eq!(placed[2].quantity, dec!(0.6686));
}

#[tokio::test]
async fn rejection_retry_is_capped_at_the_planned_quantity() {
    let venue = Arc::new(
        venue_with_books(profitable_books())
            .with_fills(vec![
                Fill::Full,
                Fill::Reject(VenueError::Rejected("transient".into())),
            ])
            .with_balance("ETH", dec!(5000)),
    );
    let plan = plan_reverse(Arc::clone(&venue), TRADABLE).await;

    let outcome = engine(&venue).execute(&plan).await;

    assert!(!outcome.is_lost());
    let placed = venue.placed();
    assert_eq!(placed[1].quantity, dec!(10));
    assert_eq!(placed[2].quantity, dec!(0.672));
    assert_eq!(outcome.report.profit, dec!(133.28));
}

#[tokio::test]
async fn venue_outage_mid_leg_loses_the_cycle() {
    let planning = Arc::new(venue_with_books(profitable_books()));
    let plan = plan_reverse(Arc::clone(&planning), TRADABLE).await;
    // Executing venue serves no books, so the post-cancel refresh fails.
    let venue = Arc::new(
        ScriptedVenue::new(triarb::testkit::domain::eth_btc_usdt())
            .with_fills(vec![Fill::Full, Fill::Partial(dec!(5))]),
    );

    let outcome = engine(&venue).execute(&plan).await;

    assert_eq!(outcome.lost, Some(LossReason::VenueUnavailable));
    assert_eq!(venue.cancel_count(), 1);
    assert_eq!(venue.book_count(), 1);
    assert_eq!(planning.place_count(), 0);
}
