//! Stress Tests - Push the engine to its limits.
//!
//! These tests verify correctness under extreme conditions:
//! - Pool growth well past the initial reservation
//! - High contention at single price levels
//! - Rapid order churn
//! - Maximum values for prices and quantities

use simple_cross::{
    CancelOrder, Command, Engine, EngineConfig, EngineError, NewOrder, OutputEvent, PoolError,
    Side, Symbol,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn place(order_id: u32, side: Side, price: u64, qty: u16) -> Command {
    Command::New(NewOrder {
        order_id,
        symbol: Symbol::new("STRESS").unwrap(),
        side,
        price,
        qty,
    })
}

fn cancel(order_id: u32) -> Command {
    Command::Cancel(CancelOrder { order_id })
}

fn fill_count(events: &[OutputEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, OutputEvent::Fill { .. }))
        .count()
}

// ============================================================================
// Pool Growth Tests
// ============================================================================

#[test]
fn test_growth_past_reservation() {
    let mut engine = Engine::new(EngineConfig {
        order_reserve: 128,
        level_reserve: 0,
    })
    .unwrap();

    // Non-overlapping prices: bids below 9_000, asks from 10_000
    for i in 0..10_000u32 {
        let (side, price) = if i % 2 == 0 {
            (Side::Buy, 8_000 + u64::from(i % 100) * 10)
        } else {
            (Side::Sell, 10_000 + u64::from(i % 100) * 10)
        };
        let events = engine.process_command(place(i, side, price, 100)).unwrap();
        assert!(events.is_empty(), "Order {} should rest, got {:?}", i, events);
    }

    assert_eq!(engine.order_count(), 10_000);
}

#[test]
fn test_pool_slots_return_after_cancel() {
    const ORDERS: u32 = 1000;
    let mut engine = Engine::default();

    for i in 0..ORDERS {
        engine.process_command(place(i, Side::Buy, 5_000 + u64::from(i % 500), 100)).unwrap();
    }
    let (_, reserved) = engine.manager.pool_usage();

    for i in 0..ORDERS {
        engine.process_command(cancel(i)).unwrap();
    }
    assert_eq!(engine.manager.pool_usage(), (0, reserved));

    // Refilling reuses slots instead of growing
    for i in 0..ORDERS {
        engine.process_command(place(ORDERS + i, Side::Buy, 10_000, 100)).unwrap();
    }
    assert_eq!(engine.manager.pool_usage(), (ORDERS as usize, reserved));
}

#[test]
fn test_unsatisfiable_level_reserve_rolls_back() {
    let mut engine = Engine::new(EngineConfig {
        order_reserve: 0,
        level_reserve: 5_000_000_000,
    })
    .unwrap();

    for _ in 0..2 {
        let result = engine.process_command(place(1, Side::Buy, 10_000, 100));
        assert_eq!(
            result,
            Err(EngineError::Pool(PoolError::AllocationFailed {
                requested: 5_000_000_000
            }))
        );
        assert_eq!(engine.order_count(), 0);
        assert_eq!(engine.manager.pool_usage().0, 0);
    }

    let events = engine.process_command(cancel(1)).unwrap();
    assert!(matches!(events.as_slice(), [OutputEvent::Error { .. }]));
}

// ============================================================================
// High Contention Tests
// ============================================================================

#[test]
fn test_single_price_level_contention() {
    const ORDERS_PER_SIDE: u32 = 1000;
    let mut engine = Engine::default();

    for i in 0..ORDERS_PER_SIDE {
        engine.process_command(place(i, Side::Sell, 10_000, 60)).unwrap();
    }
    assert_eq!(engine.order_count(), ORDERS_PER_SIDE as usize);

    // Two sweeps of 500 makers each; one order carries at most u16::MAX
    let mut fills = 0;
    for j in 0..2 {
        let events = engine
            .process_command(place(ORDERS_PER_SIDE + j, Side::Buy, 10_000, 30_000))
            .unwrap();
        fills += fill_count(&events);
    }

    assert_eq!(fills, 2 * ORDERS_PER_SIDE as usize);
    assert_eq!(engine.order_count(), 0, "Book should be empty after matching all");
}

#[test]
fn test_fifo_priority_under_contention() {
    let mut engine = Engine::default();

    for i in 0..100u32 {
        engine.process_command(place(i, Side::Sell, 10_000, 10)).unwrap();
    }

    // 50 orders @ 10 qty each
    let events = engine.process_command(place(1000, Side::Buy, 10_000, 500)).unwrap();

    let makers: Vec<u32> = events
        .iter()
        .skip(1)
        .step_by(2)
        .filter_map(|e| match e {
            OutputEvent::Fill { order_id, .. } => Some(*order_id),
            _ => None,
        })
        .collect();

    assert_eq!(makers.len(), 50);
    for (i, &maker_id) in makers.iter().enumerate() {
        assert_eq!(maker_id, i as u32, "Fill {} should match order {}", i, i);
    }
}

// ============================================================================
// Rapid Churn Tests
// ============================================================================

#[test]
fn test_rapid_add_cancel_cycles() {
    let mut engine = Engine::default();

    for cycle in 0..10_000u32 {
        let side = if cycle % 2 == 0 { Side::Buy } else { Side::Sell };
        assert!(engine.process_command(place(cycle, side, 10_000, 100)).unwrap().is_empty());

        let events = engine.process_command(cancel(cycle)).unwrap();
        assert_eq!(events, vec![OutputEvent::Cancel { order_id: cycle }]);
    }

    assert_eq!(engine.order_count(), 0, "All orders should be canceled");
    assert_eq!(engine.manager.pool_usage().0, 0);
}

#[test]
fn test_rapid_match_cycles() {
    const CYCLES: u32 = 5_000;
    let mut engine = Engine::default();
    let mut total_fills = 0;

    for cycle in 0..CYCLES {
        engine.process_command(place(cycle * 2, Side::Sell, 10_000, 100)).unwrap();
        let events = engine.process_command(place(cycle * 2 + 1, Side::Buy, 10_000, 100)).unwrap();
        total_fills += fill_count(&events);
    }

    assert_eq!(total_fills, 2 * CYCLES as usize);
    assert_eq!(engine.order_count(), 0, "Book should be empty");
}

// ============================================================================
// Edge Case Tests
// ============================================================================

#[test]
fn test_max_price() {
    let mut engine = Engine::default();
    let symbol = Symbol::new("STRESS").unwrap();

    engine.process_command(place(1, Side::Sell, u64::MAX - 1, 100)).unwrap();
    assert_eq!(engine.best_ask(symbol), Some(u64::MAX - 1));

    let events = engine.process_command(place(2, Side::Buy, u64::MAX, 100)).unwrap();
    assert_eq!(fill_count(&events), 2);
}

#[test]
fn test_max_quantity() {
    let mut engine = Engine::default();

    engine.process_command(place(1, Side::Buy, 10_000, u16::MAX)).unwrap();
    engine.process_command(place(2, Side::Sell, 10_000, u16::MAX)).unwrap();

    assert_eq!(engine.order_count(), 0);
}

#[test]
fn test_quantity_one_chain() {
    let mut engine = Engine::default();
    engine.process_command(place(1, Side::Buy, 10_000, 100)).unwrap();

    for i in 0..100u32 {
        let events = engine.process_command(place(10 + i, Side::Sell, 10_000, 1)).unwrap();
        assert_eq!(fill_count(&events), 2);
    }
    assert_eq!(engine.order_count(), 0);
}

#[test]
fn test_many_price_levels() {
    const LEVELS: u32 = 10_000;
    let mut engine = Engine::default();

    for i in 0..LEVELS {
        engine.process_command(place(i, Side::Buy, u64::from(i + 1) * 1000, 100)).unwrap();
    }

    let book = engine.manager.book(Symbol::new("STRESS").unwrap()).unwrap();
    assert_eq!(book.bid_levels(), LEVELS as usize);
    assert_eq!(book.best_bid(), Some(u64::from(LEVELS) * 1000));
}

// ============================================================================
// Cancel Edge Cases
// ============================================================================

#[test]
fn test_double_cancel() {
    let mut engine = Engine::default();
    engine.process_command(place(1, Side::Buy, 10_000, 100)).unwrap();

    let first = engine.process_command(cancel(1)).unwrap();
    assert_eq!(first, vec![OutputEvent::Cancel { order_id: 1 }]);

    let second = engine.process_command(cancel(1)).unwrap();
    assert!(matches!(second.as_slice(), [OutputEvent::Error { .. }]));
}

#[test]
fn test_cancel_after_partial_fill() {
    let mut engine = Engine::default();

    engine.process_command(place(1, Side::Sell, 10_000, 1000)).unwrap();
    engine.process_command(place(2, Side::Buy, 10_000, 300)).unwrap();
    assert_eq!(engine.manager.remaining_qty(1), Some(700));

    let events = engine.process_command(cancel(1)).unwrap();
    assert_eq!(events, vec![OutputEvent::Cancel { order_id: 1 }]);
    assert_eq!(engine.order_count(), 0);
}

#[test]
fn test_cancel_fully_filled_order() {
    let mut engine = Engine::default();

    engine.process_command(place(1, Side::Sell, 10_000, 10)).unwrap();
    engine.process_command(place(2, Side::Buy, 10_000, 10)).unwrap();

    for id in [1, 2] {
        let events = engine.process_command(cancel(id)).unwrap();
        assert!(matches!(events.as_slice(), [OutputEvent::Error { .. }]));
    }
}

// ============================================================================
// Large Scale Invariant Checks
// ============================================================================

#[test]
fn test_large_random_workload_invariants() {
    const SEED: u64 = 0xABCDEF123456;
    const OPS: usize = 50_000;

    let symbol = Symbol::new("STRESS").unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut engine = Engine::default();
    let mut next_order_id = 1u32;

    for _ in 0..OPS {
        if rng.gen_range(0..100) < 65 {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = rng.gen_range(9_000..11_000) * 100;
            let events = engine
                .process_command(place(next_order_id, side, price, rng.gen_range(1..500)))
                .unwrap();

            // Every fill executes at a price no worse than the incoming limit
            for event in &events {
                if let OutputEvent::Fill { price: fill_price, qty, .. } = event {
                    assert!(*qty > 0);
                    assert!(side.is_marketable(price, *fill_price));
                }
            }
            next_order_id += 1;
        } else {
            engine
                .process_command(cancel(rng.gen_range(1..=next_order_id)))
                .unwrap();
        }

        // The book never stays crossed
        if let Some(book) = engine.manager.book(symbol) {
            if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
                assert!(bid < ask, "Crossed book: bid {} >= ask {}", bid, ask);
            }
        }
    }

    let resting: usize = engine
        .process_command(Command::Snapshot)
        .unwrap()
        .iter()
        .filter(|e| matches!(e, OutputEvent::BookLine { qty, .. } if *qty > 0))
        .count();
    assert_eq!(resting, engine.order_count());
    assert_eq!(
        engine.manager.book(symbol).unwrap().order_count(),
        engine.order_count()
    );
}
