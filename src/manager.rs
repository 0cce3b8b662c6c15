//! Order Book Manager - routes orders to per-symbol books.
//!
//! Owns the order pool, every book, and the global id index. Drives the
//! cross-then-rest protocol for new orders and O(1) cancels.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::command::{OrderId, Price, Qty, Side, Symbol};
use crate::config::EngineConfig;
use crate::error::{OrderError, PoolError};
use crate::event::{EventLog, OutputEvent};
use crate::order::{Order, OrderIndex};
use crate::order_book::OrderBook;
use crate::pool::ObjectPool;

/// Owner of all order books and resident orders.
pub struct OrderBookManager {
    /// Storage for every resident order, across all symbols
    orders: ObjectPool<Order>,
    /// One book per symbol, created on first order
    books: FxHashMap<Symbol, OrderBook>,
    /// Global id -> pool slot lookup
    index: OrderIndex,
    /// Level slots pre-reserved for each new book
    level_reserve: usize,
}

impl OrderBookManager {
    /// Create an empty manager with no pre-reserved storage
    pub fn new() -> Self {
        Self {
            orders: ObjectPool::new(),
            books: FxHashMap::default(),
            index: OrderIndex::default(),
            level_reserve: 0,
        }
    }

    /// Create a manager with pool capacity reserved per `config`
    pub fn with_config(config: &EngineConfig) -> Result<Self, PoolError> {
        let mut index = OrderIndex::default();
        index.reserve(config.order_reserve);

        Ok(Self {
            orders: ObjectPool::with_reserve(config.order_reserve)?,
            books: FxHashMap::default(),
            index,
            level_reserve: config.level_reserve,
        })
    }

    /// Accept a new limit order: cross it, then rest what is left.
    ///
    /// A duplicate id yields a single error event and changes nothing.
    /// Only pool exhaustion is returned as an error; the incoming order
    /// is then neither indexed nor holding a pool slot.
    pub fn submit(
        &mut self,
        order_id: OrderId,
        symbol: Symbol,
        side: Side,
        qty: Qty,
        price: Price,
        log: &mut EventLog,
    ) -> Result<(), PoolError> {
        debug_assert!(qty > 0 && price > 0);

        if self.index.contains_key(&order_id) {
            debug!(order_id, "rejecting duplicate order id");
            log.push(OutputEvent::error(OrderError::DuplicateOrderId(order_id)));
            return Ok(());
        }

        // Book first: a failed book creation must not leave the order indexed
        let book = match self.books.entry(symbol) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                debug!(%symbol, "creating order book");
                entry.insert(OrderBook::with_reserve(symbol, self.level_reserve)?)
            }
        };

        let order_idx = self.orders.acquire(Order::new(order_id, qty, symbol))?;
        self.index.insert(order_id, order_idx);

        // Phase 1: CROSSING
        book.match_order(&mut self.orders, order_idx, price, side, &mut self.index, log);

        // Phase 2: RESTING
        let remaining = self.orders.get(order_idx).qty;
        if remaining > 0 {
            if let Err(err) = book.add(&mut self.orders, order_idx, price, side) {
                self.index.remove(&order_id);
                self.orders.release(order_idx);
                return Err(err);
            }
            debug!(order_id, %symbol, ?side, remaining, price, "order resting");
        } else {
            self.index.remove(&order_id);
            self.orders.release(order_idx);
            debug!(order_id, %symbol, "order fully filled");
        }

        Ok(())
    }

    /// Cancel a resting order by id.
    pub fn cancel(&mut self, order_id: OrderId, log: &mut EventLog) {
        let Some(order_idx) = self.index.remove(&order_id) else {
            debug!(order_id, "cancel for unknown order id");
            log.push(OutputEvent::error(OrderError::OrderNotFound(order_id)));
            return;
        };

        let symbol = self.orders.get(order_idx).symbol;
        match self.books.get_mut(&symbol) {
            Some(book) => book.remove(&mut self.orders, order_idx),
            None => warn!(order_id, %symbol, "resident order without a book"),
        }
        self.orders.release(order_idx);

        debug!(order_id, %symbol, "order canceled");
        log.push(OutputEvent::Cancel { order_id });
    }

    /// Snapshot every book, in ascending symbol order.
    pub fn snapshot_all(&self, log: &mut EventLog) {
        let mut symbols: Vec<&Symbol> = self.books.keys().collect();
        symbols.sort_unstable();

        for symbol in symbols {
            self.books[symbol].snapshot(&self.orders, log);
        }
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Book for `symbol`, if one has been created
    #[inline]
    pub fn book(&self, symbol: Symbol) -> Option<&OrderBook> {
        self.books.get(&symbol)
    }

    /// Iterate over every book (unordered)
    pub fn books(&self) -> impl Iterator<Item = &OrderBook> {
        self.books.values()
    }

    /// Total resident orders across all books
    #[inline]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// True if `order_id` is resident
    #[inline]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Remaining quantity of a resident order
    pub fn remaining_qty(&self, order_id: OrderId) -> Option<Qty> {
        self.index
            .get(&order_id)
            .map(|&idx| self.orders.get(idx).qty)
    }

    /// Order pool occupancy (in use, reserved)
    pub fn pool_usage(&self) -> (usize, usize) {
        (self.orders.in_use(), self.orders.size())
    }
}

impl Default for OrderBookManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderBookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBookManager")
            .field("books", &self.books.len())
            .field("orders", &self.index.len())
            .field("pool", &self.orders)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn test_rest_without_match() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.submit(1, sym("IBM"), Side::Buy, 10, 100_000, &mut log).unwrap();

        assert!(log.is_empty());
        assert_eq!(mgr.order_count(), 1);
        assert_eq!(mgr.remaining_qty(1), Some(10));
        assert_eq!(mgr.book(sym("IBM")).unwrap().best_bid(), Some(100_000));
    }

    #[test]
    fn test_full_fill_releases_incoming() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.submit(1, sym("IBM"), Side::Buy, 10, 100_000, &mut log).unwrap();
        mgr.submit(2, sym("IBM"), Side::Sell, 10, 100_000, &mut log).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(mgr.order_count(), 0);
        assert!(!mgr.contains(2));
        assert_eq!(mgr.pool_usage().0, 0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.submit(1, sym("IBM"), Side::Buy, 10, 100_000, &mut log).unwrap();
        mgr.submit(1, sym("IBM"), Side::Sell, 5, 90_000, &mut log).unwrap();

        assert_eq!(
            log.take(),
            vec![OutputEvent::Error {
                message: "1 Duplicate order id".into()
            }]
        );
        assert_eq!(mgr.remaining_qty(1), Some(10));
        assert_eq!(mgr.book(sym("IBM")).unwrap().best_ask(), None);
    }

    #[test]
    fn test_id_reusable_after_fill() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.submit(1, sym("IBM"), Side::Buy, 10, 100_000, &mut log).unwrap();
        mgr.submit(2, sym("IBM"), Side::Sell, 10, 100_000, &mut log).unwrap();
        log.clear();

        mgr.submit(1, sym("IBM"), Side::Sell, 3, 100_000, &mut log).unwrap();
        assert!(log.is_empty());
        assert!(mgr.contains(1));
    }

    #[test]
    fn test_cancel() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.submit(1, sym("IBM"), Side::Buy, 10, 100_000, &mut log).unwrap();
        mgr.cancel(1, &mut log);

        assert_eq!(log.take(), vec![OutputEvent::Cancel { order_id: 1 }]);
        assert_eq!(mgr.order_count(), 0);
        assert!(mgr.book(sym("IBM")).unwrap().is_empty());
    }

    #[test]
    fn test_cancel_unknown() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.cancel(42, &mut log);
        assert_eq!(
            log.take(),
            vec![OutputEvent::Error {
                message: "42 Order not found".into()
            }]
        );
    }

    #[test]
    fn test_books_are_independent() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.submit(1, sym("IBM"), Side::Buy, 10, 100_000, &mut log).unwrap();
        mgr.submit(2, sym("AAPL"), Side::Sell, 10, 100_000, &mut log).unwrap();

        assert!(log.is_empty());
        assert_eq!(mgr.order_count(), 2);
        assert_eq!(mgr.books().count(), 2);
    }

    #[test]
    fn test_snapshot_all_sorted_by_symbol() {
        let mut mgr = OrderBookManager::new();
        let mut log = EventLog::new();

        mgr.submit(1, sym("ZZZ"), Side::Buy, 10, 100_000, &mut log).unwrap();
        mgr.submit(2, sym("AAA"), Side::Buy, 10, 100_000, &mut log).unwrap();
        mgr.snapshot_all(&mut log);

        let ids: Vec<_> = log
            .iter()
            .map(|e| match e {
                OutputEvent::BookLine { order_id, .. } => *order_id,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_failed_book_creation_leaves_no_order() {
        let config = EngineConfig {
            order_reserve: 0,
            level_reserve: 5_000_000_000,
        };
        let mut mgr = OrderBookManager::with_config(&config).unwrap();
        let mut log = EventLog::new();

        let err = mgr
            .submit(1, sym("IBM"), Side::Buy, 10, 100_000, &mut log)
            .unwrap_err();
        assert!(matches!(err, PoolError::AllocationFailed { .. }));
        assert!(log.is_empty());
        assert_eq!(mgr.order_count(), 0);
        assert!(!mgr.contains(1));
        assert_eq!(mgr.pool_usage().0, 0);
        assert!(mgr.book(sym("IBM")).is_none());

        mgr.cancel(1, &mut log);
        assert_eq!(
            log.take(),
            vec![OutputEvent::Error {
                message: "1 Order not found".into()
            }]
        );
    }

    #[test]
    fn test_with_config_reserves() {
        let config = EngineConfig {
            order_reserve: 1000,
            level_reserve: 16,
        };
        let mgr = OrderBookManager::with_config(&config).unwrap();
        let (in_use, size) = mgr.pool_usage();
        assert_eq!(in_use, 0);
        assert!(size >= 1000);
    }
}
