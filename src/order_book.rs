//! Order Book - The limit order book for one symbol.
//!
//! Price levels live in a per-book pool and are indexed by two ordered
//! maps: bids keyed by `Reverse(price)` so the highest bid comes first,
//! asks keyed by price so the lowest ask comes first. Both iterate from
//! most to least aggressive.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::command::{Price, Side, Symbol};
use crate::error::PoolError;
use crate::event::{EventLog, OutputEvent};
use crate::order::Order;
use crate::pool::{ObjectPool, PoolIndex};
use crate::price_level::PriceLevel;

/// Order book for a single symbol.
pub struct OrderBook {
    /// Instrument served by this book
    symbol: Symbol,
    /// Storage for price levels
    pub(crate) levels: ObjectPool<PriceLevel>,
    /// Bid levels, highest price first
    pub(crate) bids: BTreeMap<Reverse<Price>, PoolIndex>,
    /// Ask levels, lowest price first
    pub(crate) asks: BTreeMap<Price, PoolIndex>,
    /// Number of resting orders
    order_count: usize,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            levels: ObjectPool::new(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_count: 0,
        }
    }

    /// Create a new order book with level slots pre-reserved
    pub fn with_reserve(symbol: Symbol, levels: usize) -> Result<Self, PoolError> {
        Ok(Self {
            levels: ObjectPool::with_reserve(levels)?,
            ..Self::new(symbol)
        })
    }

    #[inline]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    // ========================================================================
    // Level Access
    // ========================================================================

    /// Index of the level at `price` on `side`, if any
    #[inline]
    pub(crate) fn level_index(&self, side: Side, price: Price) -> Option<PoolIndex> {
        match side {
            Side::Buy => self.bids.get(&Reverse(price)).copied(),
            Side::Sell => self.asks.get(&price).copied(),
        }
    }

    /// Index of the most aggressive level on `side`
    #[inline]
    pub(crate) fn best_level(&self, side: Side) -> Option<PoolIndex> {
        match side {
            Side::Buy => self.bids.first_key_value().map(|(_, &idx)| idx),
            Side::Sell => self.asks.first_key_value().map(|(_, &idx)| idx),
        }
    }

    /// Get a price level (immutable)
    #[inline]
    pub fn get_level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        self.level_index(side, price).map(|idx| self.levels.get(idx))
    }

    /// Find or create the level at `price` on `side`
    fn get_or_create_level(&mut self, side: Side, price: Price) -> Result<PoolIndex, PoolError> {
        if let Some(idx) = self.level_index(side, price) {
            return Ok(idx);
        }

        let idx = self.levels.acquire(PriceLevel::new(price, side))?;
        match side {
            Side::Buy => self.bids.insert(Reverse(price), idx),
            Side::Sell => self.asks.insert(price, idx),
        };
        Ok(idx)
    }

    /// Drop an empty level from its side's index and release its slot
    pub(crate) fn remove_level(&mut self, level_idx: PoolIndex) {
        let level = self.levels.release(level_idx);
        debug_assert!(level.is_empty());
        match level.side {
            Side::Buy => self.bids.remove(&Reverse(level.price)),
            Side::Sell => self.asks.remove(&level.price),
        };
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Rest an order at `price` on `side`.
    ///
    /// Does not match; callers cross first. Sets the order's level handle
    /// and queue links.
    ///
    /// # Complexity
    /// O(log P) for a new level, O(1) for an existing one
    pub fn add(
        &mut self,
        orders: &mut ObjectPool<Order>,
        order_idx: PoolIndex,
        price: Price,
        side: Side,
    ) -> Result<(), PoolError> {
        debug_assert!(!orders.get(order_idx).is_resting());

        let level_idx = self.get_or_create_level(side, price)?;
        self.levels.get_mut(level_idx).push_back(orders, order_idx);
        orders.get_mut(order_idx).level = level_idx;
        self.order_count += 1;
        Ok(())
    }

    /// Unlink a resting order using its stored handle.
    ///
    /// Removes the level if it becomes empty. The order stays in the pool.
    ///
    /// # Complexity
    /// O(1) unlink, O(log P) if the level goes away
    pub fn remove(&mut self, orders: &mut ObjectPool<Order>, order_idx: PoolIndex) {
        let level_idx = orders.get(order_idx).level;
        debug_assert!(orders.get(order_idx).is_resting());

        let now_empty = self.levels.get_mut(level_idx).remove(orders, order_idx);
        orders.get_mut(order_idx).unlink();
        self.order_count -= 1;

        if now_empty {
            self.remove_level(level_idx);
        }
    }

    /// Append one book line per resting order to `log`.
    ///
    /// Asks come first from highest to lowest price with each level's
    /// orders newest first, then bids from highest to lowest price with
    /// each level's orders oldest first.
    pub fn snapshot(&self, orders: &ObjectPool<Order>, log: &mut EventLog) {
        for &level_idx in self.asks.values().rev() {
            let level = self.levels.get(level_idx);
            for (_, order) in level.iter_rev(orders) {
                log.push(self.book_line(order, level));
            }
        }
        for &level_idx in self.bids.values() {
            let level = self.levels.get(level_idx);
            for (_, order) in level.iter(orders) {
                log.push(self.book_line(order, level));
            }
        }
    }

    fn book_line(&self, order: &Order, level: &PriceLevel) -> OutputEvent {
        OutputEvent::BookLine {
            order_id: order.order_id,
            symbol: self.symbol,
            side: level.side,
            qty: order.qty,
            price: level.price,
        }
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Get the best bid price (highest buy price)
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first_key_value().map(|(Reverse(p), _)| *p)
    }

    /// Get the best ask price (lowest sell price)
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(p, _)| *p)
    }

    /// Get the number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_count
    }

    /// Get the number of bid levels
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Get the number of ask levels
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Check if the book is empty
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Total quantity and order count at a price level
    pub fn depth_at(&self, side: Side, price: Price) -> (u64, u32) {
        self.get_level(side, price)
            .map(|l| (l.total_qty, l.count))
            .unwrap_or((0, 0))
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("symbol", &self.symbol)
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("order_count", &self.order_count)
            .finish()
    }
}
