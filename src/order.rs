//! Order - a pooled order node with intrusive FIFO links.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::command::{OrderId, Qty, Symbol};
use crate::pool::{PoolIndex, NULL_INDEX};

/// Global order-id index: id -> slot in the order pool
pub type OrderIndex = FxHashMap<OrderId, PoolIndex>;

/// A single order, resident in the manager's order pool.
///
/// `level`, `prev` and `next` together form the removal handle: they
/// locate the order inside its price level so cancel never scans.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Order {
    /// Client order id
    pub order_id: OrderId,

    /// Remaining quantity to fill
    pub qty: Qty,

    /// Instrument, used to find the owning book on cancel
    pub symbol: Symbol,

    /// Owning price level in the book's level pool (NULL while not resting)
    pub level: PoolIndex,

    /// Index of previous order at the same level (older)
    pub prev: PoolIndex,

    /// Index of next order at the same level (newer)
    pub next: PoolIndex,
}

impl Order {
    /// Create a new, not yet resting order
    #[inline]
    pub const fn new(order_id: OrderId, qty: Qty, symbol: Symbol) -> Self {
        Self {
            order_id,
            qty,
            symbol,
            level: NULL_INDEX,
            prev: NULL_INDEX,
            next: NULL_INDEX,
        }
    }

    /// Returns true if the order is linked into a price level
    #[inline]
    pub const fn is_resting(&self) -> bool {
        self.level != NULL_INDEX
    }

    /// Clear level membership and links
    #[inline]
    pub fn unlink(&mut self) {
        self.level = NULL_INDEX;
        self.prev = NULL_INDEX;
        self.next = NULL_INDEX;
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("order_id", &self.order_id)
            .field("symbol", &self.symbol)
            .field("qty", &self.qty)
            .field("level", &self.level)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}
