//! Price Level - A FIFO queue of orders at a single price point.
//!
//! Implements a doubly-linked list using pool indices for O(1)
//! insertion, removal from head, and removal from arbitrary position.

use crate::command::{Price, Qty, Side};
use crate::order::Order;
use crate::pool::{ObjectPool, PoolIndex, NULL_INDEX};

/// A queue of orders at a specific price on one side.
///
/// Orders are processed in FIFO order (price-time priority).
/// The doubly-linked structure enables O(1) cancel from any position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price shared by every order in the queue
    pub price: Price,
    /// Side of every order in the queue
    pub side: Side,
    /// Index of the oldest order (highest priority, first to match)
    pub head: PoolIndex,
    /// Index of the newest order (last to match)
    pub tail: PoolIndex,
    /// Total quantity across all orders at this level
    pub total_qty: u64,
    /// Number of orders at this level
    pub count: u32,
}

impl PriceLevel {
    /// Create a new empty price level
    #[inline]
    pub const fn new(price: Price, side: Side) -> Self {
        Self {
            price,
            side,
            head: NULL_INDEX,
            tail: NULL_INDEX,
            total_qty: 0,
            count: 0,
        }
    }

    /// Returns true if there are no orders at this level
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append an order to the tail of the queue (newest order).
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn push_back(&mut self, orders: &mut ObjectPool<Order>, index: PoolIndex) {
        let qty = orders.get(index).qty;

        if self.tail == NULL_INDEX {
            debug_assert!(self.head == NULL_INDEX);
            self.head = index;
            let node = orders.get_mut(index);
            node.prev = NULL_INDEX;
            node.next = NULL_INDEX;
        } else {
            orders.get_mut(self.tail).next = index;
            let node = orders.get_mut(index);
            node.prev = self.tail;
            node.next = NULL_INDEX;
        }
        self.tail = index;

        self.count += 1;
        self.total_qty += u64::from(qty);
    }

    /// Remove an order from anywhere in the queue.
    ///
    /// The order's `prev`/`next` links are cleared; its `level` handle is
    /// left for the caller. The order stays in the pool.
    ///
    /// # Returns
    /// `true` if the level is now empty.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn remove(&mut self, orders: &mut ObjectPool<Order>, index: PoolIndex) -> bool {
        let node = orders.get(index);
        let prev_idx = node.prev;
        let next_idx = node.next;
        let qty = node.qty;

        if prev_idx == NULL_INDEX {
            debug_assert!(self.head == index);
            self.head = next_idx;
        } else {
            orders.get_mut(prev_idx).next = next_idx;
        }

        if next_idx == NULL_INDEX {
            debug_assert!(self.tail == index);
            self.tail = prev_idx;
        } else {
            orders.get_mut(next_idx).prev = prev_idx;
        }

        self.count -= 1;
        self.total_qty -= u64::from(qty);

        let node = orders.get_mut(index);
        node.prev = NULL_INDEX;
        node.next = NULL_INDEX;

        self.count == 0
    }

    /// Peek at the head order without removing it.
    ///
    /// # Returns
    /// Index of the head order, or `NULL_INDEX` if empty.
    #[inline]
    pub const fn peek_head(&self) -> PoolIndex {
        self.head
    }

    /// Update total quantity after a partial fill.
    #[inline]
    pub fn subtract_qty(&mut self, qty: Qty) {
        debug_assert!(self.total_qty >= u64::from(qty));
        self.total_qty -= u64::from(qty);
    }

    /// Order indices from oldest to newest.
    pub fn iter<'a>(&self, orders: &'a ObjectPool<Order>) -> LevelIter<'a> {
        LevelIter {
            orders,
            cursor: self.head,
            forward: true,
        }
    }

    /// Order indices from newest to oldest.
    pub fn iter_rev<'a>(&self, orders: &'a ObjectPool<Order>) -> LevelIter<'a> {
        LevelIter {
            orders,
            cursor: self.tail,
            forward: false,
        }
    }
}

/// Walks a level's intrusive list in either direction.
pub struct LevelIter<'a> {
    orders: &'a ObjectPool<Order>,
    cursor: PoolIndex,
    forward: bool,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (PoolIndex, &'a Order);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NULL_INDEX {
            return None;
        }
        let index = self.cursor;
        let order = self.orders.get(index);
        self.cursor = if self.forward { order.next } else { order.prev };
        Some((index, order))
    }
}
