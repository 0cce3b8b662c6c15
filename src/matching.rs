//! Matching - crossing an incoming order against the opposite side.
//!
//! The walk takes the most aggressive opposing level, trades against its
//! FIFO head until either the incoming order is done or the level is
//! empty, then moves on. It stops as soon as the best opposing price is
//! worse than the incoming limit.

use tracing::trace;

use crate::command::{Price, Side};
use crate::event::{EventLog, OutputEvent};
use crate::order::{Order, OrderIndex};
use crate::order_book::OrderBook;
use crate::pool::{ObjectPool, PoolIndex, NULL_INDEX};

impl OrderBook {
    /// Cross `incoming` against the side opposite to `side`.
    ///
    /// Every trade emits two fills at the resting order's price: first
    /// for the incoming order, then for the resting one. Resting orders
    /// that reach zero are unlinked, released to the pool and evicted
    /// from `index`. The incoming order's quantity is updated in place;
    /// it is never rested here.
    pub fn match_order(
        &mut self,
        orders: &mut ObjectPool<Order>,
        incoming: PoolIndex,
        limit: Price,
        side: Side,
        index: &mut OrderIndex,
        log: &mut EventLog,
    ) {
        let maker_side = side.opposite();

        while orders.get(incoming).qty > 0 {
            let Some(level_idx) = self.best_level(maker_side) else {
                break; // No orders on opposite side
            };

            let level_price = self.levels.get(level_idx).price;
            if !side.is_marketable(limit, level_price) {
                break;
            }

            self.match_at_level(orders, incoming, level_idx, index, log);
        }
    }

    /// Trade against one level until it or the incoming order is exhausted.
    fn match_at_level(
        &mut self,
        orders: &mut ObjectPool<Order>,
        incoming: PoolIndex,
        level_idx: PoolIndex,
        index: &mut OrderIndex,
        log: &mut EventLog,
    ) {
        let level = self.levels.get(level_idx);
        let price = level.price;
        let mut maker_idx = level.peek_head();

        loop {
            let remaining = orders.get(incoming).qty;
            if remaining == 0 || maker_idx == NULL_INDEX {
                break;
            }

            let maker = orders.get(maker_idx);
            let maker_order_id = maker.order_id;
            let maker_qty = maker.qty;
            let next_maker = maker.next;

            let fill_qty = remaining.min(maker_qty);

            let taker = orders.get_mut(incoming);
            taker.qty -= fill_qty;
            let taker_order_id = taker.order_id;

            orders.get_mut(maker_idx).qty = maker_qty - fill_qty;
            self.levels.get_mut(level_idx).subtract_qty(fill_qty);

            trace!(
                symbol = %self.symbol(),
                taker = taker_order_id,
                maker = maker_order_id,
                qty = fill_qty,
                price,
                "fill"
            );
            log.push(OutputEvent::Fill {
                order_id: taker_order_id,
                symbol: self.symbol(),
                qty: fill_qty,
                price,
            });
            log.push(OutputEvent::Fill {
                order_id: maker_order_id,
                symbol: self.symbol(),
                qty: fill_qty,
                price,
            });

            if maker_qty == fill_qty {
                // Maker fully filled; this may also retire the level
                self.remove(orders, maker_idx);
                orders.release(maker_idx);
                index.remove(&maker_order_id);
                maker_idx = next_maker;
            }
        }
    }
}
