//! Event Log - per-command buffer of output events.
//!
//! Each top-level command starts with an empty log; whatever the command
//! appended is handed back to the caller when it finishes.

use std::fmt;

use serde::Serialize;

use crate::command::{format_price, OrderId, Price, Qty, Side, Symbol};

/// Output events from the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    /// One side of a match
    Fill {
        order_id: OrderId,
        symbol: Symbol,
        qty: Qty,
        price: Price,
    },
    /// A resting order was canceled
    Cancel { order_id: OrderId },
    /// A command was rejected
    Error { message: String },
    /// One resting order in a book snapshot
    BookLine {
        order_id: OrderId,
        symbol: Symbol,
        side: Side,
        qty: Qty,
        price: Price,
    },
}

impl OutputEvent {
    /// Build an error event from anything displayable.
    pub fn error(err: impl fmt::Display) -> Self {
        OutputEvent::Error {
            message: err.to_string(),
        }
    }
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEvent::Fill {
                order_id,
                symbol,
                qty,
                price,
            } => write!(f, "F {order_id} {symbol} {qty} {}", format_price(*price)),
            OutputEvent::Cancel { order_id } => write!(f, "X {order_id}"),
            OutputEvent::Error { message } => write!(f, "E {message}"),
            OutputEvent::BookLine {
                order_id,
                symbol,
                side,
                qty,
                price,
            } => write!(
                f,
                "P {order_id} {symbol} {} {qty} {}",
                side.code(),
                format_price(*price)
            ),
        }
    }
}

/// Append-only event buffer threaded through a single command.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<OutputEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event after everything already logged.
    #[inline]
    pub fn push(&mut self, event: OutputEvent) {
        self.events.push(event);
    }

    /// Drop everything recorded so far.
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Hand the recorded events to the caller, leaving the log empty.
    #[inline]
    pub fn take(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of events recorded since the last clear or take.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over recorded events in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, OutputEvent> {
        self.events.iter()
    }
}
