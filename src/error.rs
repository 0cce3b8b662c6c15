//! Error types for the crossing engine.
//!
//! Order and parse errors are recoverable: the engine turns them into
//! `E` events and carries on. Pool errors are fatal for the command and
//! propagate to the caller.

use thiserror::Error;

use crate::command::OrderId;

/// The object pool could not reserve more storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Growing the pool by `requested` slots failed.
    #[error("object pool allocation failed while reserving {requested} slots")]
    AllocationFailed { requested: usize },
}

/// Order-entry rejections raised by the order book manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// An order with this id is already resident.
    #[error("{0} Duplicate order id")]
    DuplicateOrderId(OrderId),

    /// No resident order has this id.
    #[error("{0} Order not found")]
    OrderNotFound(OrderId),
}

/// Malformed action lines. `id` holds the raw order-id token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{id} Invalid number of arguments")]
    ArgumentCount { id: String },

    #[error("{id} Invalid order id")]
    OrderId { id: String },

    #[error("{id} Invalid symbol: {token}")]
    Symbol { id: String, token: String },

    #[error("{id} Invalid side: {token}")]
    Side { id: String, token: String },

    #[error("{id} Invalid qty: {token}")]
    Quantity { id: String, token: String },

    #[error("{id} Invalid prc: {token}")]
    Price { id: String, token: String },

    #[error("{action} Invalid action")]
    Action { action: String },
}

/// Fatal engine failure; book invariants are not guaranteed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Pool(#[from] PoolError),
}
