//! # Simple-Cross
//!
//! A deterministic limit order book crossing engine for many symbols.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One thread owns every book exclusively (no locks)
//! - **Price-Time Priority**: Best price first, then first come first served
//! - **Pooled Storage**: Orders and price levels live in batch-grown pools
//! - **Index Handles**: 32-bit pool indices instead of pointers, so an
//!   order's position in its level stays valid for O(1) cancel
//!
//! ## Architecture
//!
//! ```text
//! [Action line] --> [Parser] --> [Engine] --> [OrderBookManager] --> [OrderBook per symbol]
//!                                    |
//!                              [EventLog] --> F / X / E / P lines
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod manager;
mod matching;
pub mod order;
pub mod order_book;
pub mod parser;
pub mod pool;
pub mod price_level;

// Re-exports for convenience
pub use command::{
    format_price, CancelOrder, Command, NewOrder, OrderId, Price, Qty, Side, Symbol,
    PRICE_MULTIPLIER,
};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, OrderError, ParseError, PoolError};
pub use event::{EventLog, OutputEvent};
pub use manager::OrderBookManager;
pub use order::Order;
pub use order_book::OrderBook;
pub use pool::{ObjectPool, PoolIndex, NULL_INDEX};
pub use price_level::PriceLevel;
