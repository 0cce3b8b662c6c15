//! Command types and scalar domain types for the crossing engine.
//!
//! Commands arrive already validated by the parser: quantity and price
//! are strictly positive.

use std::fmt;

use serde::{Serialize, Serializer};

/// Client-assigned order identifier.
pub type OrderId = u32;

/// Order quantity.
pub type Qty = u16;

/// Fixed-point price (e.g., 1.00005 -> 100005).
pub type Price = u64;

/// Fixed-point scale: five fractional digits.
pub const PRICE_MULTIPLIER: u64 = 100_000;

/// Number of fractional digits carried by [`Price`].
pub const PRICE_DECIMALS: u32 = 5;

/// Maximum symbol length in bytes.
pub const MAX_SYMBOL_LEN: usize = 8;

/// Render a fixed-point price with five fractional digits.
pub fn format_price(price: Price) -> String {
    format!(
        "{}.{:0width$}",
        price / PRICE_MULTIPLIER,
        price % PRICE_MULTIPLIER,
        width = PRICE_DECIMALS as usize
    )
}

/// Order side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Buy = 0,
    /// Sell side (asks)
    Sell = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// True if `limit` is at least as aggressive as `resting` for this side.
    ///
    /// A buyer crosses any ask at or below its limit; a seller crosses
    /// any bid at or above it.
    #[inline]
    pub const fn is_marketable(self, limit: Price, resting: Price) -> bool {
        match self {
            Side::Buy => limit >= resting,
            Side::Sell => limit <= resting,
        }
    }

    /// Single-letter code used on the wire (`B` / `S`).
    #[inline]
    pub const fn code(self) -> char {
        match self {
            Side::Buy => 'B',
            Side::Sell => 'S',
        }
    }
}

/// Fixed-width, zero-padded instrument symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Symbol([u8; MAX_SYMBOL_LEN]);

impl Symbol {
    /// Build a symbol from text. Returns `None` if empty, too long, or
    /// containing a NUL byte.
    pub fn new(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.is_empty() || bytes.len() > MAX_SYMBOL_LEN || bytes.contains(&0) {
            return None;
        }
        let mut padded = [0u8; MAX_SYMBOL_LEN];
        padded[..bytes.len()].copy_from_slice(bytes);
        Some(Self(padded))
    }

    /// The padded bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; MAX_SYMBOL_LEN] {
        &self.0
    }

    /// The symbol text without padding.
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(MAX_SYMBOL_LEN);
        std::str::from_utf8(&self.0[..len]).unwrap_or("")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Input Commands
// ============================================================================

/// Place a new limit order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewOrder {
    /// Client-assigned order id
    pub order_id: OrderId,
    /// Instrument
    pub symbol: Symbol,
    /// Order side
    pub side: Side,
    /// Order quantity (> 0)
    pub qty: Qty,
    /// Fixed-point limit price (> 0)
    pub price: Price,
}

/// Cancel a resting order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancelOrder {
    /// Order id to cancel
    pub order_id: OrderId,
}

/// Input commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Place a new limit order
    New(NewOrder),
    /// Cancel a resting order
    Cancel(CancelOrder),
    /// Print every book
    Snapshot,
}
