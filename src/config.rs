//! Engine configuration.

use serde::Deserialize;

/// Sizing knobs for the engine's pools.
///
/// Reservations only move allocation out of the hot path; the pools
/// still grow on demand past these numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Order slots reserved up front
    pub order_reserve: usize,
    /// Price-level slots reserved for each new book
    pub level_reserve: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_reserve: 1024,
            level_reserve: 128,
        }
    }
}
