//! Engine - top-level command dispatch.
//!
//! Wraps the order book manager with the per-command event log and the
//! text front end. One command runs to completion before the next.

use tracing::{error, trace};

use crate::command::{Command, Price, Symbol};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::{EventLog, OutputEvent};
use crate::manager::OrderBookManager;
use crate::parser;

/// The crossing engine.
pub struct Engine {
    /// The underlying book manager
    pub manager: OrderBookManager,
    /// Result buffer, reset at the start of every command
    log: EventLog,
}

impl Engine {
    /// Create a new engine with the given pool sizing.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            manager: OrderBookManager::with_config(&config)?,
            log: EventLog::new(),
        })
    }

    /// Process a single command and return its output events.
    ///
    /// This is the main entry point for synchronous usage (testing, benchmarks).
    pub fn process_command(&mut self, cmd: Command) -> Result<Vec<OutputEvent>, EngineError> {
        self.log.clear();
        trace!(?cmd, "processing command");

        match cmd {
            Command::New(order) => {
                if let Err(err) = self.manager.submit(
                    order.order_id,
                    order.symbol,
                    order.side,
                    order.qty,
                    order.price,
                    &mut self.log,
                ) {
                    error!(order_id = order.order_id, %err, "order pool exhausted");
                    return Err(err.into());
                }
            }
            Command::Cancel(cancel) => self.manager.cancel(cancel.order_id, &mut self.log),
            Command::Snapshot => self.manager.snapshot_all(&mut self.log),
        }

        Ok(self.log.take())
    }

    /// Parse and process one action line.
    ///
    /// Malformed lines, blank ones included, produce a single error event.
    pub fn process_line(&mut self, line: &str) -> Result<Vec<OutputEvent>, EngineError> {
        match parser::parse_line(line) {
            Ok(cmd) => self.process_command(cmd),
            Err(err) => {
                trace!(%err, line, "rejecting malformed line");
                Ok(vec![OutputEvent::error(err)])
            }
        }
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Best bid for `symbol`.
    #[inline]
    pub fn best_bid(&self, symbol: Symbol) -> Option<Price> {
        self.manager.book(symbol).and_then(|b| b.best_bid())
    }

    /// Best ask for `symbol`.
    #[inline]
    pub fn best_ask(&self, symbol: Symbol) -> Option<Price> {
        self.manager.book(symbol).and_then(|b| b.best_ask())
    }

    /// Total resident orders across all symbols.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.manager.order_count()
    }

    /// Compute a hash of the current state (for determinism testing)
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        let mut books: Vec<_> = self.manager.books().collect();
        books.sort_unstable_by_key(|b| b.symbol());
        for book in books {
            book.symbol().hash(&mut hasher);
            book.best_bid().hash(&mut hasher);
            book.best_ask().hash(&mut hasher);
            book.order_count().hash(&mut hasher);
        }

        self.manager.order_count().hash(&mut hasher);
        self.manager.pool_usage().0.hash(&mut hasher);

        hasher.finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            manager: OrderBookManager::new(),
            log: EventLog::new(),
        }
    }
}
