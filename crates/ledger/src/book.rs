use chrono::{DateTime, Utc};
use tracing::info;

use common::{ClosedTrade, Error, OpenTrade, OrderSide, Result};

use crate::round_dp;

/// In-memory view of the trade ledger for one tick (or one manual
/// operation). Loaded from the store, mutated, and written back whole.
///
/// Invariant: at most one open trade per symbol. `close_position` removes
/// the open trade and appends the closed trade in one step, so no caller
/// ever observes a symbol in both collections, or in neither.
#[derive(Debug)]
pub struct TradeLedger {
    open: Vec<OpenTrade>,
    closed: Vec<ClosedTrade>,
}

impl TradeLedger {
    pub fn new(open: Vec<OpenTrade>, closed: Vec<ClosedTrade>) -> Self {
        Self { open, closed }
    }

    pub fn position(&self, symbol: &str) -> Option<&OpenTrade> {
        self.open.iter().find(|t| t.symbol == symbol)
    }

    pub fn open(&self) -> &[OpenTrade] {
        &self.open
    }

    /// Closed trades in chronological (append) order.
    pub fn closed(&self) -> &[ClosedTrade] {
        &self.closed
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Total notional committed to open positions. Recomputed on demand,
    /// never cached.
    pub fn current_exposure(&self) -> f64 {
        self.open.iter().map(|t| t.notional_usdc).sum()
    }

    /// Record a new long position. Fails if a position for the symbol is
    /// already open.
    pub fn open_position(
        &mut self,
        symbol: &str,
        qty: f64,
        entry_price: f64,
        notional_usdc: f64,
    ) -> Result<&OpenTrade> {
        if self.position(symbol).is_some() {
            return Err(Error::DuplicateSymbol(symbol.to_string()));
        }

        let trade = OpenTrade {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            qty,
            entry_price,
            notional_usdc,
            entry_time: Utc::now(),
        };
        info!(
            symbol,
            qty,
            entry_price,
            notional_usdc,
            "Position opened"
        );
        self.open.push(trade);
        Ok(self.open.last().expect("just pushed"))
    }

    /// Settle the open position for `symbol` at `exit_price`. Removes it
    /// from the open set and appends the closed record atomically with
    /// respect to this ledger.
    pub fn close_position(
        &mut self,
        symbol: &str,
        exit_price: f64,
        exit_time: DateTime<Utc>,
    ) -> Result<ClosedTrade> {
        let idx = self
            .open
            .iter()
            .position(|t| t.symbol == symbol)
            .ok_or_else(|| Error::TradeNotFound(symbol.to_string()))?;
        let trade = self.open.remove(idx);

        let diff = match trade.side {
            OrderSide::Buy => exit_price - trade.entry_price,
            OrderSide::Sell => trade.entry_price - exit_price,
        };
        let pnl = diff * trade.qty;
        let duration_sec = (exit_time - trade.entry_time)
            .num_milliseconds()
            .max(0) as f64
            / 1000.0;

        let closed = ClosedTrade {
            id: trade.id,
            symbol: trade.symbol,
            side: trade.side,
            qty: trade.qty,
            entry_price: trade.entry_price,
            exit_price,
            notional_usdc: trade.notional_usdc,
            pnl_usdc: round_dp(pnl, 6),
            pnl_pct: round_dp(pnl / trade.notional_usdc.max(1e-9) * 100.0, 4),
            entry_time: trade.entry_time,
            exit_time,
            duration_sec,
        };
        info!(
            symbol = %closed.symbol,
            exit_price,
            pnl_usdc = closed.pnl_usdc,
            "Position closed"
        );
        self.closed.push(closed.clone());
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_round_trips_pnl() {
        let mut ledger = TradeLedger::new(Vec::new(), Vec::new());
        ledger.open_position("BTCUSDC", 0.25, 100.0, 25.0).unwrap();
        assert_eq!(ledger.open_count(), 1);
        assert_eq!(ledger.current_exposure(), 25.0);

        let closed = ledger
            .close_position("BTCUSDC", 110.0, Utc::now())
            .unwrap();
        assert!((closed.pnl_usdc - 2.5).abs() < 1e-9);
        assert!((closed.pnl_pct - 10.0).abs() < 1e-9);
        assert_eq!(ledger.open_count(), 0);
        assert_eq!(ledger.closed().len(), 1);
        assert_eq!(ledger.current_exposure(), 0.0);
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let mut ledger = TradeLedger::new(Vec::new(), Vec::new());
        ledger.open_position("ETHUSDC", 1.0, 10.0, 10.0).unwrap();
        let err = ledger
            .open_position("ETHUSDC", 2.0, 11.0, 22.0)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSymbol(s) if s == "ETHUSDC"));
        assert_eq!(ledger.open_count(), 1);
    }

    #[test]
    fn closing_an_unknown_symbol_is_not_found() {
        let mut ledger = TradeLedger::new(Vec::new(), Vec::new());
        let err = ledger
            .close_position("SOLUSDC", 50.0, Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::TradeNotFound(s) if s == "SOLUSDC"));
    }

    #[test]
    fn close_is_atomic_never_both_or_neither_mid_history() {
        let mut ledger = TradeLedger::new(Vec::new(), Vec::new());
        ledger.open_position("BTCUSDC", 1.0, 100.0, 100.0).unwrap();
        ledger.open_position("ETHUSDC", 1.0, 10.0, 10.0).unwrap();

        ledger.close_position("BTCUSDC", 90.0, Utc::now()).unwrap();

        assert!(ledger.position("BTCUSDC").is_none());
        assert_eq!(ledger.closed().len(), 1);
        assert_eq!(ledger.closed()[0].symbol, "BTCUSDC");
        // the sibling position is untouched
        assert!(ledger.position("ETHUSDC").is_some());
        assert_eq!(ledger.current_exposure(), 10.0);
    }

    #[test]
    fn duration_is_non_negative_seconds() {
        let mut ledger = TradeLedger::new(Vec::new(), Vec::new());
        ledger.open_position("BTCUSDC", 1.0, 100.0, 100.0).unwrap();
        let entry_time = ledger.position("BTCUSDC").unwrap().entry_time;
        let closed = ledger
            .close_position("BTCUSDC", 100.0, entry_time + chrono::Duration::seconds(90))
            .unwrap();
        assert_eq!(closed.duration_sec, 90.0);
        assert_eq!(closed.pnl_usdc, 0.0);
    }
}
