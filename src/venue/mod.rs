//! Venue boundary: wire-shaped rows, the `VenueApi` port every gateway
//! component talks through, and the push-callback registration interface.

pub mod gm_rest;
pub mod translate;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;

pub use gm_rest::GmRestClient;

/// Instrument row as the venue reports it. `symbol` is venue-qualified
/// ("SZSE.000333").
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentRow {
    pub symbol: String,
    pub sec_name: String,
    /// 1 = equity; other security types are skipped
    pub sec_type: i32,
    pub price_tick: Decimal,
}

/// Order row, from snapshots and order-status pushes
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub symbol: String,
    pub cl_ord_id: String,
    pub order_type: i32,
    pub side: i32,
    pub position_effect: i32,
    pub status: i32,
    pub price: Decimal,
    pub volume: u64,
    pub filled_volume: u64,
    pub updated_at: DateTime<FixedOffset>,
}

/// Execution report row
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionRow {
    pub symbol: String,
    pub cl_ord_id: String,
    pub exec_id: String,
    pub side: i32,
    pub price: Decimal,
    pub volume: u64,
    pub created_at: DateTime<FixedOffset>,
}

/// Position row
#[derive(Debug, Clone, Deserialize)]
pub struct PositionRow {
    pub symbol: String,
    pub volume: i64,
    pub volume_today: i64,
    pub order_frozen: i64,
    /// Volume-weighted average entry price
    pub vwap: Decimal,
    /// Floating pnl
    pub fpnl: Decimal,
}

/// Account cash row
#[derive(Debug, Clone, Deserialize)]
pub struct CashRow {
    pub nav: Decimal,
    pub frozen: Decimal,
    pub available: Decimal,
}

/// Level-1 quote attached to a tick row
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteLevel {
    pub bid_p: Decimal,
    pub bid_v: u64,
    pub ask_p: Decimal,
    pub ask_v: u64,
}

/// Tick row, from quote snapshots, tick pushes and tick history
#[derive(Debug, Clone, Deserialize)]
pub struct TickRow {
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub price: Decimal,
    pub cum_volume: u64,
    pub cum_amount: Decimal,
    pub cum_position: Decimal,
    pub quotes: Vec<QuoteLevel>,
    pub created_at: DateTime<FixedOffset>,
}

/// Bar row from bar history
#[derive(Debug, Clone, Deserialize)]
pub struct BarRow {
    pub symbol: String,
    pub open: Decimal,
    pub close: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub volume: u64,
    pub amount: Decimal,
    pub position: Decimal,
    /// Beginning of bar
    pub bob: DateTime<FixedOffset>,
}

/// Outbound order in venue terms, produced by the translation tables
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewOrder {
    pub symbol: String,
    pub volume: u64,
    pub side: i32,
    pub order_type: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub position_effect: i32,
    pub account: String,
}

/// Push callbacks delivered from the venue's own dispatch context.
///
/// Implementations must only translate and emit: calling back into
/// [`VenueApi`] from a handler can deadlock against the venue's dispatch
/// thread. Consumers needing venue data during a push must hand off to
/// their own task.
pub trait VenuePushHandler: Send + Sync {
    fn on_trade_connected(&self) {}
    fn on_trade_disconnected(&self) {}
    fn on_order_status(&self, order: OrderRow);
    fn on_execution_report(&self, report: ExecutionRow);
    fn on_tick(&self, tick: TickRow);
    fn on_venue_error(&self, code: i32, message: &str);
}

/// The venue SDK surface. Connection management, session state and push
/// delivery are owned by the implementation; the gateway only shapes data
/// crossing this boundary. Every call may fail and callers must degrade
/// accordingly.
#[async_trait]
pub trait VenueApi: Send + Sync {
    async fn login(&self, token: &str, endpoint: &str, account_id: &str) -> Result<()>;

    async fn logout(&self) -> Result<()>;

    /// Register the push handler for this session. Replaces any previously
    /// registered handler.
    fn register_push(&self, handler: Arc<dyn VenuePushHandler>);

    async fn instruments(&self, exchanges: &[String]) -> Result<Vec<InstrumentRow>>;

    async fn open_orders(&self) -> Result<Vec<OrderRow>>;

    async fn execution_reports(&self) -> Result<Vec<ExecutionRow>>;

    /// Place an order, returning the venue-assigned client order id.
    async fn place_order(&self, order: NewOrder) -> Result<String>;

    /// Cancel by id. Fire-and-forget: confirmation arrives via push or the
    /// next status poll.
    async fn cancel_order(&self, cl_ord_id: &str) -> Result<()>;

    async fn positions(&self) -> Result<Vec<PositionRow>>;

    async fn cash(&self) -> Result<CashRow>;

    async fn subscribe_quotes(&self, venue_symbol: &str) -> Result<()>;

    async fn snapshot_quotes(&self, venue_symbols: &[String]) -> Result<Vec<TickRow>>;

    async fn history_bars(
        &self,
        venue_symbol: &str,
        frequency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BarRow>>;

    async fn history_ticks(
        &self,
        venue_symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TickRow>>;
}
