//! Gateway core: connect/close lifecycle, host-facing commands, snapshot
//! ingestion and the push bridge.

pub mod poller;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::config::ConnectConfig;
use crate::domain::{CancelRequest, ContractData, EventSink, OrderRequest, SubscribeRequest};
use crate::error::{GatewayError, Result};
use crate::venue::translate::{
    account_from_row, contract_from_row, direction_to_venue, offset_to_venue, order_from_row,
    order_type_to_venue, position_from_row, tick_from_row, to_venue_symbol, trade_from_row,
};
use crate::venue::{ExecutionRow, NewOrder, OrderRow, TickRow, VenueApi, VenuePushHandler};

pub use poller::{PollerConfig, PollerHandle};

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Active,
}

/// Contract metadata cache, owned per gateway instance and injected into
/// whoever needs it. Populated wholesale at connect, reset on reconnect.
pub type ContractCache = Arc<RwLock<HashMap<String, ContractData>>>;

/// Venue-qualified symbols with a live quote subscription
pub type SubscriptionSet = Arc<RwLock<HashSet<String>>>;

/// Gateway between the host platform's canonical model and the GM venue.
pub struct GmGateway {
    venue: Arc<dyn VenueApi>,
    events: EventSink,
    contracts: ContractCache,
    subscribed: SubscriptionSet,
    state: RwLock<ConnState>,
    account_id: RwLock<String>,
    poller_config: PollerConfig,
    poller: Mutex<Option<PollerHandle>>,
}

impl GmGateway {
    pub fn new(venue: Arc<dyn VenueApi>, events: EventSink, poller_config: PollerConfig) -> Self {
        Self {
            venue,
            events,
            contracts: Arc::new(RwLock::new(HashMap::new())),
            subscribed: Arc::new(RwLock::new(HashSet::new())),
            state: RwLock::new(ConnState::Disconnected),
            account_id: RwLock::new(String::new()),
            poller_config,
            poller: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> ConnState {
        *self.state.read().await
    }

    pub fn contracts(&self) -> ContractCache {
        self.contracts.clone()
    }

    /// Connect and activate the session. Idempotent while active: a second
    /// call logs a notice and performs no side effects. On any failure the
    /// state rolls back to `Disconnected`; the gateway never partially
    /// activates.
    pub async fn connect(&self, config: &ConnectConfig) -> Result<()> {
        config.validate()?;

        {
            let mut state = self.state.write().await;
            match *state {
                ConnState::Active => {
                    self.events.write_log("GM session already initialized, connect ignored");
                    return Ok(());
                }
                ConnState::Connecting => {
                    self.events.write_log("GM connect already in progress");
                    return Ok(());
                }
                ConnState::Disconnected => *state = ConnState::Connecting,
            }
        }

        match self.establish(config).await {
            Ok(()) => {
                let handle = poller::spawn(
                    self.venue.clone(),
                    self.events.clone(),
                    self.subscribed.clone(),
                    config.account_id.clone(),
                    self.poller_config.clone(),
                );
                *self.poller.lock().await = Some(handle);
                *self.state.write().await = ConnState::Active;
                self.events.write_log("GM session active");
                Ok(())
            }
            Err(e) => {
                *self.state.write().await = ConnState::Disconnected;
                self.events.write_log(format!("GM connect failed: {e}"));
                Err(e)
            }
        }
    }

    async fn establish(&self, config: &ConnectConfig) -> Result<()> {
        *self.account_id.write().await = config.account_id.clone();

        self.venue.register_push(Arc::new(PushBridge {
            events: self.events.clone(),
        }));

        self.venue
            .login(&config.token, &config.endpoint, &config.account_id)
            .await?;
        self.events.write_log("GM login complete");

        // Caches must be in place before the gateway accepts commands that
        // depend on them, so the snapshot sequence runs inside connect.
        self.load_contracts().await?;
        self.load_order_snapshot().await?;
        self.load_trade_snapshot().await?;
        Ok(())
    }

    async fn load_contracts(&self) -> Result<()> {
        let exchanges = vec!["SHSE".to_string(), "SZSE".to_string()];
        let rows = self.venue.instruments(&exchanges).await?;

        let mut loaded = 0usize;
        {
            let mut contracts = self.contracts.write().await;
            contracts.clear();
            for row in &rows {
                if row.sec_type != 1 {
                    continue;
                }
                match contract_from_row(row) {
                    Ok(contract) => {
                        contracts.insert(contract.symbol.clone(), contract.clone());
                        self.events.on_contract(contract);
                        loaded += 1;
                    }
                    Err(e) => warn!("instrument row skipped: {e}"),
                }
            }
        }

        self.events.write_log(format!("contract catalog loaded: {loaded} instruments"));
        Ok(())
    }

    async fn load_order_snapshot(&self) -> Result<()> {
        let rows = self.venue.open_orders().await?;
        for row in &rows {
            match order_from_row(row) {
                Ok(order) => self.events.on_order(order),
                Err(e) => warn!("order row skipped: {e}"),
            }
        }
        self.events.write_log("order snapshot loaded");
        Ok(())
    }

    async fn load_trade_snapshot(&self) -> Result<()> {
        let rows = self.venue.execution_reports().await?;
        for row in &rows {
            match trade_from_row(row) {
                Ok(trade) => self.events.on_trade(trade),
                Err(e) => warn!("execution row skipped: {e}"),
            }
        }
        self.events.write_log("execution snapshot loaded");
        Ok(())
    }

    /// Subscribe realtime quotes. Unknown symbols are an explicit error;
    /// re-subscribing an already subscribed symbol is a no-op with zero
    /// venue calls.
    pub async fn subscribe(&self, req: &SubscribeRequest) -> Result<()> {
        if !self.contracts.read().await.contains_key(&req.symbol) {
            return Err(GatewayError::UnsupportedValue(format!(
                "unknown symbol {} on {}",
                req.symbol, req.exchange
            )));
        }

        let venue_symbol = to_venue_symbol(&req.symbol, req.exchange)?;
        if self.subscribed.read().await.contains(&venue_symbol) {
            return Ok(());
        }

        self.venue.subscribe_quotes(&venue_symbol).await?;
        self.subscribed.write().await.insert(venue_symbol);
        Ok(())
    }

    /// Send an order. All translation-table lookups run before any venue
    /// call: an unsupported offset/type/exchange/direction rejects the
    /// request without a partial submission. On success a `Submitting`
    /// order is emitted to the host before returning the venue order id.
    pub async fn send_order(&self, req: &OrderRequest) -> Result<String> {
        let position_effect = offset_to_venue(req.offset).map_err(|e| self.reject(e))?;
        let order_type = order_type_to_venue(req.order_type).map_err(|e| self.reject(e))?;
        let side = direction_to_venue(req.direction).map_err(|e| self.reject(e))?;
        let symbol = to_venue_symbol(&req.symbol, req.exchange).map_err(|e| self.reject(e))?;

        let order = NewOrder {
            symbol,
            volume: req.volume,
            side,
            order_type,
            price: req.price,
            position_effect,
            account: self.account_id.read().await.clone(),
        };

        let order_id = self.venue.place_order(order).await?;
        self.events.on_order(req.create_order_data(order_id.clone()));
        Ok(order_id)
    }

    fn reject(&self, e: GatewayError) -> GatewayError {
        self.events.write_log(format!("order rejected: {e}"));
        e
    }

    /// Cancel by order id. Does not wait for confirmation; the cancel shows
    /// up through push or the next status poll.
    pub async fn cancel_order(&self, req: &CancelRequest) -> Result<()> {
        self.venue.cancel_order(&req.order_id).await
    }

    /// Pull a full position snapshot and emit it toward the host.
    pub async fn query_position(&self) -> Result<()> {
        poll_positions(&self.venue, &self.events).await
    }

    /// Pull a full account snapshot and emit it toward the host.
    pub async fn query_account(&self) -> Result<()> {
        let account_id = self.account_id.read().await.clone();
        poll_account(&self.venue, &self.events, &account_id).await
    }

    /// Close the session: stop the poller (joining its task) before the
    /// venue logout so no poll can race a released session. Safe to call
    /// more than once.
    pub async fn close(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state == ConnState::Disconnected {
                return Ok(());
            }
            *state = ConnState::Disconnected;
        }

        if let Some(handle) = self.poller.lock().await.take() {
            handle.shutdown().await;
        }

        if let Err(e) = self.venue.logout().await {
            self.events.write_log(format!("GM logout failed: {e}"));
        }
        self.events.write_log("GM session closed");
        Ok(())
    }
}

/// Bridges venue push callbacks into canonical events. Bound to the gateway
/// instance through its event sink; holds no venue handle, so handlers can
/// never call back into the venue from its own dispatch context.
struct PushBridge {
    events: EventSink,
}

impl VenuePushHandler for PushBridge {
    fn on_trade_connected(&self) {
        self.events.write_log("trade service connected");
    }

    fn on_trade_disconnected(&self) {
        self.events.write_log("trade service disconnected");
    }

    fn on_order_status(&self, row: OrderRow) {
        match order_from_row(&row) {
            Ok(order) => self.events.on_order(order),
            Err(e) => warn!("order push skipped: {e}"),
        }
    }

    fn on_execution_report(&self, row: ExecutionRow) {
        match trade_from_row(&row) {
            Ok(trade) => self.events.on_trade(trade),
            Err(e) => warn!("execution push skipped: {e}"),
        }
    }

    fn on_tick(&self, row: TickRow) {
        match tick_from_row(&row) {
            Ok(tick) => self.events.on_tick(tick),
            Err(e) => warn!("tick push skipped: {e}"),
        }
    }

    fn on_venue_error(&self, code: i32, message: &str) {
        self.events.write_log(format!("venue error {code}: {message}"));
    }
}

pub(crate) async fn poll_positions(venue: &Arc<dyn VenueApi>, events: &EventSink) -> Result<()> {
    let rows = venue.positions().await?;
    for row in &rows {
        match position_from_row(row) {
            Ok(position) => events.on_position(position),
            Err(e) => warn!("position row skipped: {e}"),
        }
    }
    Ok(())
}

pub(crate) async fn poll_account(
    venue: &Arc<dyn VenueApi>,
    events: &EventSink,
    account_id: &str,
) -> Result<()> {
    let row = venue.cash().await?;
    events.on_account(account_from_row(&row, account_id));
    Ok(())
}

pub(crate) async fn refresh_quotes(
    venue: &Arc<dyn VenueApi>,
    events: &EventSink,
    subscribed: &SubscriptionSet,
) -> Result<()> {
    let symbols: Vec<String> = {
        let guard = subscribed.read().await;
        guard.iter().cloned().collect()
    };
    if symbols.is_empty() {
        return Ok(());
    }

    let rows = venue.snapshot_quotes(&symbols).await?;
    for row in &rows {
        match tick_from_row(row) {
            Ok(tick) => events.on_tick(tick),
            Err(e) => warn!("quote row skipped: {e}"),
        }
    }
    Ok(())
}
