use tokio::sync::mpsc;
use tracing::debug;

use super::{AccountData, ContractData, OrderData, PositionData, TickData, TradeData};

/// Canonical events emitted toward the host platform. Consumers must treat
/// them as idempotent snapshots: the push path and the reconciliation poller
/// may both report the same state change.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Contract(ContractData),
    Order(OrderData),
    Trade(TradeData),
    Position(PositionData),
    Account(AccountData),
    Tick(TickData),
    Log(String),
}

/// Cloneable sender half of the host event channel.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<GatewayEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GatewayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: GatewayEvent) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped, discarding event");
        }
    }

    pub fn on_contract(&self, contract: ContractData) {
        self.emit(GatewayEvent::Contract(contract));
    }

    pub fn on_order(&self, order: OrderData) {
        self.emit(GatewayEvent::Order(order));
    }

    pub fn on_trade(&self, trade: TradeData) {
        self.emit(GatewayEvent::Trade(trade));
    }

    pub fn on_position(&self, position: PositionData) {
        self.emit(GatewayEvent::Position(position));
    }

    pub fn on_account(&self, account: AccountData) {
        self.emit(GatewayEvent::Account(account));
    }

    pub fn on_tick(&self, tick: TickData) {
        self.emit(GatewayEvent::Tick(tick));
    }

    /// Free-text diagnostic line toward the host's log sink.
    pub fn write_log(&self, message: impl Into<String>) {
        self.emit(GatewayEvent::Log(message.into()));
    }
}
