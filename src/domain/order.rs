use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Exchange;

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    /// Net direction, only reported on position snapshots
    Net,
}

/// Position effect: whether the order opens a new position or closes an
/// existing one (today vs. prior-day lots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Offset {
    /// No effect chosen by the caller; never accepted by the venue
    None,
    Open,
    Close,
    CloseToday,
    CloseYesterday,
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    /// Fill And Kill
    Fak,
    /// Fill Or Kill
    Fok,
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted locally, awaiting venue confirmation
    Submitting,
    /// Live at the venue, nothing filled yet
    NotTraded,
    /// Partially filled
    PartTraded,
    /// Fully filled
    AllTraded,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Submitting | OrderStatus::NotTraded | OrderStatus::PartTraded
        )
    }
}

/// Order intent from the host platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub exchange: Exchange,
    pub direction: Direction,
    pub order_type: OrderType,
    pub offset: Offset,
    pub price: Decimal,
    pub volume: u64,
    /// Free-text reference set by the caller
    pub reference: String,
}

impl OrderRequest {
    /// Limit order with a generated local reference
    pub fn limit(
        symbol: String,
        exchange: Exchange,
        direction: Direction,
        offset: Offset,
        price: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            symbol,
            exchange,
            direction,
            order_type: OrderType::Limit,
            offset,
            price,
            volume,
            reference: Uuid::new_v4().to_string(),
        }
    }

    /// Canonical order record for a freshly accepted request
    pub fn create_order_data(&self, order_id: String) -> OrderData {
        OrderData {
            symbol: self.symbol.clone(),
            exchange: self.exchange,
            order_id,
            order_type: self.order_type,
            direction: self.direction,
            offset: self.offset,
            price: self.price,
            volume: self.volume,
            traded: 0,
            status: OrderStatus::Submitting,
            datetime: Utc::now(),
        }
    }
}

/// Request to cancel an existing order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub order_id: String,
    pub symbol: String,
    pub exchange: Exchange,
}

/// Tracked order state as reported by the venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderData {
    pub symbol: String,
    pub exchange: Exchange,
    pub order_id: String,
    pub order_type: OrderType,
    pub direction: Direction,
    pub offset: Offset,
    pub price: Decimal,
    pub volume: u64,
    pub traded: u64,
    pub status: OrderStatus,
    pub datetime: DateTime<Utc>,
}

/// Immutable execution record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeData {
    pub symbol: String,
    pub exchange: Exchange,
    pub order_id: String,
    pub trade_id: String,
    pub direction: Direction,
    pub price: Decimal,
    pub volume: u64,
    pub datetime: DateTime<Utc>,
}

/// Venue-reported position snapshot, fully replaced on each poll cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionData {
    pub symbol: String,
    pub exchange: Exchange,
    pub direction: Direction,
    pub volume: i64,
    pub frozen: i64,
    pub price: Decimal,
    pub pnl: Decimal,
    /// Prior-day lots still held
    pub yd_volume: i64,
}

/// Venue-reported account snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    pub account_id: String,
    pub balance: Decimal,
    pub frozen: Decimal,
    pub available: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_data_from_request_starts_submitting() {
        let req = OrderRequest {
            symbol: "600519".to_string(),
            exchange: Exchange::Sse,
            direction: Direction::Long,
            order_type: OrderType::Limit,
            offset: Offset::Open,
            price: dec!(1720.50),
            volume: 100,
            reference: "demo".to_string(),
        };

        let order = req.create_order_data("GM-1".to_string());
        assert_eq!(order.status, OrderStatus::Submitting);
        assert_eq!(order.order_id, "GM-1");
        assert_eq!(order.traded, 0);
        assert_eq!(order.volume, 100);
    }

    #[test]
    fn status_activity() {
        assert!(OrderStatus::Submitting.is_active());
        assert!(OrderStatus::PartTraded.is_active());
        assert!(!OrderStatus::AllTraded.is_active());
        assert!(!OrderStatus::Cancelled.is_active());
        assert!(!OrderStatus::Rejected.is_active());
    }
}
