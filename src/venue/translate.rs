//! Two-way translation tables between the canonical model and venue codes.
//!
//! Forward tables are the single source of truth; reverse lookups walk the
//! same slice so the two directions cannot drift. A miss in either
//! direction is a caller-visible error, never a silent default.

use chrono::Utc;
use rust_decimal::Decimal;
use std::fmt::Debug;

use crate::domain::{
    AccountData, BarData, ContractData, Direction, Exchange, Interval, Offset, OrderData,
    OrderStatus, OrderType, PositionData, Product, TickData, TradeData,
};
use crate::error::{GatewayError, Result};
use crate::venue::{BarRow, CashRow, ExecutionRow, InstrumentRow, OrderRow, PositionRow, TickRow};

/// CNY money precision at the venue boundary
pub const MONEY_DECIMALS: u32 = 2;

const DIRECTION_TABLE: &[(Direction, i32)] = &[(Direction::Long, 1), (Direction::Short, 2)];

const ORDER_TYPE_TABLE: &[(OrderType, i32)] = &[(OrderType::Limit, 0), (OrderType::Market, 2)];

const EXCHANGE_TABLE: &[(Exchange, &str)] = &[(Exchange::Sse, "SHSE"), (Exchange::Szse, "SZSE")];

const OFFSET_TABLE: &[(Offset, i32)] = &[
    (Offset::Open, 1),
    (Offset::Close, 2),
    (Offset::CloseToday, 3),
    (Offset::CloseYesterday, 4),
];

const INTERVAL_TABLE: &[(Interval, &str)] = &[
    (Interval::Minute, "60s"),
    (Interval::Hour, "3600s"),
    (Interval::Daily, "1d"),
];

// Venue order status codes. Codes 5, 6, 9 and 12 are all cancel-family
// states (pending-cancel, cancelled, expired, suspended-cancelled); the
// canonical model folds them into Cancelled.
const STATUS_TABLE: &[(i32, OrderStatus)] = &[
    (1, OrderStatus::NotTraded),
    (2, OrderStatus::PartTraded),
    (3, OrderStatus::AllTraded),
    (5, OrderStatus::Cancelled),
    (6, OrderStatus::Cancelled),
    (8, OrderStatus::Rejected),
    (9, OrderStatus::Cancelled),
    (10, OrderStatus::Submitting),
    (12, OrderStatus::Cancelled),
];

fn forward<K, V>(table: &[(K, V)], key: K, what: &str) -> Result<V>
where
    K: Copy + PartialEq + Debug,
    V: Copy,
{
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or_else(|| GatewayError::UnsupportedValue(format!("{what} {key:?} has no venue mapping")))
}

fn reverse<K, V>(table: &[(K, V)], code: V, what: &str) -> Result<K>
where
    K: Copy,
    V: Copy + PartialEq + Debug,
{
    table
        .iter()
        .find(|(_, v)| *v == code)
        .map(|(k, _)| *k)
        .ok_or_else(|| GatewayError::UnmappableRecord(format!("unknown venue {what} code {code:?}")))
}

pub fn direction_to_venue(direction: Direction) -> Result<i32> {
    forward(DIRECTION_TABLE, direction, "direction")
}

pub fn direction_from_venue(code: i32) -> Result<Direction> {
    reverse(DIRECTION_TABLE, code, "direction")
}

pub fn order_type_to_venue(order_type: OrderType) -> Result<i32> {
    forward(ORDER_TYPE_TABLE, order_type, "order type")
}

pub fn order_type_from_venue(code: i32) -> Result<OrderType> {
    reverse(ORDER_TYPE_TABLE, code, "order type")
}

pub fn exchange_to_venue(exchange: Exchange) -> Result<&'static str> {
    forward(EXCHANGE_TABLE, exchange, "exchange")
}

pub fn exchange_from_venue(code: &str) -> Result<Exchange> {
    reverse(EXCHANGE_TABLE, code, "exchange")
}

pub fn offset_to_venue(offset: Offset) -> Result<i32> {
    forward(OFFSET_TABLE, offset, "offset")
}

pub fn offset_from_venue(code: i32) -> Result<Offset> {
    reverse(OFFSET_TABLE, code, "offset")
}

pub fn interval_to_venue(interval: Interval) -> Result<&'static str> {
    forward(INTERVAL_TABLE, interval, "interval")
}

pub fn status_from_venue(code: i32) -> Result<OrderStatus> {
    STATUS_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
        .ok_or_else(|| GatewayError::UnmappableRecord(format!("unknown venue order status code {code}")))
}

/// Compose a venue-qualified symbol ("SZSE.000333")
pub fn to_venue_symbol(symbol: &str, exchange: Exchange) -> Result<String> {
    Ok(format!("{}.{}", exchange_to_venue(exchange)?, symbol))
}

/// Split a venue-qualified symbol back into canonical parts
pub fn split_venue_symbol(venue_symbol: &str) -> Result<(Exchange, &str)> {
    let (exchange, symbol) = venue_symbol.split_once('.').ok_or_else(|| {
        GatewayError::UnmappableRecord(format!("malformed venue symbol {venue_symbol:?}"))
    })?;
    Ok((exchange_from_venue(exchange)?, symbol))
}

/// Round a money/price field to the venue's canonical precision
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DECIMALS)
}

pub fn contract_from_row(row: &InstrumentRow) -> Result<ContractData> {
    let (exchange, symbol) = split_venue_symbol(&row.symbol)?;
    Ok(ContractData {
        symbol: symbol.to_string(),
        exchange,
        name: row.sec_name.clone(),
        product: Product::Equity,
        size: 1,
        price_tick: row.price_tick,
    })
}

pub fn order_from_row(row: &OrderRow) -> Result<OrderData> {
    let (exchange, symbol) = split_venue_symbol(&row.symbol)?;
    Ok(OrderData {
        symbol: symbol.to_string(),
        exchange,
        order_id: row.cl_ord_id.clone(),
        order_type: order_type_from_venue(row.order_type)?,
        direction: direction_from_venue(row.side)?,
        offset: offset_from_venue(row.position_effect)?,
        price: round_money(row.price),
        volume: row.volume,
        traded: row.filled_volume,
        status: status_from_venue(row.status)?,
        datetime: row.updated_at.with_timezone(&Utc),
    })
}

pub fn trade_from_row(row: &ExecutionRow) -> Result<TradeData> {
    let (exchange, symbol) = split_venue_symbol(&row.symbol)?;
    Ok(TradeData {
        symbol: symbol.to_string(),
        exchange,
        order_id: row.cl_ord_id.clone(),
        trade_id: row.exec_id.clone(),
        direction: direction_from_venue(row.side)?,
        price: round_money(row.price),
        volume: row.volume,
        datetime: row.created_at.with_timezone(&Utc),
    })
}

pub fn position_from_row(row: &PositionRow) -> Result<PositionData> {
    let (exchange, symbol) = split_venue_symbol(&row.symbol)?;
    Ok(PositionData {
        symbol: symbol.to_string(),
        exchange,
        direction: Direction::Net,
        volume: row.volume,
        frozen: row.order_frozen,
        price: round_money(row.vwap),
        pnl: round_money(row.fpnl),
        yd_volume: row.volume - row.volume_today,
    })
}

pub fn account_from_row(row: &CashRow, account_id: &str) -> AccountData {
    AccountData {
        account_id: account_id.to_string(),
        balance: round_money(row.nav),
        frozen: round_money(row.frozen),
        available: round_money(row.available),
    }
}

pub fn tick_from_row(row: &TickRow) -> Result<TickData> {
    let (exchange, symbol) = split_venue_symbol(&row.symbol)?;
    let level1 = row.quotes.first().ok_or_else(|| {
        GatewayError::UnmappableRecord(format!("tick for {} carries no level-1 quote", row.symbol))
    })?;
    Ok(TickData {
        symbol: symbol.to_string(),
        exchange,
        datetime: row.created_at.with_timezone(&Utc),
        last_price: round_money(row.price),
        open_price: round_money(row.open),
        high_price: round_money(row.high),
        low_price: round_money(row.low),
        volume: row.cum_volume,
        turnover: row.cum_amount,
        open_interest: row.cum_position,
        bid_price_1: round_money(level1.bid_p),
        bid_volume_1: level1.bid_v,
        ask_price_1: round_money(level1.ask_p),
        ask_volume_1: level1.ask_v,
    })
}

/// Bars are keyed by the request, not the row: the venue echoes its own
/// symbol spelling back, the canonical record keeps the caller's.
pub fn bar_from_row(row: &BarRow, symbol: &str, exchange: Exchange, interval: Interval) -> BarData {
    BarData {
        symbol: symbol.to_string(),
        exchange,
        interval,
        datetime: row.bob.with_timezone(&Utc),
        open_price: round_money(row.open),
        high_price: round_money(row.high),
        low_price: round_money(row.low),
        close_price: round_money(row.close),
        volume: row.volume,
        turnover: row.amount,
        open_interest: row.position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal_macros::dec;

    #[test]
    fn direction_round_trips() {
        for direction in [Direction::Long, Direction::Short] {
            let code = direction_to_venue(direction).expect("mapped direction");
            assert_eq!(direction_from_venue(code).expect("reverse"), direction);
        }
    }

    #[test]
    fn order_type_round_trips() {
        for order_type in [OrderType::Limit, OrderType::Market] {
            let code = order_type_to_venue(order_type).expect("mapped order type");
            assert_eq!(order_type_from_venue(code).expect("reverse"), order_type);
        }
    }

    #[test]
    fn exchange_round_trips() {
        for exchange in [Exchange::Sse, Exchange::Szse] {
            let code = exchange_to_venue(exchange).expect("mapped exchange");
            assert_eq!(exchange_from_venue(code).expect("reverse"), exchange);
        }
    }

    #[test]
    fn offset_round_trips() {
        for offset in [
            Offset::Open,
            Offset::Close,
            Offset::CloseToday,
            Offset::CloseYesterday,
        ] {
            let code = offset_to_venue(offset).expect("mapped offset");
            assert_eq!(offset_from_venue(code).expect("reverse"), offset);
        }
    }

    #[test]
    fn unmapped_canonical_values_are_rejected() {
        assert!(matches!(
            direction_to_venue(Direction::Net),
            Err(GatewayError::UnsupportedValue(_))
        ));
        assert!(matches!(
            offset_to_venue(Offset::None),
            Err(GatewayError::UnsupportedValue(_))
        ));
        assert!(matches!(
            order_type_to_venue(OrderType::Stop),
            Err(GatewayError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn unknown_venue_codes_are_rejected() {
        assert!(matches!(
            status_from_venue(99),
            Err(GatewayError::UnmappableRecord(_))
        ));
        assert!(matches!(
            direction_from_venue(0),
            Err(GatewayError::UnmappableRecord(_))
        ));
        assert!(matches!(
            exchange_from_venue("NYSE"),
            Err(GatewayError::UnmappableRecord(_))
        ));
    }

    #[test]
    fn cancel_family_status_codes_fold_to_cancelled() {
        for code in [5, 6, 9, 12] {
            assert_eq!(status_from_venue(code).expect("cancel code"), OrderStatus::Cancelled);
        }
        assert_eq!(status_from_venue(10).expect("code 10"), OrderStatus::Submitting);
    }

    #[test]
    fn venue_symbol_round_trips() {
        let venue_symbol = to_venue_symbol("000333", Exchange::Szse).expect("compose");
        assert_eq!(venue_symbol, "SZSE.000333");
        let (exchange, symbol) = split_venue_symbol(&venue_symbol).expect("split");
        assert_eq!(exchange, Exchange::Szse);
        assert_eq!(symbol, "000333");

        assert!(split_venue_symbol("000333").is_err());
        assert!(split_venue_symbol("NASDAQ.AAPL").is_err());
    }

    #[test]
    fn order_row_translates_with_cancel_and_long_codes() {
        let shanghai = FixedOffset::east_opt(8 * 3600).expect("utc+8");
        let row = OrderRow {
            symbol: "SZSE.000333".to_string(),
            cl_ord_id: "GM-42".to_string(),
            order_type: 0,
            side: 1,
            position_effect: 1,
            status: 9,
            price: dec!(52.3456),
            volume: 200,
            filled_volume: 0,
            updated_at: shanghai.with_ymd_and_hms(2024, 3, 8, 10, 15, 0).unwrap(),
        };

        let order = order_from_row(&row).expect("translates");
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.direction, Direction::Long);
        assert_eq!(order.exchange, Exchange::Szse);
        assert_eq!(order.price, dec!(52.35));
        // UTC+8 10:15 is 02:15 UTC
        assert_eq!(order.datetime, Utc.with_ymd_and_hms(2024, 3, 8, 2, 15, 0).unwrap());
    }

    #[test]
    fn position_row_computes_prior_day_volume() {
        let row = PositionRow {
            symbol: "SHSE.600519".to_string(),
            volume: 500,
            volume_today: 100,
            order_frozen: 0,
            vwap: dec!(1700.125),
            fpnl: dec!(-321.005),
        };

        let position = position_from_row(&row).expect("translates");
        assert_eq!(position.yd_volume, 400);
        assert_eq!(position.direction, Direction::Net);
        assert_eq!(position.price, dec!(1700.13));
        assert_eq!(position.pnl, dec!(-321.01));
    }

    #[test]
    fn tick_row_requires_level1_quote() {
        let shanghai = FixedOffset::east_opt(8 * 3600).expect("utc+8");
        let row = TickRow {
            symbol: "SZSE.000333".to_string(),
            open: dec!(50),
            high: dec!(51),
            low: dec!(49),
            price: dec!(50.5),
            cum_volume: 1000,
            cum_amount: dec!(50500),
            cum_position: dec!(0),
            quotes: vec![],
            created_at: shanghai.with_ymd_and_hms(2024, 3, 8, 10, 15, 0).unwrap(),
        };
        assert!(matches!(tick_from_row(&row), Err(GatewayError::UnmappableRecord(_))));
    }
}
