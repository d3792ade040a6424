use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Exchanges reachable through this gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// Shanghai Stock Exchange
    Sse,
    /// Shenzhen Stock Exchange
    Szse,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sse => "SSE",
            Self::Szse => "SZSE",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SSE" => Ok(Self::Sse),
            "SZSE" => Ok(Self::Szse),
            _ => Err("invalid exchange; expected SSE|SZSE"),
        }
    }
}

/// Product type of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Product {
    Equity,
}

/// Bar interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Minute,
    Hour,
    Daily,
}

impl FromStr for Interval {
    type Err = &'static str;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "minute" | "1m" => Ok(Self::Minute),
            "hour" | "1h" => Ok(Self::Hour),
            "daily" | "1d" => Ok(Self::Daily),
            _ => Err("invalid interval; expected minute|hour|daily"),
        }
    }
}

/// Contract metadata, registered once at connect time and immutable afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractData {
    pub symbol: String,
    pub exchange: Exchange,
    pub name: String,
    pub product: Product,
    /// Lot size
    pub size: u32,
    pub price_tick: Decimal,
}

/// Request to subscribe realtime quotes for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub symbol: String,
    pub exchange: Exchange,
}

/// Request for historical bars or ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub symbol: String,
    pub exchange: Exchange,
    /// Required for bar queries, ignored for tick queries
    pub interval: Option<Interval>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Level-1 market snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickData {
    pub symbol: String,
    pub exchange: Exchange,
    pub datetime: DateTime<Utc>,
    pub last_price: Decimal,
    pub open_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    /// Cumulative session volume
    pub volume: u64,
    /// Cumulative session turnover
    pub turnover: Decimal,
    pub open_interest: Decimal,
    pub bid_price_1: Decimal,
    pub bid_volume_1: u64,
    pub ask_price_1: Decimal,
    pub ask_volume_1: u64,
}

/// One historical bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarData {
    pub symbol: String,
    pub exchange: Exchange,
    pub interval: Interval,
    /// Beginning of the bar
    pub datetime: DateTime<Utc>,
    pub open_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub close_price: Decimal,
    pub volume: u64,
    pub turnover: Decimal,
    pub open_interest: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_parses_case_insensitively() {
        assert_eq!("szse".parse::<Exchange>().expect("szse should parse"), Exchange::Szse);
        assert_eq!("SSE".parse::<Exchange>().expect("SSE should parse"), Exchange::Sse);
        assert!("NYSE".parse::<Exchange>().is_err());
    }

    #[test]
    fn interval_accepts_short_aliases() {
        assert_eq!("1m".parse::<Interval>().expect("1m should parse"), Interval::Minute);
        assert_eq!("daily".parse::<Interval>().expect("daily should parse"), Interval::Daily);
        assert!("week".parse::<Interval>().is_err());
    }
}
