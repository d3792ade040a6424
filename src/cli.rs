use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::domain::{Exchange, Interval};
use crate::error::{GatewayError, Result};

#[derive(Parser)]
#[command(name = "gmlink", about = "Venue adapter gateway for a GM-style brokerage")]
pub struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config", env = "GMLINK_CONFIG_DIR")]
    pub config_dir: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway until interrupted, printing canonical events
    Run,
    /// Query historical bars
    Bars {
        symbol: String,
        /// SSE or SZSE
        exchange: Exchange,
        /// minute, hour or daily
        #[arg(long, default_value = "daily")]
        interval: Interval,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },
    /// Query historical ticks
    Ticks {
        symbol: String,
        /// SSE or SZSE
        exchange: Exchange,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },
}

/// Parse a YYYY-MM-DD argument into a UTC midnight timestamp
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| GatewayError::Config(format!("invalid date {raw:?}: {e}")))?;
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| GatewayError::Config(format!("invalid date {raw:?}")))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        let dt = parse_date("2024-03-08").expect("valid date");
        assert_eq!(dt.to_rfc3339(), "2024-03-08T00:00:00+00:00");
        assert!(parse_date("03/08/2024").is_err());
    }
}
