//! Historical market data queries.
//!
//! Synchronous from the caller's perspective (they block on network I/O);
//! must not be invoked from within a push-callback context.

use chrono::Duration;
use std::sync::Arc;
use tracing::warn;

use crate::config::DatafeedSettings;
use crate::domain::{BarData, HistoryRequest, TickData};
use crate::error::{GatewayError, Result};
use crate::venue::translate::{bar_from_row, interval_to_venue, tick_from_row, to_venue_symbol};
use crate::venue::VenueApi;

pub struct GmDatafeed {
    venue: Arc<dyn VenueApi>,
    settings: DatafeedSettings,
}

impl GmDatafeed {
    pub fn new(venue: Arc<dyn VenueApi>, settings: DatafeedSettings) -> Self {
        Self { venue, settings }
    }

    /// Query bars for a time range. Unsupported intervals are rejected
    /// before the venue call; an inverted range yields an empty result, not
    /// an error; a transient venue failure degrades to empty with a warn.
    /// Bars keep the chronological order the venue returned.
    pub async fn query_bar_history(&self, req: &HistoryRequest) -> Result<Vec<BarData>> {
        let interval = req.interval.ok_or_else(|| {
            GatewayError::UnsupportedValue("bar history requires an interval".to_string())
        })?;
        let frequency = interval_to_venue(interval)?;
        let venue_symbol = to_venue_symbol(&req.symbol, req.exchange)?;

        if req.start > req.end {
            return Ok(Vec::new());
        }

        let rows = match self
            .venue
            .history_bars(&venue_symbol, frequency, req.start, req.end)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!("bar history query failed for {venue_symbol}: {e}");
                return Ok(Vec::new());
            }
        };

        Ok(rows
            .iter()
            .map(|row| bar_from_row(row, &req.symbol, req.exchange, interval))
            .collect())
    }

    /// Query ticks for a time range. The venue caps the lookback window;
    /// requests beyond it are rejected without a venue call.
    pub async fn query_tick_history(&self, req: &HistoryRequest) -> Result<Vec<TickData>> {
        let venue_symbol = to_venue_symbol(&req.symbol, req.exchange)?;

        if req.start > req.end {
            return Ok(Vec::new());
        }

        let max_window = Duration::days(self.settings.max_tick_lookback_days);
        if req.end - req.start > max_window {
            return Err(GatewayError::Range(format!(
                "tick history window exceeds {} days",
                self.settings.max_tick_lookback_days
            )));
        }

        let rows = match self
            .venue
            .history_ticks(&venue_symbol, req.start, req.end)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!("tick history query failed for {venue_symbol}: {e}");
                return Ok(Vec::new());
            }
        };

        let mut ticks = Vec::with_capacity(rows.len());
        for row in &rows {
            match tick_from_row(row) {
                Ok(tick) => ticks.push(tick),
                Err(e) => warn!("tick row skipped: {e}"),
            }
        }
        Ok(ticks)
    }
}
