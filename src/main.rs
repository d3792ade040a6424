use clap::Parser;
use gmlink::cli::{parse_date, Cli, Commands};
use gmlink::config::AppConfig;
use gmlink::datafeed::GmDatafeed;
use gmlink::domain::{Exchange, EventSink, GatewayEvent, HistoryRequest, Interval};
use gmlink::error::{GatewayError, Result};
use gmlink::gateway::{GmGateway, PollerConfig};
use gmlink::venue::{GmRestClient, VenueApi};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    init_logging(&config.logging.level);

    if let Err(problems) = config.validate() {
        for problem in &problems {
            error!("config: {problem}");
        }
        return Err(GatewayError::Config(format!(
            "{} invalid configuration option(s)",
            problems.len()
        )));
    }

    let venue: Arc<dyn VenueApi> = Arc::new(GmRestClient::new()?);

    match cli.command {
        Commands::Run => run_gateway(venue, &config).await,
        Commands::Bars {
            symbol,
            exchange,
            interval,
            start,
            end,
        } => {
            let feed = GmDatafeed::new(venue, config.datafeed.clone());
            show_bars(&feed, symbol, exchange, interval, &start, &end).await
        }
        Commands::Ticks {
            symbol,
            exchange,
            start,
            end,
        } => {
            let feed = GmDatafeed::new(venue, config.datafeed.clone());
            show_ticks(&feed, symbol, exchange, &start, &end).await
        }
    }
}

async fn run_gateway(venue: Arc<dyn VenueApi>, config: &AppConfig) -> Result<()> {
    let (events, mut rx) = EventSink::channel();
    let gateway = GmGateway::new(venue, events, PollerConfig::from(&config.poller));

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                GatewayEvent::Log(line) => info!("{line}"),
                GatewayEvent::Order(order) => info!(
                    order_id = %order.order_id,
                    status = ?order.status,
                    traded = order.traded,
                    "order"
                ),
                GatewayEvent::Trade(trade) => info!(
                    trade_id = %trade.trade_id,
                    price = %trade.price,
                    volume = trade.volume,
                    "trade"
                ),
                GatewayEvent::Account(account) => {
                    info!(balance = %account.balance, available = %account.available, "account")
                }
                other => info!(?other, "event"),
            }
        }
    });

    gateway.connect(&config.connect).await?;
    shutdown_signal().await;
    info!("shutting down");
    gateway.close().await?;

    drop(gateway);
    let _ = printer.await;
    Ok(())
}

async fn show_bars(
    feed: &GmDatafeed,
    symbol: String,
    exchange: Exchange,
    interval: Interval,
    start: &str,
    end: &str,
) -> Result<()> {
    let req = HistoryRequest {
        symbol,
        exchange,
        interval: Some(interval),
        start: parse_date(start)?,
        end: parse_date(end)?,
    };
    let bars = feed.query_bar_history(&req).await?;
    info!("{} bars", bars.len());
    for bar in &bars {
        println!(
            "{}  O {} H {} L {} C {}  V {}",
            bar.datetime, bar.open_price, bar.high_price, bar.low_price, bar.close_price, bar.volume
        );
    }
    Ok(())
}

async fn show_ticks(
    feed: &GmDatafeed,
    symbol: String,
    exchange: Exchange,
    start: &str,
    end: &str,
) -> Result<()> {
    let req = HistoryRequest {
        symbol,
        exchange,
        interval: None,
        start: parse_date(start)?,
        end: parse_date(end)?,
    };
    let ticks = feed.query_tick_history(&req).await?;
    info!("{} ticks", ticks.len());
    for tick in &ticks {
        println!(
            "{}  last {}  bid {}x{}  ask {}x{}",
            tick.datetime,
            tick.last_price,
            tick.bid_price_1,
            tick.bid_volume_1,
            tick.ask_price_1,
            tick.ask_volume_1
        );
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},gmlink=debug")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
