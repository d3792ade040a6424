pub mod cli;
pub mod config;
pub mod datafeed;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod venue;

pub use config::{AppConfig, ConnectConfig};
pub use datafeed::GmDatafeed;
pub use domain::{EventSink, GatewayEvent};
pub use error::{GatewayError, Result};
pub use gateway::{ConnState, GmGateway, PollerConfig, PollerHandle};
pub use venue::{GmRestClient, VenueApi, VenuePushHandler};
