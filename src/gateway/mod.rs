pub mod base;
pub mod yahoo;

pub use base::MarketDataGateway;
pub use yahoo::YahooGateway;
