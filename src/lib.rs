// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod catalog;
pub mod gateway;
pub mod generator;
pub mod services;
pub mod api;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::company::Company;
pub use models::stock::{PricePoint, StockSeriesResponse, StockSummary, Period};
pub use config::{Config, CatalogBackend};
pub use catalog::base::CatalogStore;
pub use gateway::MarketDataGateway;
pub use services::stock_service::StockService;
pub use api::{build_router, AppState};
pub use errors::{Result, DashboardError};
