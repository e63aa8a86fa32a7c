use std::net::SocketAddr;
use std::time::Duration;

use crate::errors::{Result, DashboardError};
use crate::generator;
use crate::models::stock::Period;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// 股票目录的存储后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogBackend {
    /// 内置列表，按插入顺序返回
    Memory,
    /// SQLite 表，按名称排序返回
    Sqlite { url: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_period: String,
    pub request_timeout: Duration,
    pub synthetic_days: u32,
    pub catalog: CatalogBackend,
    pub upstream_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            default_period: Period::default().as_str().to_string(),
            request_timeout: Duration::from_secs(10),
            synthetic_days: generator::DEFAULT_DAYS,
            catalog: CatalogBackend::Memory,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_default_period(mut self, period: &str) -> Self {
        self.default_period = period.to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_synthetic_days(mut self, days: u32) -> Self {
        self.synthetic_days = days;
        self
    }

    pub fn with_catalog(mut self, catalog: CatalogBackend) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_upstream_base_url(mut self, url: &str) -> Self {
        self.upstream_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// 启动前校验配置
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(DashboardError::ConfigError("port must be non-zero".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(DashboardError::ConfigError("request timeout must be non-zero".to_string()));
        }
        if self.synthetic_days == 0 {
            return Err(DashboardError::ConfigError("synthetic days must be non-zero".to_string()));
        }
        self.default_period.parse::<Period>()?;
        if self.upstream_base_url.is_empty() {
            return Err(DashboardError::ConfigError("upstream base url is empty".to_string()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| DashboardError::ConfigError(format!("Invalid listen address {}:{}: {}", self.host, self.port, e)))
    }
}
