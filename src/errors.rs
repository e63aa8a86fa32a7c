use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Catalog store error: {0}")]
    StoreError(#[from] sqlx::Error),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DashboardError {
    /// 上游行情相关的错误，调用方应当回退到模拟数据
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DashboardError::RequestError(_)
                | DashboardError::JsonError(_)
                | DashboardError::UpstreamUnavailable(_)
                | DashboardError::InvalidPeriod(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

// 用于从字符串创建错误
impl From<String> for DashboardError {
    fn from(s: String) -> Self {
        DashboardError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for DashboardError {
    fn from(s: &str) -> Self {
        DashboardError::Unknown(s.to_string())
    }
}
