use crate::catalog::base::CatalogStore;
use crate::errors::Result;
use crate::models::company::{default_companies, Company};
use async_trait::async_trait;

/// 内存中的股票目录，保持插入顺序
pub struct MemoryCatalog {
    companies: Vec<Company>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::with_companies(default_companies())
    }

    pub fn with_companies(companies: Vec<Company>) -> Self {
        Self { companies }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_companies(&self) -> Result<Vec<Company>> {
        Ok(self.companies.clone())
    }
}
