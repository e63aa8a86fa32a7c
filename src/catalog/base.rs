use crate::models::company::Company;
use crate::errors::Result;
use async_trait::async_trait;

/// Read side of the ticker catalog
#[async_trait]
pub trait CatalogStore {
    /// Short name of the backend, used in logs
    fn backend_name(&self) -> &'static str;

    /// List every company in the catalog
    async fn list_companies(&self) -> Result<Vec<Company>>;
}
