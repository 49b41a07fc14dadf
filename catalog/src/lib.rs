//! Client for the data catalog backend: assets, their profiled columns and
//! the PII rule set.

pub mod client;
pub mod models;
pub mod utils;

use async_trait::async_trait;
use common::Result;
use common::models::{Asset, Column, PiiRule};

pub use client::CatalogClient;

/// Where assets, columns and rules come from. Implemented by
/// [`CatalogClient`]; tests substitute in-memory sources.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_assets(&self) -> Result<Vec<Asset>>;

    async fn asset_columns(&self, asset_id: &str) -> Result<Vec<Column>>;

    async fn pii_rules(&self) -> Result<Vec<PiiRule>>;
}
