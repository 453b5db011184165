//! Fact store traits.

use async_trait::async_trait;
use crate::error::Result;
use crate::types::Fact;

/// Read path into stored facts and insights.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Facts relevant to the given goal keywords, already capped.
    async fn retrieve_relevant(&self, keywords: &[String]) -> Result<Vec<Fact>>;
}
