use crate::domain::model::{PetCollection, RenderedList};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The hosting page. Implementations own the elements; the renderer only swaps content.
pub trait Document: Send + Sync {
    /// Replaces the whole content of `element_id` in one step.
    ///
    /// Fails with `TargetMissing` when the element does not exist.
    fn replace_content(
        &self,
        element_id: &str,
        markup: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint_url(&self) -> &str;
    fn document_path(&self) -> &str;
    fn target_id(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn fallback_notice(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<PetCollection>;
    async fn transform(&self, pets: PetCollection) -> Result<RenderedList>;
    async fn load(&self, rendered: RenderedList) -> Result<usize>;
}
