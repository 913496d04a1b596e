use crate::error::Result;
use crate::types::{GenerationInput, ProviderKind};
use async_trait::async_trait;

/// One capability shared by every backend adapter: turn a canonical request
/// into non-empty generated text or a classified error.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate_text(&self, input: &GenerationInput) -> Result<String>;
}
