pub mod whatsapp;

use async_trait::async_trait;

use crate::models::PromptUnit;

/// Outbound transport boundary: delivers one prompt unit to one
/// recipient. Ordering, inter-unit delay and failure logging are the
/// caller's job; implementations just send.
#[async_trait]
pub trait PromptSender: Send + Sync {
    async fn send(&self, to: &str, unit: &PromptUnit) -> anyhow::Result<()>;
}
