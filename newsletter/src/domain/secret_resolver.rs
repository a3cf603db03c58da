use crate::domain::BrevoConfig;
use async_trait::async_trait;

#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Fetch the Brevo credentials. Implementations must not cache across calls.
    async fn brevo_config(&self) -> Result<BrevoConfig, anyhow::Error>;
}
