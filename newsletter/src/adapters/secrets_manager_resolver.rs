use crate::domain::{BrevoConfig, SecretResolver};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;

pub const SECRET_ARN_VARIABLE: &str = "BREVO_SECRET_ARN";

/// Reads the Brevo credentials from AWS Secrets Manager.
///
/// The client is built once per process; the secret itself is fetched on every call.
pub struct SecretsManagerResolver {
    client: Client,
    secret_id: Option<String>,
}

impl SecretsManagerResolver {
    pub fn new(client: Client, secret_id: Option<String>) -> Self {
        Self { client, secret_id }
    }

    /// An unset variable is reported when the secret is first needed, not here.
    pub fn from_env(client: Client) -> Self {
        Self::new(client, std::env::var(SECRET_ARN_VARIABLE).ok())
    }
}

#[async_trait]
impl SecretResolver for SecretsManagerResolver {
    #[tracing::instrument(name = "resolve_brevo_config", skip(self))]
    async fn brevo_config(&self) -> Result<BrevoConfig, anyhow::Error> {
        let secret_id = self
            .secret_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("{} is not set", SECRET_ARN_VARIABLE))?;

        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .context("Failed to retrieve the Brevo secret from Secrets Manager")?;

        let secret_string = output
            .secret_string()
            .context("The Brevo secret has no string value")?;

        BrevoConfig::parse(secret_string)
    }
}
