use crate::adapters::brevo_client::BrevoClient;
use crate::adapters::secrets_manager_resolver::SecretsManagerResolver;
use crate::configuration::get_configuration;
use crate::domain::SenderIdentity;
use anyhow::Context;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use telemetry::{flush, get_subscriber, init_subscriber, init_tracer, TelemetryProvider};

/// Everything a function needs across invocations, built once during the cold start.
pub struct Application {
    pub secret_resolver: SecretsManagerResolver,
    pub brevo_client: BrevoClient,
    pub sender: SenderIdentity,
    tracer_provider: TelemetryProvider,
}

impl Application {
    pub async fn build(function_name: &str) -> Result<Self, anyhow::Error> {
        let configuration = get_configuration().context("Failed to read configuration")?;

        let tracer_provider =
            init_tracer(&configuration.telemetry).context("Failed to build the tracer")?;
        let subscriber = get_subscriber(
            function_name.to_string(),
            "info".into(),
            std::io::stdout,
            &tracer_provider,
        );
        init_subscriber(subscriber);

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(make_region_provider())
            .load()
            .await;
        let secret_resolver =
            SecretsManagerResolver::from_env(aws_sdk_secretsmanager::Client::new(&aws_config));

        let brevo_client = BrevoClient::new(
            configuration.brevo.base_url.clone(),
            configuration.brevo.timeout(),
        )
        .context("Failed to build the Brevo HTTP client")?;

        let sender = configuration
            .brevo
            .sender()
            .map_err(anyhow::Error::msg)
            .context("Invalid campaign sender")?;

        tracing::info!(function_name, "Cold start completed");

        Ok(Self {
            secret_resolver,
            brevo_client,
            sender,
            tracer_provider,
        })
    }

    /// Export buffered spans before Lambda freezes the sandbox.
    pub fn flush_telemetry(&self) {
        flush(&self.tracer_provider);
    }
}

pub fn make_region_provider() -> RegionProviderChain {
    RegionProviderChain::default_provider().or_else(Region::new("us-east-1"))
}
