use crate::domain::SenderIdentity;
use serde::Deserialize;
use std::time::Duration;
use telemetry::TelemetrySettings;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub brevo: BrevoSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct BrevoSettings {
    pub base_url: String,
    pub timeout_milliseconds: u64,
    pub sender_name: String,
    pub sender_email: String,
}

impl BrevoSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn sender(&self) -> Result<SenderIdentity, String> {
        SenderIdentity::parse(self.sender_name.clone(), self.sender_email.clone())
    }
}

/// Layer the built-in defaults, the optional files under `configuration/` and `APP_*`
/// environment variables, in that order.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let environment = Environment::detect().map_err(config::ConfigError::Message)?;

    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .set_default("brevo.base_url", "https://api.brevo.com/v3")?
        .set_default("brevo.timeout_milliseconds", 10_000_i64)?
        .set_default("brevo.sender_name", "CloudNestle")?
        .set_default("brevo.sender_email", "noreply@cloudnestle.com")?
        .set_default("telemetry.service_name", "newsletter")?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // E.g. `APP_BREVO__BASE_URL=http://localhost:8080` sets `Settings.brevo.base_url`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Debug, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }

    /// `APP_ENVIRONMENT` wins; otherwise running inside Lambda means production.
    fn detect() -> Result<Self, String> {
        match std::env::var("APP_ENVIRONMENT") {
            Ok(value) => value.try_into(),
            Err(_) if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() => Ok(Self::Production),
            Err(_) => Ok(Self::Local),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
