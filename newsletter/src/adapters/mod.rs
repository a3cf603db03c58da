pub mod brevo_client;
pub mod secrets_manager_resolver;
