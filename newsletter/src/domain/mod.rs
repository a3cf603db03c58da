mod brevo_config;
pub mod new_campaign;
pub mod new_subscriber;
mod secret_resolver;
pub mod sender_identity;

pub use brevo_config::BrevoConfig;
pub use new_campaign::{CampaignRequest, NewCampaign};
pub use new_subscriber::{NewSubscriber, SubscribeRequest};
pub use secret_resolver::SecretResolver;
pub use sender_identity::{SenderEmail, SenderIdentity};
