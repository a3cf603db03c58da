use crate::adapters::brevo_client::{BrevoClient, BrevoError};
use crate::domain::{CampaignRequest, NewCampaign, SecretResolver, SenderIdentity};
use crate::proxy::{json_error_response, json_response, parse_json_body, ResponseError};
use crate::utils::error_chain_fmt;
use anyhow::Context;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use serde_json::json;

#[derive(thiserror::Error)]
pub enum PublishCampaignError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    ApiError(#[from] BrevoError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for PublishCampaignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for PublishCampaignError {
    fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::ApiError(e) => e.status_code(),
            Self::UnexpectedError(_) => 500,
        }
    }

    fn error_response(&self) -> ApiGatewayProxyResponse {
        match self {
            Self::ApiError(e) => e.error_response(),
            _ => json_error_response(self.status_code(), self),
        }
    }
}

/// Entry point of the campaign function.
#[tracing::instrument(
    name = "Handling a campaign request",
    skip(request, resolver, brevo_client, sender)
)]
pub async fn handle_request<R: SecretResolver + ?Sized>(
    request: ApiGatewayProxyRequest,
    resolver: &R,
    brevo_client: &BrevoClient,
    sender: &SenderIdentity,
) -> ApiGatewayProxyResponse {
    match publish_campaign(request.body.as_deref(), resolver, brevo_client, sender).await {
        Ok(campaign_id) => json_response(
            200,
            &json!({ "success": true, "campaignId": campaign_id }),
        ),
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to publish the campaign"
            );
            e.error_response()
        }
    }
}

/// Create the campaign and send it straight away.
///
/// A campaign whose send fails stays in Brevo as an unsent draft.
#[tracing::instrument(
    name = "Publishing a campaign",
    skip(body, resolver, brevo_client, sender),
    fields(campaign_title = tracing::field::Empty, campaign_id = tracing::field::Empty)
)]
async fn publish_campaign<R: SecretResolver + ?Sized>(
    body: Option<&str>,
    resolver: &R,
    brevo_client: &BrevoClient,
    sender: &SenderIdentity,
) -> Result<i64, PublishCampaignError> {
    let request: CampaignRequest = parse_json_body(body)?;
    let campaign: NewCampaign = request
        .try_into()
        .map_err(PublishCampaignError::ValidationError)?;

    tracing::Span::current().record(
        "campaign_title",
        &tracing::field::display(&campaign.title),
    );

    let config = resolver
        .brevo_config()
        .await
        .context("Failed to resolve the Brevo configuration")?;

    let campaign_id = brevo_client
        .create_campaign(&config.api_key, &campaign, sender, config.list_id)
        .await?;

    tracing::Span::current().record("campaign_id", campaign_id);

    brevo_client
        .send_campaign_now(&config.api_key, campaign_id)
        .await?;

    Ok(campaign_id)
}
