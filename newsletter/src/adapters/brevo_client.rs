use crate::domain::{NewCampaign, NewSubscriber, SenderIdentity};
use crate::proxy::{json_error_response, raw_response, ResponseError};
use crate::utils::error_chain_fmt;
use anyhow::Context;
use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(thiserror::Error)]
pub enum BrevoError {
    /// Brevo answered with a non-2xx status; `body` is kept byte for byte.
    #[error("Brevo responded with status {status}")]
    UpstreamError { status: u16, body: String },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for BrevoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for BrevoError {
    fn status_code(&self) -> u16 {
        match self {
            BrevoError::UpstreamError { status, .. } => *status,
            BrevoError::UnexpectedError(_) => 500,
        }
    }

    fn error_response(&self) -> ApiGatewayProxyResponse {
        match self {
            BrevoError::UpstreamError { status, body } => raw_response(*status, body.clone()),
            BrevoError::UnexpectedError(_) => json_error_response(500, self),
        }
    }
}

#[derive(Clone)]
pub struct BrevoClient {
    http_client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertContactRequest<'a> {
    email: &'a str,
    attributes: ContactAttributes<'a>,
    list_ids: [i64; 1],
    update_enabled: bool,
}

#[derive(Serialize)]
struct ContactAttributes<'a> {
    #[serde(rename = "FIRSTNAME")]
    first_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCampaignRequest<'a> {
    sender: CampaignSender<'a>,
    name: &'a str,
    subject: &'a str,
    html_content: &'a str,
    recipients: CampaignRecipients,
}

#[derive(Serialize)]
struct CampaignSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignRecipients {
    list_ids: [i64; 1],
}

#[derive(Deserialize)]
struct CreatedCampaign {
    id: i64,
}

impl BrevoClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create the contact, or update it when the email is already known, and add it to
    /// the list.
    #[tracing::instrument(
        name = "upsert_brevo_contact",
        skip(self, api_key, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    pub async fn upsert_contact(
        &self,
        api_key: &Secret<String>,
        subscriber: &NewSubscriber,
        list_id: i64,
    ) -> Result<(), BrevoError> {
        let request_body = UpsertContactRequest {
            email: &subscriber.email,
            attributes: ContactAttributes {
                first_name: &subscriber.name,
            },
            list_ids: [list_id],
            update_enabled: true,
        };

        let response = self
            .post("contacts", api_key)
            .json(&request_body)
            .send()
            .await
            .context("Failed to call the Brevo contacts API")?;

        error_for_status(response).await?;

        Ok(())
    }

    /// Create a draft campaign for `list_id` and return its identifier.
    #[tracing::instrument(
        name = "create_brevo_campaign",
        skip(self, api_key, campaign, sender),
        fields(campaign_title = %campaign.title)
    )]
    pub async fn create_campaign(
        &self,
        api_key: &Secret<String>,
        campaign: &NewCampaign,
        sender: &SenderIdentity,
        list_id: i64,
    ) -> Result<i64, BrevoError> {
        let subject = campaign.subject();
        let html_content = campaign.html_content();
        let request_body = CreateCampaignRequest {
            sender: CampaignSender {
                name: &sender.name,
                email: sender.email.as_ref(),
            },
            name: &subject,
            subject: &subject,
            html_content: &html_content,
            recipients: CampaignRecipients { list_ids: [list_id] },
        };

        let response = self
            .post("emailCampaigns", api_key)
            .json(&request_body)
            .send()
            .await
            .context("Failed to call the Brevo campaigns API")?;

        let created: CreatedCampaign = error_for_status(response)
            .await?
            .json()
            .await
            .context("Brevo did not return the id of the created campaign")?;

        tracing::info!(campaign_id = created.id, "Campaign created");

        Ok(created.id)
    }

    #[tracing::instrument(name = "send_brevo_campaign_now", skip(self, api_key))]
    pub async fn send_campaign_now(
        &self,
        api_key: &Secret<String>,
        campaign_id: i64,
    ) -> Result<(), BrevoError> {
        let response = self
            .post(&format!("emailCampaigns/{}/sendNow", campaign_id), api_key)
            .send()
            .await
            .context("Failed to call the Brevo send-now API")?;

        error_for_status(response).await?;

        Ok(())
    }

    fn post(&self, route: &str, api_key: &Secret<String>) -> RequestBuilder {
        self.http_client
            .post(format!("{}/{}", self.base_url, route))
            .header("accept", "application/json")
            .header("api-key", api_key.expose_secret().as_str())
    }
}

async fn error_for_status(response: Response) -> Result<Response, BrevoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .context("Failed to read the Brevo error response")?;

    tracing::warn!(status = status.as_u16(), "Brevo rejected the request");

    Err(BrevoError::UpstreamError {
        status: status.as_u16(),
        body,
    })
}
