use crate::adapters::brevo_client::{BrevoClient, BrevoError};
use crate::domain::{NewSubscriber, SecretResolver, SubscribeRequest};
use crate::proxy::{
    json_error_response, json_response, parse_json_body, preflight_response, with_cors,
    ResponseError,
};
use crate::utils::error_chain_fmt;
use anyhow::Context;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use http::Method;
use serde_json::json;

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    ApiError(#[from] BrevoError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> u16 {
        match self {
            SubscribeError::ValidationError(_) => 400,
            SubscribeError::ApiError(e) => e.status_code(),
            SubscribeError::UnexpectedError(_) => 500,
        }
    }

    fn error_response(&self) -> ApiGatewayProxyResponse {
        match self {
            SubscribeError::ApiError(e) => e.error_response(),
            _ => json_error_response(self.status_code(), self),
        }
    }
}

/// Entry point of the subscribe function. Every response carries the CORS origin header.
#[tracing::instrument(
    name = "Handling a subscribe request",
    skip(request, resolver, brevo_client),
    fields(http_method = %request.http_method)
)]
pub async fn handle_request<R: SecretResolver + ?Sized>(
    request: ApiGatewayProxyRequest,
    resolver: &R,
    brevo_client: &BrevoClient,
) -> ApiGatewayProxyResponse {
    if request.http_method == Method::OPTIONS {
        return preflight_response();
    }

    let response = match subscribe(request.body.as_deref(), resolver, brevo_client).await {
        Ok(()) => json_response(200, &json!({ "success": true })),
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to add the subscriber"
            );
            e.error_response()
        }
    };

    with_cors(response)
}

#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(body, resolver, brevo_client),
    fields(subscriber_email = tracing::field::Empty)
)]
async fn subscribe<R: SecretResolver + ?Sized>(
    body: Option<&str>,
    resolver: &R,
    brevo_client: &BrevoClient,
) -> Result<(), SubscribeError> {
    let request: SubscribeRequest = parse_json_body(body)?;
    let new_subscriber: NewSubscriber =
        request.try_into().map_err(SubscribeError::ValidationError)?;

    tracing::Span::current().record(
        "subscriber_email",
        &tracing::field::display(&new_subscriber.email),
    );

    let config = resolver
        .brevo_config()
        .await
        .context("Failed to resolve the Brevo configuration")?;

    brevo_client
        .upsert_contact(&config.api_key, &new_subscriber, config.list_id)
        .await?;

    Ok(())
}
