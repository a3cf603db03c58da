use async_trait::async_trait;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use http::Method;
use newsletter::adapters::brevo_client::BrevoClient;
use newsletter::domain::{BrevoConfig, SecretResolver, SenderIdentity};
use newsletter::{campaign_handler, subscribe_handler};
use once_cell::sync::Lazy;
use secrecy::Secret;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use telemetry::{get_subscriber, init_subscriber, init_tracer, TelemetryProvider, TelemetrySettings};
use wiremock::MockServer;

pub const API_KEY: &str = "xkeysib-test-key";
pub const LIST_ID: i64 = 7;

// Ensure that the `tracing` stack is only initialised once
static TRACING: Lazy<TelemetryProvider> = Lazy::new(|| {
    let settings = TelemetrySettings {
        service_name: "test-newsletter".to_string(),
        otlp_endpoint: None,
        otlp_api_key: None,
        dataset_name: None,
    };
    let provider = init_tracer(&settings).expect("Failed to build the tracer provider");
    let default_filter = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter, std::io::stdout, &provider);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter, std::io::sink, &provider);
        init_subscriber(subscriber);
    };

    provider
});

/// In-memory stand-in for Secrets Manager that counts lookups.
pub struct TestSecretResolver {
    outcome: Result<BrevoConfig, String>,
    lookups: AtomicUsize,
}

#[async_trait]
impl SecretResolver for TestSecretResolver {
    async fn brevo_config(&self) -> Result<BrevoConfig, anyhow::Error> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(anyhow::Error::msg)
    }
}

pub struct TestApp {
    pub brevo_server: MockServer,
    pub brevo_client: BrevoClient,
    pub secret_resolver: TestSecretResolver,
    pub sender: SenderIdentity,
}

impl TestApp {
    pub async fn subscribe(&self, method: Method, body: Option<String>) -> ApiGatewayProxyResponse {
        subscribe_handler::handle_request(
            proxy_request(method, body),
            &self.secret_resolver,
            &self.brevo_client,
        )
        .await
    }

    pub async fn post_subscribe(&self, body: serde_json::Value) -> ApiGatewayProxyResponse {
        self.subscribe(Method::POST, Some(body.to_string())).await
    }

    pub async fn campaign(&self, body: Option<String>) -> ApiGatewayProxyResponse {
        campaign_handler::handle_request(
            proxy_request(Method::POST, body),
            &self.secret_resolver,
            &self.brevo_client,
            &self.sender,
        )
        .await
    }

    pub async fn post_campaign(&self, body: serde_json::Value) -> ApiGatewayProxyResponse {
        self.campaign(Some(body.to_string())).await
    }

    pub fn secret_lookups(&self) -> usize {
        self.secret_resolver.lookups.load(Ordering::SeqCst)
    }

    /// JSON bodies of the requests Brevo received, in order.
    pub async fn brevo_requests(&self) -> Vec<(String, serde_json::Value)> {
        self.brevo_server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .map(|request| {
                let body = serde_json::from_slice(&request.body).unwrap_or(serde_json::Value::Null);
                (request.url.path().to_string(), body)
            })
            .collect()
    }
}

pub async fn spawn_app() -> TestApp {
    let config = BrevoConfig {
        api_key: Secret::new(API_KEY.to_string()),
        list_id: LIST_ID,
    };
    spawn_app_with_secret(Ok(config)).await
}

pub async fn spawn_app_with_unreachable_secret_store() -> TestApp {
    spawn_app_with_secret(Err("Secrets Manager is unreachable".to_string())).await
}

async fn spawn_app_with_secret(outcome: Result<BrevoConfig, String>) -> TestApp {
    Lazy::force(&TRACING);

    let brevo_server = MockServer::start().await;
    let brevo_client = BrevoClient::new(brevo_server.uri(), Duration::from_secs(2))
        .expect("Failed to build the Brevo client");
    let sender = SenderIdentity::parse(
        "CloudNestle".to_string(),
        "noreply@cloudnestle.com".to_string(),
    )
    .expect("Invalid test sender");

    TestApp {
        brevo_server,
        brevo_client,
        secret_resolver: TestSecretResolver {
            outcome,
            lookups: AtomicUsize::new(0),
        },
        sender,
    }
}

pub fn proxy_request(method: Method, body: Option<String>) -> ApiGatewayProxyRequest {
    ApiGatewayProxyRequest {
        http_method: method,
        body,
        ..Default::default()
    }
}

pub fn response_text(response: &ApiGatewayProxyResponse) -> String {
    match &response.body {
        Some(Body::Text(text)) => text.clone(),
        Some(Body::Binary(bytes)) => String::from_utf8(bytes.clone()).unwrap(),
        _ => String::new(),
    }
}

pub fn response_json(response: &ApiGatewayProxyResponse) -> serde_json::Value {
    serde_json::from_str(&response_text(response)).expect("Response body is not JSON")
}
