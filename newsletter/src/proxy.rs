//! Plumbing between API Gateway proxy events and the handlers.

use anyhow::Context;
use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use http::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Maps a handler error onto the response returned to API Gateway.
pub trait ResponseError: std::error::Error {
    fn status_code(&self) -> u16;

    fn error_response(&self) -> ApiGatewayProxyResponse {
        json_error_response(self.status_code(), self)
    }
}

/// `{"error": <message>}`, where the message carries the whole context chain.
pub fn json_error_response<E>(status_code: u16, error: &E) -> ApiGatewayProxyResponse
where
    E: std::fmt::Display + ?Sized,
{
    json_response(status_code, &json!({ "error": format!("{:#}", error) }))
}

/// Deserialize the event body, which must hold a JSON object.
pub fn parse_json_body<T: DeserializeOwned>(body: Option<&str>) -> Result<T, anyhow::Error> {
    let body = body.context("Request body is missing")?;
    let payload: serde_json::Map<String, Value> =
        serde_json::from_str(body).context("Request body is not a JSON object")?;

    serde_json::from_value(Value::Object(payload)).context("Request body has invalid fields")
}

pub fn json_response(status_code: u16, body: &Value) -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response(status_code, headers, body.to_string())
}

/// Forward a body exactly as received.
pub fn raw_response(status_code: u16, body: String) -> ApiGatewayProxyResponse {
    response(status_code, HeaderMap::new(), body)
}

pub fn preflight_response() -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST,OPTIONS"),
    );
    with_cors(response(200, headers, String::new()))
}

pub fn with_cors(mut response: ApiGatewayProxyResponse) -> ApiGatewayProxyResponse {
    response
        .headers
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

fn response(status_code: u16, headers: HeaderMap, body: String) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code: i64::from(status_code),
        headers,
        body: Some(Body::Text(body)),
        ..Default::default()
    }
}
