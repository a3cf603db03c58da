use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const MISSING_SUBSCRIBER_FIELDS: &str = "Name and email required";

/// Subscription form as posted by the website.
#[derive(Deserialize, Debug)]
pub struct SubscribeRequest {
    #[serde(default, deserialize_with = "form_field")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "form_field")]
    pub email: Option<String>,
}

/// A subscription request with both fields present.
///
/// The email address is not checked any further: Brevo validates it and its rejection
/// is passed back to the caller as is.
#[derive(Debug)]
pub struct NewSubscriber {
    pub name: String,
    pub email: String,
}

impl TryFrom<SubscribeRequest> for NewSubscriber {
    type Error = String;

    fn try_from(value: SubscribeRequest) -> Result<Self, Self::Error> {
        match (non_empty(value.name), non_empty(value.email)) {
            (Some(name), Some(email)) => Ok(NewSubscriber { name, email }),
            _ => Err(MISSING_SUBSCRIBER_FIELDS.to_string()),
        }
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A required form field. `null`, `false`, `0`, `""`, `[]` and `{}` all read as not
/// filled in; any other non-string value is malformed input.
pub(crate) fn form_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::Array(a)) if a.is_empty() => Ok(None),
        Some(Value::Object(o)) if o.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(non_empty(Some(s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {}",
            other
        ))),
    }
}
