use anyhow::Context;
use secrecy::Secret;
use serde::Deserialize;

/// Credentials for the Brevo API, read from the secret store on every invocation.
#[derive(Debug, Clone)]
pub struct BrevoConfig {
    pub api_key: Secret<String>,
    pub list_id: i64,
}

#[derive(Deserialize)]
struct BrevoSecret {
    #[serde(rename = "apiKey")]
    api_key: String,
    #[serde(rename = "listId")]
    list_id: ListId,
}

// The console stores plain strings, so the list id shows up either way.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListId {
    Number(i64),
    Text(String),
}

impl BrevoConfig {
    pub fn parse(secret_string: &str) -> Result<BrevoConfig, anyhow::Error> {
        let secret: BrevoSecret = serde_json::from_str(secret_string)
            .context("The Brevo secret is not a JSON object with apiKey and listId")?;

        let list_id = match secret.list_id {
            ListId::Number(id) => id,
            ListId::Text(text) => text
                .trim()
                .parse()
                .with_context(|| format!("listId {:?} is not an integer", text))?,
        };

        Ok(BrevoConfig {
            api_key: Secret::new(secret.api_key),
            list_id,
        })
    }
}
