use crate::domain::new_subscriber::{form_field, non_empty};
use serde::Deserialize;

pub const MISSING_CAMPAIGN_FIELDS: &str = "Title and URL required";
pub const DEFAULT_CONTENT_TYPE: &str = "blog";

/// Announcement request sent when new content is published.
#[derive(Deserialize, Debug)]
pub struct CampaignRequest {
    #[serde(default, deserialize_with = "form_field")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "form_field")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

#[derive(Debug)]
pub struct NewCampaign {
    pub title: String,
    pub url: String,
    pub content_type: String,
}

impl TryFrom<CampaignRequest> for NewCampaign {
    type Error = String;

    fn try_from(value: CampaignRequest) -> Result<Self, Self::Error> {
        let (Some(title), Some(url)) = (non_empty(value.title), non_empty(value.url)) else {
            return Err(MISSING_CAMPAIGN_FIELDS.to_string());
        };

        Ok(NewCampaign {
            title,
            url,
            content_type: value
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        })
    }
}

impl NewCampaign {
    /// Used both as the campaign name and as the email subject.
    pub fn subject(&self) -> String {
        format!("New {}: {}", self.content_type, self.title)
    }

    pub fn html_content(&self) -> String {
        format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #2563eb;">New {label} Published!</h2>
    <h3>{title}</h3>
    <p>Check it out:</p>
    <a href="{url}" style="display: inline-block; padding: 12px 24px; background: #2563eb; color: white; text-decoration: none; border-radius: 6px;">Read Now</a>
</body>
</html>"#,
            label = title_case(&self.content_type),
            title = self.title,
            url = self.url,
        )
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest.
/// Any non-alphabetic character starts a new word.
fn title_case(value: &str) -> String {
    let mut in_word = false;
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }
    result
}
