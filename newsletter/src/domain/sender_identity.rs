use validator::validate_email;

#[derive(Debug, Clone)]
pub struct SenderEmail(String);

impl SenderEmail {
    pub fn parse(s: String) -> Result<SenderEmail, String> {
        if validate_email(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid sender email", s))
        }
    }
}

impl AsRef<str> for SenderEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The `From` of every campaign sent through Brevo.
#[derive(Debug, Clone)]
pub struct SenderIdentity {
    pub name: String,
    pub email: SenderEmail,
}

impl SenderIdentity {
    pub fn parse(name: String, email: String) -> Result<SenderIdentity, String> {
        if name.trim().is_empty() {
            return Err("Sender name must not be empty".to_string());
        }

        Ok(Self {
            name,
            email: SenderEmail::parse(email)?,
        })
    }
}
