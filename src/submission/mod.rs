pub mod parser;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder stored for optional fields the sender left out.
pub const NOT_PROVIDED: &str = "N/A";

/// Raw contact-form payload as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingRequired,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingRequired => write!(f, "Missing required fields (name, email)"),
        }
    }
}

/// A validated submission. Optional fields stay `None` here; callers pick
/// their own placeholder (the log uses `N/A`, the email body words it
/// differently for the message).
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: Option<String>,
}

impl Submission {
    pub fn from_form(form: ContactForm) -> Result<Self, ValidationError> {
        let name = required(form.name)?;
        let email = required(form.email)?;

        Ok(Submission {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            name,
            email,
            company: optional(form.company),
            message: optional(form.message),
        })
    }

    pub fn company_or_default(&self) -> &str {
        self.company.as_deref().unwrap_or(NOT_PROVIDED)
    }

    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or(NOT_PROVIDED)
    }

    /// Row layout matching the log header.
    pub fn to_row(&self) -> [String; 5] {
        [
            self.timestamp.clone(),
            self.name.clone(),
            self.email.clone(),
            self.company_or_default().to_string(),
            self.message_or_default().to_string(),
        ]
    }
}

fn required(value: Option<String>) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingRequired)
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
