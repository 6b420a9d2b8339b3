//! Contact form validation and submission.
//!
//! Submission failures are returned to the caller as they are; nothing here
//! reports success for a message that was not accepted.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{error, info};

use crate::error::FetchError;
use crate::wp::WpClient;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactForm {
  pub name: String,
  pub email: String,
  pub subject: String,
  pub message: String,
}

/// Field name -> message for every invalid field.
pub type ValidationErrors = BTreeMap<&'static str, &'static str>;

impl ContactForm {
  pub fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if self.name.trim().chars().count() < 2 {
      errors.insert("name", "Name must be at least 2 characters long");
    }
    if !EMAIL_RE.is_match(self.email.trim()) {
      errors.insert("email", "Please enter a valid email address");
    }
    if self.subject.trim().chars().count() < 3 {
      errors.insert("subject", "Subject must be at least 3 characters long");
    }
    if self.message.trim().chars().count() < 10 {
      errors.insert("message", "Message must be at least 10 characters long");
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(errors)
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
  #[error("invalid form: {}", describe(.0))]
  Invalid(ValidationErrors),
  #[error("contact endpoint is not configured")]
  NotConfigured,
  #[error(transparent)]
  Fetch(#[from] FetchError),
}

fn describe(errors: &ValidationErrors) -> String {
  errors.values().copied().collect::<Vec<_>>().join("; ")
}

/// Validate, then POST the form as JSON to `url`.
pub async fn submit(
  client: &WpClient,
  url: Option<&str>,
  form: &ContactForm,
) -> Result<(), SubmitError> {
  form.validate().map_err(SubmitError::Invalid)?;
  let url = url.ok_or(SubmitError::NotConfigured)?;

  match client.post_json(url, form).await {
    Ok(()) => {
      info!(url, "Contact form submitted");
      Ok(())
    }
    Err(e) => {
      error!(url, error = %e, "Contact form submission error");
      Err(e.into())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid() -> ContactForm {
    ContactForm {
      name: "Asha".to_string(),
      email: "asha@example.org".to_string(),
      subject: "Books".to_string(),
      message: "Where can I buy your books?".to_string(),
    }
  }

  #[test]
  fn test_valid_form() {
    assert!(valid().validate().is_ok());
  }

  #[test]
  fn test_every_field_checked() {
    let errors = ContactForm::default().validate().unwrap_err();
    assert_eq!(
      errors.keys().copied().collect::<Vec<_>>(),
      vec!["email", "message", "name", "subject"]
    );
  }

  #[test]
  fn test_email_shapes() {
    for bad in ["asha", "asha@example", "a sha@example.org", "@example.org"] {
      let form = ContactForm {
        email: bad.to_string(),
        ..valid()
      };
      let errors = form.validate().unwrap_err();
      assert!(errors.contains_key("email"), "{} should be rejected", bad);
    }
  }

  #[test]
  fn test_whitespace_does_not_count() {
    let form = ContactForm {
      name: "  A  ".to_string(),
      message: "   short    ".to_string(),
      ..valid()
    };
    let errors = form.validate().unwrap_err();
    assert!(errors.contains_key("name"));
    assert!(errors.contains_key("message"));
  }

  #[test]
  fn test_nepali_name_counts_characters() {
    let form = ContactForm {
      name: "राम".to_string(),
      ..valid()
    };
    assert!(form.validate().is_ok());
  }

  #[tokio::test]
  async fn test_submit_without_endpoint() {
    let client = WpClient::new(&crate::config::ApiConfig::default()).unwrap();
    let err = submit(&client, None, &valid()).await.unwrap_err();
    assert!(matches!(err, SubmitError::NotConfigured));
  }
}
