//! Platform events created by admins.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::FieldErrors;

/// Message reported when an event title is blank.
pub const TITLE_REQUIRED: &str = "Event title is required.";

/// Event as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Event {
    /// API identifier.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Date as rendered by the API.
    #[serde(alias = "date_time")]
    pub date: String,
}

/// Form input for creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Event title.
    pub title: String,
    /// Event description; may be empty.
    pub description: String,
    /// Calendar date of the event.
    pub date: NaiveDate,
}

impl NewEvent {
    /// Capture raw form input.
    pub fn new(title: impl Into<String>, description: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date,
        }
    }

    /// Check the form; the title is the only required text field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        if self.title.trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.insert("title".to_owned(), vec![TITLE_REQUIRED.to_owned()]);
            return Err(errors);
        }
        Ok(())
    }

    /// JSON body for `POST events/`.
    pub fn to_payload(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "description": self.description,
            "date": self.date.format("%Y-%m-%d").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date")
    }

    #[test]
    fn payload_uses_iso_dates() {
        let payload = NewEvent::new("Orientation", "Welcome week", date()).to_payload();
        assert_eq!(
            payload,
            json!({"title": "Orientation", "description": "Welcome week", "date": "2025-09-01"})
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let errors = NewEvent::new("  ", "", date())
            .validate()
            .expect_err("blank title must fail");
        assert_eq!(errors["title"], vec![TITLE_REQUIRED.to_owned()]);
    }
}
