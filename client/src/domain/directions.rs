//! Directions (degree programs) as exchanged with the API.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::FieldErrors;
use crate::domain::ports::DirectionId;

/// Message reported when a direction name is blank.
pub const NAME_REQUIRED: &str = "Direction name is required.";
/// Message reported when the semester count is not positive.
pub const SEMESTERS_POSITIVE: &str = "Semesters must be a positive number.";

/// A degree program owned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Direction {
    /// API identifier.
    pub id: DirectionId,
    /// Display name.
    pub name: String,
    /// Number of semesters.
    #[serde(alias = "semesters_count")]
    pub semesters: i64,
}

/// Form input for creating a direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewDirection {
    /// Requested name.
    pub name: String,
    /// Requested semester count.
    pub semesters: i64,
}

impl NewDirection {
    /// Capture raw form input.
    pub fn new(name: impl Into<String>, semesters: i64) -> Self {
        Self {
            name: name.into(),
            semesters,
        }
    }

    /// Check every field and report all problems together.
    ///
    /// # Examples
    /// ```
    /// use grading_admin::domain::NewDirection;
    ///
    /// let errors = NewDirection::new("", 0).validate().unwrap_err();
    /// assert_eq!(errors.len(), 2);
    /// ```
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name".to_owned(), vec![NAME_REQUIRED.to_owned()]);
        }
        if self.semesters <= 0 {
            errors.insert("semesters".to_owned(), vec![SEMESTERS_POSITIVE.to_owned()]);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// JSON body for `POST directions/`.
    pub fn to_payload(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "semesters": self.semesters,
        })
    }
}
