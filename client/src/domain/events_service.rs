//! Event creation use case.

use std::sync::Arc;

use tracing::info;

use crate::domain::grading_api::GradingApi;
use crate::domain::ports::{Destination, Navigator};
use crate::domain::{ApiError, Event, FormError, NewEvent};

/// Fallback message when creating an event fails.
pub const EVENT_FAILED: &str = "Failed to add event.";

/// Submits new events on behalf of the signed-in user.
pub struct EventsService {
    api: Arc<GradingApi>,
    navigator: Arc<dyn Navigator>,
}

impl EventsService {
    /// Wire the service to its collaborators.
    pub fn new(api: Arc<GradingApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self { api, navigator }
    }

    /// Validate and submit `event`.
    pub async fn create_event(&self, event: &NewEvent) -> Result<Event, FormError> {
        if let Err(fields) = event.validate() {
            return Err(FormError::from_api(
                ApiError::InvalidInput { fields },
                EVENT_FAILED,
            ));
        }
        match self.api.create_event(event).await {
            Ok(created) => {
                info!(id = created.id, title = %created.title, "event created");
                Ok(created)
            }
            Err(error) => {
                if error.is_unauthenticated() {
                    self.navigator.navigate(Destination::Login);
                }
                Err(FormError::from_api(error, EVENT_FAILED))
            }
        }
    }
}
