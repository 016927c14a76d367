//! Driven port for navigation side effects.

use std::fmt;
use std::sync::Mutex;

/// Identifier of a direction as assigned by the API.
pub type DirectionId = i64;

/// Places the client can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Login entry point.
    Login,
    /// Admin management area (the directions board).
    AdminDirections,
    /// Generic dashboard for non-admin roles.
    Dashboard,
    /// Semester view of one direction.
    DirectionSemesters(DirectionId),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("/login"),
            Self::AdminDirections => f.write_str("/admin/directions"),
            Self::Dashboard => f.write_str("/dashboard"),
            Self::DirectionSemesters(id) => write!(f, "/admin/directions/{id}/semesters"),
        }
    }
}

/// Receives forced and voluntary navigation requests.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Move the user to `destination`.
    fn navigate(&self, destination: Destination);
}

/// Navigator that only remembers where it was sent.
///
/// Useful for headless callers that decide what to do with a destination
/// after the fact, and for tests.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    /// Create a navigator with an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every destination in visiting order.
    pub fn history(&self) -> Vec<Destination> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }

    /// Most recent destination, if any.
    pub fn last(&self) -> Option<Destination> {
        self.history().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(destination);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Destination::Login, "/login")]
    #[case(Destination::AdminDirections, "/admin/directions")]
    #[case(Destination::Dashboard, "/dashboard")]
    #[case(Destination::DirectionSemesters(7), "/admin/directions/7/semesters")]
    fn destinations_render_as_routes(#[case] destination: Destination, #[case] route: &str) {
        assert_eq!(destination.to_string(), route);
    }

    #[rstest]
    fn recording_navigator_keeps_history_in_order() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(Destination::AdminDirections);
        navigator.navigate(Destination::Login);
        assert_eq!(
            navigator.history(),
            vec![Destination::AdminDirections, Destination::Login]
        );
        assert_eq!(navigator.last(), Some(Destination::Login));
    }
}
