//! Session state and the identity of the current user.

use std::fmt;

use serde::Deserialize;

use crate::domain::AccessToken;
use crate::domain::ports::Destination;

/// Role reported by `me/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Teaching staff.
    Teacher,
    /// Enrolled student.
    Student,
    /// Any role string this client does not know.
    #[serde(other)]
    Other,
}

impl Role {
    /// Where a user with this role lands after logging in.
    ///
    /// # Examples
    /// ```
    /// use grading_admin::domain::Role;
    /// use grading_admin::domain::ports::Destination;
    ///
    /// assert_eq!(Role::Admin.landing(), Destination::AdminDirections);
    /// assert_eq!(Role::Student.landing(), Destination::Dashboard);
    /// ```
    pub fn landing(self) -> Destination {
        match self {
            Self::Admin => Destination::AdminDirections,
            Self::Teacher | Self::Student | Self::Other => Destination::Dashboard,
        }
    }

    /// Heading shown on the generic dashboard.
    pub fn dashboard_heading(self) -> &'static str {
        match self {
            Self::Teacher => "Teacher Dashboard (WIP)",
            _ => "Student Dashboard (WIP)",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Other => "other",
        })
    }
}

/// Identity of the logged-in user as returned by `me/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    /// Numeric user id.
    #[serde(default)]
    pub id: Option<i64>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Full name.
    #[serde(default)]
    pub fio: Option<String>,
    /// Contact e-mail.
    #[serde(default)]
    pub email: Option<String>,
    /// Role deciding which areas are reachable.
    pub role: Role,
}

impl CurrentUser {
    /// Best available human-readable name.
    pub fn display_name(&self) -> &str {
        self.fio
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.username.as_deref())
            .unwrap_or("unknown user")
    }
}

/// Whether the client holds an access token.
///
/// The role is deliberately absent: it is probed from the API on every
/// guard check and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No access token stored.
    Anonymous,
    /// Access token stored; validity unknown until the API is called.
    Authenticated,
}

impl SessionState {
    /// Derive the state from the stored access token.
    pub fn from_access_token(access: Option<&AccessToken>) -> Self {
        if access.is_some() {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("teacher", Role::Teacher)]
    #[case("student", Role::Student)]
    #[case("professor", Role::Other)]
    fn roles_decode_from_api_strings(#[case] raw: &str, #[case] expected: Role) {
        let user: CurrentUser =
            serde_json::from_value(json!({"role": raw})).expect("decode user");
        assert_eq!(user.role, expected);
    }

    #[rstest]
    fn display_name_prefers_full_name() {
        let user: CurrentUser = serde_json::from_value(json!({
            "id": 4,
            "username": "ivanov",
            "fio": "Ivan Ivanov",
            "role": "teacher",
        }))
        .expect("decode user");
        assert_eq!(user.display_name(), "Ivan Ivanov");
        assert_eq!(user.role.dashboard_heading(), "Teacher Dashboard (WIP)");
    }

    #[rstest]
    fn display_name_falls_back_to_username() {
        let user: CurrentUser =
            serde_json::from_value(json!({"username": "root", "fio": " ", "role": "admin"}))
                .expect("decode user");
        assert_eq!(user.display_name(), "root");
    }

    #[rstest]
    fn session_state_tracks_token_presence() {
        let token = AccessToken::new("abc").expect("valid token");
        assert_eq!(
            SessionState::from_access_token(Some(&token)),
            SessionState::Authenticated
        );
        assert_eq!(SessionState::from_access_token(None), SessionState::Anonymous);
    }
}
