//! Admin directions board: list, search, create, and open directions.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::grading_api::GradingApi;
use crate::domain::ports::{Destination, DirectionId, Navigator};
use crate::domain::{ApiError, Direction, FormError, NewDirection};

/// Fallback message when the initial load fails.
pub const FETCH_FAILED: &str = "Failed to fetch directions.";
/// Fallback message when a search fails.
pub const SEARCH_FAILED: &str = "Failed to search directions.";
/// Fallback message when creating a direction fails.
pub const CREATE_FAILED: &str = "Failed to add direction.";

/// Loaded directions plus the operations the admin area offers on them.
pub struct DirectionsBoard {
    api: Arc<GradingApi>,
    navigator: Arc<dyn Navigator>,
    directions: Vec<Direction>,
}

impl DirectionsBoard {
    /// Create an empty board.
    pub fn new(api: Arc<GradingApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            navigator,
            directions: Vec::new(),
        }
    }

    /// Directions currently shown.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Fetch the full list, replacing what is shown.
    pub async fn load(&mut self) -> Result<&[Direction], FormError> {
        match self.api.list_directions(None).await {
            Ok(directions) => Ok(self.replace(directions)),
            Err(error) => Err(self.fail(error, FETCH_FAILED, true)),
        }
    }

    /// Fetch directions matching `query`; a blank query lists everything.
    pub async fn search(&mut self, query: &str) -> Result<&[Direction], FormError> {
        match self.api.list_directions(Some(query)).await {
            Ok(directions) => Ok(self.replace(directions)),
            Err(error) => Err(self.fail(error, SEARCH_FAILED, false)),
        }
    }

    /// Validate and submit a new direction, appending it on success.
    ///
    /// Local validation failures are reported for every field at once and
    /// leave the list untouched without calling the API.
    pub async fn create(&mut self, direction: &NewDirection) -> Result<Direction, FormError> {
        if let Err(fields) = direction.validate() {
            return Err(FormError::from_api(
                ApiError::InvalidInput { fields },
                CREATE_FAILED,
            ));
        }
        match self.api.create_direction(direction).await {
            Ok(created) => {
                info!(id = created.id, name = %created.name, "direction created");
                self.directions.push(created.clone());
                Ok(created)
            }
            Err(error) => Err(self.fail(error, CREATE_FAILED, true)),
        }
    }

    /// Move to the semester view of one direction.
    pub fn open(&self, id: DirectionId) -> Destination {
        let destination = Destination::DirectionSemesters(id);
        self.navigator.navigate(destination);
        destination
    }

    fn replace(&mut self, directions: Vec<Direction>) -> &[Direction] {
        debug!(count = directions.len(), "directions board refreshed");
        self.directions = directions;
        &self.directions
    }

    fn fail(&self, error: ApiError, fallback: &str, leave_on_401: bool) -> FormError {
        if leave_on_401 && error.is_unauthenticated() {
            self.navigator.navigate(Destination::Login);
        }
        FormError::from_api(error, fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        ApiResponse, InMemoryCredentialStore, MockHttpTransport, MockTokenRefresher,
        RecordingNavigator, RefreshError, TransportError,
    };
    use crate::domain::session_client::SessionClient;
    use crate::domain::{AccessToken, CredentialPair, RefreshToken};
    use rstest::rstest;
    use serde_json::json;

    fn board(transport: MockHttpTransport) -> (DirectionsBoard, Arc<RecordingNavigator>) {
        board_with_refresher(transport, MockTokenRefresher::new())
    }

    fn board_with_refresher(
        transport: MockHttpTransport,
        refresher: MockTokenRefresher,
    ) -> (DirectionsBoard, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let store = InMemoryCredentialStore::with_pair(CredentialPair::new(
            AccessToken::new("access").expect("valid access"),
            RefreshToken::new("refresh").expect("valid refresh"),
        ));
        let session = SessionClient::new(
            Arc::new(transport),
            Arc::new(store),
            Arc::new(refresher),
            navigator.clone(),
        );
        let api = Arc::new(GradingApi::new(
            Arc::new(session),
            Arc::new(MockHttpTransport::new()),
        ));
        (DirectionsBoard::new(api, navigator.clone()), navigator)
    }

    fn listing() -> serde_json::Value {
        json!([
            {"id": 1, "name": "Mathematics", "semesters": 8},
            {"id": 2, "name": "Physics", "semesters": 8}
        ])
    }

    #[rstest]
    #[tokio::test]
    async fn load_replaces_the_list() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, listing())));
        let (mut board, _) = board(transport);

        let shown = board.load().await.expect("load succeeds");
        assert_eq!(shown.len(), 2);
        assert_eq!(board.directions()[0].name, "Mathematics");
    }

    #[rstest]
    #[case(r#"{"detail":"Server is busy"}"#, 500, "Server is busy")]
    #[case("", 500, FETCH_FAILED)]
    #[case("", 403, FETCH_FAILED)]
    #[tokio::test]
    async fn load_failure_uses_detail_or_fallback(
        #[case] body: &'static str,
        #[case] status: u16,
        #[case] expected: &str,
    ) {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(move |_| Err(TransportError::status(status, body)));
        let (mut board, navigator) = board(transport);

        let err = board.load().await.expect_err("load fails");
        assert_eq!(err.message, expected);
        assert!(navigator.history().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn load_with_dead_session_lands_on_login() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(TransportError::status(401_u16, "")));
        let mut refresher = MockTokenRefresher::new();
        refresher
            .expect_refresh()
            .times(1)
            .returning(|_| Err(RefreshError::rejected(401_u16)));
        let (mut board, navigator) = board_with_refresher(transport, refresher);

        let err = board.load().await.expect_err("load fails");
        assert!(err.is_unauthenticated());
        assert_eq!(navigator.last(), Some(Destination::Login));
    }

    #[rstest]
    #[tokio::test]
    async fn search_failure_uses_its_own_fallback() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(TransportError::decode("truncated")));
        let (mut board, _) = board(transport);

        let err = board.search("math").await.expect_err("search fails");
        assert_eq!(err.message, SEARCH_FAILED);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_direction_reports_every_field_and_keeps_list() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, listing())));
        let (mut board, _) = board(transport);
        board.load().await.expect("load succeeds");

        let err = board
            .create(&NewDirection::new("   ", 0))
            .await
            .expect_err("invalid");

        assert_eq!(err.fields["name"], vec![crate::domain::directions::NAME_REQUIRED]);
        assert_eq!(
            err.fields["semesters"],
            vec![crate::domain::directions::SEMESTERS_POSITIVE]
        );
        assert_eq!(board.directions().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn created_direction_is_appended() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.body() == Some(&json!({"name": "Chemistry", "semesters": 8}))
            })
            .times(1)
            .returning(|_| {
                Ok(ApiResponse::new(
                    201,
                    json!({"id": 3, "name": "Chemistry", "semesters": 8}),
                ))
            });
        let (mut board, _) = board(transport);

        let created = board
            .create(&NewDirection::new(" Chemistry ", 8))
            .await
            .expect("created");
        assert_eq!(created.id, 3);
        assert_eq!(board.directions(), &[created][..]);
    }

    #[rstest]
    #[tokio::test]
    async fn server_field_errors_are_surfaced_per_field() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| {
            Err(TransportError::status(
                400_u16,
                r#"{"name":["direction with this name already exists."],"semesters":["Too many."]}"#,
            ))
        });
        let (mut board, _) = board(transport);

        let err = board
            .create(&NewDirection::new("Mathematics", 80))
            .await
            .expect_err("rejected");
        assert_eq!(err.fields.len(), 2);
        assert_eq!(err.message, CREATE_FAILED);
        assert!(board.directions().is_empty());
    }

    #[rstest]
    fn open_navigates_to_semesters() {
        let (board, navigator) = board(MockHttpTransport::new());
        assert_eq!(board.open(5), Destination::DirectionSemesters(5));
        assert_eq!(navigator.history(), vec![Destination::DirectionSemesters(5)]);
    }
}
