//! Maps parsed commands onto use cases and renders their outcome as text.

use std::sync::Arc;

use crate::domain::ports::{CredentialStore, Navigator};
use crate::domain::session_service::{registration_error_message, LOGIN_FAILED};
use crate::domain::{
    DirectionsBoard, EventsService, FormError, GradingApi, GuardOutcome, NewDirection, NewEvent,
    SessionService, SessionState,
};

use super::args::{Command, DirectionsCommand, EventsCommand};

const LOGOUT_FAILED: &str = "Logout failed.";
const WHOAMI_FAILED: &str = "Could not identify the current user.";
const NOT_LOGGED_IN: &str = "Not logged in.";

/// Text produced by one command and whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Lines to print, in order.
    pub lines: Vec<String>,
    /// Whether the command achieved what was asked.
    pub succeeded: bool,
}

impl Report {
    fn ok(lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
            succeeded: true,
        }
    }

    fn failed(lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
            succeeded: false,
        }
    }

    fn form_failure(error: &FormError) -> Self {
        let mut lines = error
            .fields
            .iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |message| format!("{field}: {message}"))
            })
            .collect::<Vec<_>>();
        if lines.is_empty() || error.source.detail().is_some() {
            lines.push(error.message.clone());
        }
        Self::failed(lines)
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> u8 {
        if self.succeeded { 0 } else { 1 }
    }
}

/// Runs one command against the use cases.
pub struct CommandRunner {
    session: SessionService,
    board: DirectionsBoard,
    events: EventsService,
}

impl CommandRunner {
    /// Wire every use case to the shared API facade, store, and navigator.
    pub fn new(
        api: Arc<GradingApi>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session: SessionService::new(api.clone(), store, navigator.clone()),
            board: DirectionsBoard::new(api.clone(), navigator.clone()),
            events: EventsService::new(api, navigator),
        }
    }

    /// Run `command`; `None` shows the entry page.
    pub async fn run(&mut self, command: Option<Command>) -> Report {
        match command {
            None => {
                let destination = self.session.welcome();
                Report::ok([format!("Continue at {destination}.")])
            }
            Some(Command::Login { username, password }) => self.login(&username, &password).await,
            Some(Command::Logout) => match self.session.logout() {
                Ok(()) => Report::ok(["Logged out.".to_owned()]),
                Err(error) => Report::failed([error.display_message(LOGOUT_FAILED)]),
            },
            Some(Command::Register {
                username,
                password,
                confirmation,
            }) => {
                match self
                    .session
                    .register(&username, &password, &confirmation)
                    .await
                {
                    Ok(account) => Report::ok([format!(
                        "Registered {}. Please log in.",
                        account.username
                    )]),
                    Err(error) => Report::failed([registration_error_message(&error)]),
                }
            }
            Some(Command::Whoami) => self.whoami().await,
            Some(Command::Dashboard) => self.dashboard().await,
            Some(Command::Directions { action }) => self.directions(action).await,
            Some(Command::Events { action }) => self.events(action).await,
        }
    }

    async fn login(&self, username: &str, password: &str) -> Report {
        match self.session.login(username, password).await {
            Ok(outcome) => Report::ok([
                format!(
                    "Logged in as {} ({}).",
                    outcome.user.display_name(),
                    outcome.user.role
                ),
                format!("Continue at {}.", outcome.destination),
            ]),
            Err(error) => Report::failed([error.display_message(LOGIN_FAILED)]),
        }
    }

    async fn whoami(&self) -> Report {
        if self.session.state() == SessionState::Anonymous {
            return Report::failed([NOT_LOGGED_IN.to_owned()]);
        }
        match self.session.current_user().await {
            Ok(user) => Report::ok([format!("{} ({})", user.display_name(), user.role)]),
            Err(error) => Report::failed([error.display_message(WHOAMI_FAILED)]),
        }
    }

    async fn dashboard(&self) -> Report {
        match self.session.guard_dashboard().await {
            GuardOutcome::Allow(user) => Report::ok([
                user.role.dashboard_heading().to_owned(),
                format!("Signed in as {}.", user.display_name()),
            ]),
            GuardOutcome::Redirect(destination) => {
                Report::ok([format!("Continue at {destination}.")])
            }
        }
    }

    async fn directions(&mut self, action: DirectionsCommand) -> Report {
        if let GuardOutcome::Redirect(destination) = self.session.guard_admin_area().await {
            return Report::failed([
                "The directions board is for admins only.".to_owned(),
                format!("Continue at {destination}."),
            ]);
        }
        match action {
            DirectionsCommand::List { search } => {
                let listed = match search {
                    Some(query) => self.board.search(&query).await,
                    None => self.board.load().await,
                };
                match listed {
                    Ok([]) => Report::ok(["No directions found.".to_owned()]),
                    Ok(directions) => Report::ok(directions.iter().map(|direction| {
                        format!(
                            "{}\t{}\t{} semesters",
                            direction.id, direction.name, direction.semesters
                        )
                    })),
                    Err(error) => Report::form_failure(&error),
                }
            }
            DirectionsCommand::Add { name, semesters } => {
                match self.board.create(&NewDirection::new(name, semesters)).await {
                    Ok(created) => Report::ok([format!(
                        "Added direction {}: {} ({} semesters).",
                        created.id, created.name, created.semesters
                    )]),
                    Err(error) => Report::form_failure(&error),
                }
            }
            DirectionsCommand::Open { id } => {
                let destination = self.board.open(id);
                Report::ok([format!("Continue at {destination}.")])
            }
        }
    }

    async fn events(&self, action: EventsCommand) -> Report {
        match action {
            EventsCommand::Add {
                title,
                description,
                date,
            } => match self
                .events
                .create_event(&NewEvent::new(title, description, date))
                .await
            {
                Ok(event) => Report::ok([format!(
                    "Added event {}: {} on {}.",
                    event.id, event.title, event.date
                )]),
                Err(error) => Report::form_failure(&error),
            },
        }
    }
}
