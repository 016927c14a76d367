//! `grading-admin` command arguments.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// `grading-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "grading-admin",
    about = "Administer directions and events of the grading API",
    version
)]
pub struct CliArgs {
    /// Command to run; without one the client points at the login entry.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Exchange a username and password for a stored session.
    Login {
        /// Account name.
        #[arg(long, value_name = "name")]
        username: String,
        /// Account password.
        #[arg(long, value_name = "password")]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Create an account.
    Register {
        /// Account name.
        #[arg(long, value_name = "name")]
        username: String,
        /// Account password.
        #[arg(long, value_name = "password")]
        password: String,
        /// Password confirmation; must equal `--password`.
        #[arg(long = "confirm", value_name = "password")]
        confirmation: String,
    },
    /// Show the signed-in user.
    Whoami,
    /// Open the dashboard of a non-admin user.
    Dashboard,
    /// Manage directions (admins only).
    Directions {
        /// Directions action.
        #[command(subcommand)]
        action: DirectionsCommand,
    },
    /// Manage events.
    Events {
        /// Events action.
        #[command(subcommand)]
        action: EventsCommand,
    },
}

/// Actions on the directions board.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum DirectionsCommand {
    /// List directions, optionally filtered by name.
    List {
        /// Name fragment to search for.
        #[arg(long, value_name = "text")]
        search: Option<String>,
    },
    /// Create a direction.
    Add {
        /// Direction name.
        #[arg(long, value_name = "name")]
        name: String,
        /// Number of semesters.
        #[arg(long, value_name = "count", allow_negative_numbers = true)]
        semesters: i64,
    },
    /// Open the semester view of a direction.
    Open {
        /// Direction identifier.
        #[arg(long, value_name = "id")]
        id: i64,
    },
}

/// Actions on events.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum EventsCommand {
    /// Create an event.
    Add {
        /// Event title.
        #[arg(long, value_name = "title")]
        title: String,
        /// Event description.
        #[arg(long, value_name = "text", default_value = "")]
        description: String,
        /// Event date as `YYYY-MM-DD`.
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
        date: NaiveDate,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|error| format!("date must be YYYY-MM-DD: {error}"))
}
