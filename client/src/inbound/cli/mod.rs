//! Command-line adapter: argument parsing, console navigation, and the
//! runner that maps commands onto use cases.

mod args;
mod navigator;
mod runner;

pub use args::{CliArgs, Command, DirectionsCommand, EventsCommand};
pub use navigator::ConsoleNavigator;
pub use runner::{CommandRunner, Report};
