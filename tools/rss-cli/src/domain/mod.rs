//! Domain models for the studio front-end.

mod app;
mod command;

pub use app::{App, AppState, Controls};
pub use command::{parse_rate, Command, CommandError, Setting, ThemeChoice};
