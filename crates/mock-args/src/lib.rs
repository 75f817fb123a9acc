//! Arguments shared by every experiment-mock command.
//!
//! Each `mock-*` subcommand flattens [`CommonMockArgs`] so the window and
//! mode flags behave the same everywhere.

pub mod args;

pub use args::{parse_start_date, CommonMockArgs};
