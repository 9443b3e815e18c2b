//! Terminal front end: scripted-or-interactive prompts and the command set of
//! `habit_core_cli`.

pub mod commands;
pub mod output;
pub mod prompter;
pub mod ui;

pub use commands::run_cli;
pub use prompter::TerminalPrompter;
