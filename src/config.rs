// ABOUTME: Configuration and constants for the Chi interpreter
// This module contains version info, the REPL greeting, and file conventions

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension accepted by the batch runner.
pub const EXTENSION: &str = ".chi";

/// Prompt printed before every REPL line.
pub const PROMPT: &str = ">> ";

pub const WELCOME_MESSAGE: &str = "This is the Chi programming language!";

pub const USAGE: &str = "Usage: chi <filename>.chi";
