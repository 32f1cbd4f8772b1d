//! Slash commands for interactive mode

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Clear the conversation and the analysis panel
    Clear,
    /// Run a health check now
    CheckHealth,
    /// Show a message to the user
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse a slash command. Returns `None` for ordinary utterances.
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let command = input.trim().strip_prefix('/')?;
    let name = command
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some(match name.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),
        "clear" | "c" => CommandResult::Clear,
        "health" | "status" => CommandResult::CheckHealth,
        "quit" | "exit" | "q" => CommandResult::Exit,
        _ => CommandResult::Unknown(name),
    })
}

/// Text shown for an unknown command
pub fn unknown_message(name: &str) -> String {
    format!("Unknown command: /{}\nType /help for available commands.", name)
}

pub fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /clear, /c           Clear the conversation and analysis panel
  /health              Check the server connection now
  /quit, /exit, /q     Exit vintent

Anything else is sent for intent analysis, e.g.
  tôi muốn đặt bàn cho hai người tối nay"#
        .to_string()
}
