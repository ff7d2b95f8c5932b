//! Slash command parsing for the chat front end.
//!
//! Commands control the session locally and are never sent to the model.
//! They mirror the original page's sidebar actions: clearing the
//! conversation and exporting the transcript.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Export the conversation in the given format ("txt" or "json").
    Export(String),

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use edulingo::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/export txt").is_some());
/// assert!(parse_command("What is the past tense of go?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "export" => match argument {
            Some(format) => ChatCommand::Export(format.to_string()),
            None => ChatCommand::Export("txt".to_string()),
        },
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns the help text describing available commands.
pub fn help_text() -> &'static str {
    "Available commands:\n\
     /clear            清空当前对话\n\
     /export [格式]    导出对话记录 (txt 或 json，默认 txt)\n\
     /stats            显示会话统计\n\
     /help             显示本帮助\n\
     /quit             退出"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_messages_are_not_commands() {
        assert!(parse_command("Hello").is_none());
        assert!(parse_command("how do I use /quit in a sentence").is_none());
        assert!(parse_command("").is_none());
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn export_defaults_to_txt() {
        assert_eq!(
            parse_command("/export"),
            Some(ChatCommand::Export("txt".to_string()))
        );
        assert_eq!(
            parse_command("/export json"),
            Some(ChatCommand::Export("json".to_string()))
        );
        // Format validation happens in the store, not the parser.
        assert_eq!(
            parse_command("/export xml"),
            Some(ChatCommand::Export("xml".to_string()))
        );
    }

    #[test]
    fn unknown_commands_are_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn commands_are_case_insensitive_and_trimmed() {
        assert_eq!(parse_command("  /CLEAR  "), Some(ChatCommand::Clear));
    }
}
