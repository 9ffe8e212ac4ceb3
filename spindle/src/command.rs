//! Command extraction from chat messages.

/// A command parsed from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// The command name, without the prefix.
    pub name: &'a str,
    /// Everything after the name, trimmed. May be empty.
    pub text: &'a str,
}

/// Parse `content` as `<prefix><name> <text>`.
///
/// Returns `None` for empty content, content without the prefix, or a bare
/// prefix.
pub fn parse_command<'a>(prefix: &str, content: &'a str) -> Option<ParsedCommand<'a>> {
    let rest = content.strip_prefix(prefix)?;
    let (name, text) = match rest.split_once(char::is_whitespace) {
        Some((name, text)) => (name, text.trim()),
        None => (rest, ""),
    };
    if name.is_empty() {
        return None;
    }
    Some(ParsedCommand { name, text })
}
