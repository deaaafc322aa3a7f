use std::fmt;

/// Command names the query responds to; a leading `/` is optional.
pub const COMMAND_ALIASES: [&str; 3] = ["网课查询", "查网课", "netcourse"];

pub const USAGE_TEXT: &str = "😅 请输入手机号或学号进行查询：网课查询 [手机号/学号]";
pub const NOT_DIGITS_TEXT: &str = "📵 输入内容错误，请确保输入仅包含数字！";
pub const UNKNOWN_COMMAND_TEXT: &str = "❓ 未知指令，请使用：网课查询 [手机号/学号]";

/// A validated, digits-only student or phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: &'static str,
}

impl ParseError {
    fn new(message: &'static str) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &str {
        self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses `<command> <identifier...>`.
///
/// Argument tokens are concatenated, so `网课查询 138 0013 8000` queries
/// `13800138000`.
pub fn parse_query(line: &str) -> Result<Identifier, ParseError> {
    let mut tokens = line.split_whitespace();
    let Some(command) = tokens.next() else {
        return Err(ParseError::new(USAGE_TEXT));
    };
    if !is_query_command(command) {
        return Err(ParseError::new(UNKNOWN_COMMAND_TEXT));
    }

    let args: Vec<&str> = tokens.collect();
    if args.is_empty() {
        return Err(ParseError::new(USAGE_TEXT));
    }

    let identifier = args.concat();
    let identifier = identifier.trim();
    if identifier.is_empty() || !identifier.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ParseError::new(NOT_DIGITS_TEXT));
    }

    Ok(Identifier(identifier.to_string()))
}

pub fn is_query_command(token: &str) -> bool {
    let name = token.strip_prefix('/').unwrap_or(token);
    COMMAND_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(name))
}
