use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "netcourse")]
#[command(
    about = "Query online-course task status for a student or phone number",
    long_about = "Query online-course task status for a student or phone number\n\nUsage:\n  netcourse 网课查询 13800138000   handle one message and exit\n  netcourse                        read one message per line from stdin\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/netcourse/config.toml\n    2. ~/.config/netcourse/config.toml"
)]
pub struct CliArgs {
    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug events and the redacted HTTP exchange to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Chat message to handle, e.g. `网课查询 13800138000`.
    #[arg(value_name = "MESSAGE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub message: Vec<String>,
}

impl CliArgs {
    /// The message words joined back into one chat line.
    pub fn message_line(&self) -> Option<String> {
        if self.message.is_empty() {
            None
        } else {
            Some(self.message.join(" "))
        }
    }
}
