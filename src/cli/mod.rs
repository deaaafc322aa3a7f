mod args;
mod console;

pub use args::CliArgs;
pub use console::{ConsoleSink, run_console};
