pub mod commands;
pub mod delivery;
pub mod handler;

pub use commands::{COMMAND_ALIASES, Identifier, ParseError, parse_query};
pub use delivery::{Channel, Delivery, DeliverySink};
pub use handler::QueryHandler;
