mod calculators;
pub mod protocol;
mod server;

pub use calculators::{calculator_definitions, run_calculator};
pub use server::{router, serve, start, AppState, ServerOptions, DEFAULT_HISTORY_LIMIT};
