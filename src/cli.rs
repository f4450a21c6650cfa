mod runner;
mod types;


pub use runner::{execute, run_cli};
pub use types::{Cli, Commands, PayloadArgs};
