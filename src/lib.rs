pub mod api;
pub mod catalog;
pub mod cli;
pub mod model;
pub mod runtime;
pub mod session;
pub mod store;

pub fn run_cli() -> runtime::Result<()> {
    cli::run_cli()
}
