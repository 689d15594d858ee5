#![forbid(unsafe_code)]

mod app;
mod cli;
mod composite;
mod logging;
mod tools;
mod watchers;

use std::error::Error;

use clap::Parser;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = cli::Cli::parse();
    logging::init(cli.log_level.into());
    let mut app = app::App::new(&cli)?;
    app.run(cli.frames, cli.watch);
    Ok(())
}
