use anyhow::Error as Anyhow;
use clap::Parser;

mod applet;
mod cli;
mod hub;
mod io;
mod session;

#[tokio::main]
async fn main() -> Result<(), Anyhow> {
    cli::Cli::parse().execute().await
}
