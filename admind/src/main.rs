//! admind Server Entry Point

use admind::cli::{Cli, Commands};
use admind::config::ServerConfig;
use admind::{bootstrap, logging, server};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init().expect("failed to initialize logging");

    let mut config = ServerConfig::from_env();
    if let Some(Commands::Serve(args)) = cli.command {
        config.host = args.host;
        config.port = args.port;
    }

    let state = bootstrap::initialize(&config).await;
    server::run(state, &config.bind_addr()).await;
}
