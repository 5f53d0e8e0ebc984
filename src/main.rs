use std::process;

use clap::Parser;

use org_secrets::app::App;
use org_secrets::cli::Cli;
use org_secrets::config::Config;
use org_secrets::error;
use org_secrets::logging::{self, LogSettings};
use org_secrets::paths;

#[tokio::main]
async fn main() {
    paths::load_env_file();
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            error::report(&anyhow::Error::new(err));
            process::exit(1);
        }
    };

    logging::init(&LogSettings {
        debug: cli.debug,
        configured_level: Some(config.log.level.clone()),
    });

    if let Err(err) = App::run(cli, config).await {
        error::report(&err);
        process::exit(1);
    }
}
