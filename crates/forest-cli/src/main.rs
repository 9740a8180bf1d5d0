mod config;
mod error;
mod run;

use clap::Parser;
use config::{Cli, RunConfig};

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.clone())).init();

    let result = RunConfig::from_cli(cli)
        .map_err(error::CliError::from)
        .and_then(run::execute);

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
