use clap::Parser;
use sheetchat::api::ApiClient;
use sheetchat::cli::{self, Cli, Command};
use sheetchat::config::Config;
use sheetchat::store::{ChatStore, FileSessionStorage, StoreOptions};
use sheetchat::utils::{init_file_logger, init_stderr_logger};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?.with_overrides(cli.api_url.clone(), cli.session.clone())?;

    let command = cli.command();
    if command == Command::Tui {
        let _guard = init_file_logger(&config.log)?;
        info!("Configuration loaded: {:?}", config.api);
        return sheetchat::tui::run(config).await;
    }

    init_stderr_logger(&config.log)?;
    info!("Configuration loaded: {:?}", config.api);

    let gateway = ApiClient::from_config(&config.api);
    let storage = Arc::new(FileSessionStorage::from_config(&config));
    let mut store = ChatStore::new(storage, &StoreOptions::from_config(&config));

    let mut stdout = std::io::stdout();
    cli::execute(command, &config, &gateway, &mut store, &mut stdout).await
}
