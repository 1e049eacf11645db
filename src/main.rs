//! tab-capture CLI entry point

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use tab_capture::cli::{
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging,
    presenter::Presenter,
    resize_cmd::handle_resize_command,
    state_cmd::handle_state_command,
    EXIT_ERROR,
};
use tab_capture::infrastructure::{JsonStateStore, RasterResizer, XdgSettingsStore};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    let presenter = Presenter::new();

    let result = match cli.command {
        Commands::Config { action } => {
            let store = XdgSettingsStore::new();
            handle_config_command(action, &store, &presenter)
                .await
                .map_err(|e| e.to_string())
        }
        Commands::Resize(args) => {
            let store = XdgSettingsStore::new();
            let resizer = Arc::new(RasterResizer::new());
            handle_resize_command(args, &store, resizer, &presenter)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
        Commands::State { action } => {
            let store = JsonStateStore::new();
            handle_state_command(action, &store, &presenter)
                .await
                .map_err(|e| e.to_string())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            presenter.error(&message);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
