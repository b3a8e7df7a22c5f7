use std::sync::Arc;

use clap::Parser;

use snaplink::cli::{Cli, Commands, ConfigCommands};
use snaplink::config::AppConfig;
use snaplink::runtime::{run_config_generate, run_server, run_token};
use snaplink::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = Arc::new(AppConfig::load(config_path));
            // guard 必须活到进程退出，否则缓冲中的日志会丢
            let _log_guard = init_logging(&config.logging)?;
            run_server(config).await
        }
        Commands::Token { user, minutes } => {
            let config = AppConfig::load(config_path);
            run_token(&config, &user, minutes)
        }
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                run_config_generate(output_path, force)
            }
        },
    }
}
