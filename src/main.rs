use clap::Parser;
use tracing::debug;

use postpulse::cli::Cli;
use postpulse::runtime::modes::{self, Mode};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    postpulse::config::init_config_from(&cli.config);
    let config = postpulse::config::get_config();

    match modes::detect_mode(cli.command.as_ref()) {
        Mode::Server => {
            // guard 必须活到进程结束
            let _guard = postpulse::system::init_logging(&config.logging)?;
            debug!("Running in server mode");
            modes::run_server().await
        }
        Mode::Cli => {
            let Some(command) = cli.command else {
                return Ok(());
            };
            if modes::run_cli(command).await.is_err() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
