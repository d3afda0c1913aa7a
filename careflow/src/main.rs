use careflow::app_state::AppState;
use careflow::http::setup_http_server;
use careflow::init_telemetry::init_telemetry_and_tracing;
use careflow::settings::config::Settings;
use careflow::settings::load_env_files;
use std::path::Path;
use careflow::tasks::session_cleanup::setup_session_cleanup;
use tokio::time::sleep;
use tracing::info;

use clap::Parser;

#[derive(Parser)]
#[command(name = "careflow")]
#[command(about = "Role based access control server for the careflow EHR")]
#[clap(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
enum Commands {
    /// Show current configuration and exit
    Config,
    /// Start the careflow server (default)
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_files(Path::new("."));

    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Config => {
            let settings = Settings::new()?;
            println!("{:#?}", &settings);
            return Ok(());
        }
        Commands::Run => {
            // Continue with the normal server startup
        }
    }

    let mut handles = vec![];

    let app_state = AppState::new().await?;
    init_telemetry_and_tracing(app_state.settings.debug)?;

    // Setup http server.
    {
        let handle =
            setup_http_server(app_state.clone(), &app_state.settings.api.bind_address).await?;
        handles.push(handle);
    }

    // Expired sessions are dropped in the background
    {
        let handle = setup_session_cleanup(app_state.clone());
        handles.push(handle);
    }

    sleep(std::time::Duration::from_millis(100)).await;

    loop {
        // Remove and await completed handles
        handles.retain(|handle| !handle.is_finished());

        // Break the loop if no more handles are running
        if handles.is_empty() {
            info!("All tasks are done");
            break;
        }

        // Sleep for a short duration to avoid busy-waiting
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    }

    Ok(())
}
