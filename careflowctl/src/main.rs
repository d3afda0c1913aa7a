use careflowctl::cli::{print_completions, Cli, Commands};
use careflowctl::commands;
use careflowctl::context::{AppContext, ServerSettings};
use careflowctl::utils::tracing_layer::UiLayer;
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Completion(cmd) = &cli.command {
        let mut cli_cmd = Cli::command();
        print_completions(cmd.shell, &mut cli_cmd);
        return Ok(());
    }

    let app_context = AppContext::new(ServerSettings {
        server: cli.server.clone(),
    })?;

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(UiLayer::new(app_context.ui().clone()).with_location(cli.debug))
        .with(filter)
        .init();

    info!("Running command {:?} ...", &cli.command);

    let result = match &cli.command {
        Commands::AuthLogin(cmd) => commands::auth::auth_login(&app_context, cmd).await,
        Commands::AuthRegister(cmd) => commands::auth::auth_register(&app_context, cmd).await,
        Commands::AuthLogout => commands::auth::auth_logout(&app_context).await,
        Commands::AuthStatus => commands::auth::auth_status(&app_context).await,
        Commands::AuthRefresh => commands::auth::auth_refresh(&app_context).await,
        Commands::AccessPermissions => commands::access::my_permissions(&app_context).await,
        Commands::AccessCheck(request) => {
            commands::access::check_access(&app_context, request).await
        }
        Commands::AccessRoute(cmd) => commands::access::route_access(&app_context, cmd).await,
        Commands::AccessNavigation => commands::access::navigation(&app_context).await,
        Commands::AdminPermissionsList => commands::admin::list_permissions(&app_context).await,
        Commands::AdminRolesList => commands::admin::list_roles(&app_context).await,
        Commands::AdminRolesCreate(cmd) => commands::admin::create_role(&app_context, cmd).await,
        Commands::AdminUsersList => commands::admin::list_users(&app_context).await,
        Commands::AdminUsersCreate(cmd) => commands::admin::create_user(&app_context, cmd).await,
        Commands::AdminUsersRole(cmd) => commands::admin::set_user_role(&app_context, cmd).await,
        Commands::AdminUsersSuspend(cmd) => {
            commands::admin::set_user_status(&app_context, cmd, false).await
        }
        Commands::AdminUsersActivate(cmd) => {
            commands::admin::set_user_status(&app_context, cmd, true).await
        }
        Commands::AdminUsersDisablePermissions(cmd) => {
            commands::admin::disable_permissions(&app_context, cmd).await
        }
        Commands::Completion(_) => Ok(()),
    };

    // Clear the UI status line before returning (success or error)
    app_context.ui().clear();

    result
}
