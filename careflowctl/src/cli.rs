use careflow_core::admin::requests::{CheckAccessRequest, CreateRoleRequest, CreateUserRequest};
use clap::{Command, Parser, Subcommand};
use clap_complete::{generate, Generator, Shell};

#[derive(Parser)]
#[command(name = "careflowctl")]
#[command(about = "Manage access control of a careflow server")]
#[command(version)]
pub struct Cli {
    #[arg(long, env = "CAREFLOW_SERVER", default_value = "http://localhost:21342")]
    pub server: String,

    /// Print debug logs including their source location
    #[arg(long, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    #[command(name = "auth:login")]
    AuthLogin(AuthLoginCommand),

    /// Create a patient account and log in with it
    #[command(name = "auth:register")]
    AuthRegister(AuthRegisterCommand),

    /// Logout and clear the stored session
    #[command(name = "auth:logout")]
    AuthLogout,

    /// Show the logged in user
    #[command(name = "auth:status")]
    AuthStatus,

    /// Exchange the refresh token for a new token pair
    #[command(name = "auth:refresh")]
    AuthRefresh,

    /// List the effective permissions of the logged in user
    #[command(name = "access:permissions")]
    AccessPermissions,

    /// Check permissions of the logged in user
    #[command(name = "access:check")]
    AccessCheck(CheckAccessRequest),

    /// Show whether the logged in user may open a page
    #[command(name = "access:route")]
    AccessRoute(RouteCommand),

    /// Show the sidebar entries visible to the logged in user
    #[command(name = "access:nav")]
    AccessNavigation,

    /// List the permission catalog
    #[command(name = "admin:permissions:list")]
    AdminPermissionsList,

    /// List all roles with their permissions
    #[command(name = "admin:roles:list")]
    AdminRolesList,

    /// Create a new role
    #[command(name = "admin:roles:create")]
    AdminRolesCreate(CreateRoleRequest),

    /// List all user accounts
    #[command(name = "admin:users:list")]
    AdminUsersList,

    /// Create a staff account
    #[command(name = "admin:users:create")]
    AdminUsersCreate(CreateUserRequest),

    /// Move a user to another role
    #[command(name = "admin:users:role")]
    AdminUsersRole(UserRoleCommand),

    /// Suspend a user account
    #[command(name = "admin:users:suspend")]
    AdminUsersSuspend(UserCommand),

    /// Reactivate a suspended user account
    #[command(name = "admin:users:activate")]
    AdminUsersActivate(UserCommand),

    /// Withhold permissions from a user regardless of their role
    #[command(name = "admin:users:disable-permissions")]
    AdminUsersDisablePermissions(DisablePermissionsCommand),

    /// Show shell completion script.
    #[command(name = "completion")]
    Completion(CompletionCommand),
}

#[derive(Debug, Parser)]
pub struct CompletionCommand {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Parser)]
pub struct AuthLoginCommand {
    /// Email address of the account
    pub email: String,

    #[arg(long, env = "CAREFLOW_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Parser)]
pub struct AuthRegisterCommand {
    pub email: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, env = "CAREFLOW_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Parser)]
pub struct RouteCommand {
    /// Page path, e.g. /patients/42
    pub path: String,
}

#[derive(Debug, Parser)]
pub struct UserCommand {
    /// Id or email address of the user
    pub user: String,
}

#[derive(Debug, Parser)]
pub struct UserRoleCommand {
    /// Id or email address of the user
    pub user: String,

    /// Name of the new role
    pub role: String,
}

#[derive(Debug, Parser)]
pub struct DisablePermissionsCommand {
    /// Id or email address of the user
    pub user: String,

    /// Permissions to withhold (comma-separated). Pass an empty list to
    /// restore the role's permissions.
    #[arg(value_delimiter = ',', num_args = 0..)]
    pub permissions: Vec<String>,
}

pub fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use careflow_core::authorization::CheckMode;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_access_check() {
        let cli = Cli::try_parse_from([
            "careflowctl",
            "--server",
            "https://ehr.example.com",
            "access:check",
            "view_lab_orders,edit_lab_orders",
            "--mode",
            "all",
        ])
        .unwrap();

        assert_eq!(cli.server, "https://ehr.example.com");
        match cli.command {
            Commands::AccessCheck(request) => {
                assert_eq!(request.permissions, vec!["view_lab_orders", "edit_lab_orders"]);
                assert_eq!(request.mode, CheckMode::All);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_disable_permissions_without_list() {
        let cli = Cli::try_parse_from([
            "careflowctl",
            "admin:users:disable-permissions",
            "doctor@careflow.test",
        ])
        .unwrap();

        match cli.command {
            Commands::AdminUsersDisablePermissions(cmd) => {
                assert_eq!(cmd.user, "doctor@careflow.test");
                assert!(cmd.permissions.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
