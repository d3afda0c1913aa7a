use careflow_core::admin::requests::{
    CreateRoleRequest, CreateUserRequest, DisablePermissionsRequest, UpdateUserRoleRequest,
    UpdateUserStatusRequest,
};
use careflow_core::admin::responses::{
    PermissionsListResponse, RolesListResponse, UserSummary, UsersListResponse,
};
use careflow_types::RoleInfo;
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};
use uuid::Uuid;

use crate::api::{get, post, put};
use crate::cli::{DisablePermissionsCommand, UserCommand, UserRoleCommand};
use crate::context::AppContext;
use crate::utils::formatting::{colored_status, format_permissions};

/// Accepts a user id or an email address.
pub async fn resolve_user(app_context: &AppContext, user: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(user) {
        return Ok(id);
    }

    let response: UsersListResponse = get(app_context, "authenticated/admin/users").await?;
    response
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(user))
        .map(|u| u.id)
        .ok_or_else(|| anyhow::anyhow!("No user with email {}", user))
}

fn users_table(users: &[UserSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(vec!["Email", "Name", "Role", "Status", "Disabled", "Id"]);

    for user in users {
        builder.push_record(vec![
            user.email.clone(),
            format!("{} {}", user.first_name, user.last_name),
            user.role.clone(),
            colored_status(user.is_active),
            format_permissions(&user.disabled_permissions),
            user.id.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

pub async fn list_permissions(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Getting permission catalog from {} ...",
        app_context.server().server
    ));
    ui.run(move || async move {
        let response: PermissionsListResponse =
            get(app_context, "authenticated/admin/permissions").await?;

        let mut builder = Builder::default();
        builder.push_record(vec!["Permission", "Category", "Description"]);
        for permission in &response.permissions {
            builder.push_record(vec![
                permission.name.as_str(),
                permission.category.label(),
                permission.description.as_str(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        app_context.ui().success(format!(
            "{} permissions in {} categories",
            response.permissions.len(),
            response.categories.len()
        ));
        Ok::<_, anyhow::Error>(table.to_string())
    })
    .await
}

pub async fn list_roles(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Getting list of roles from {} ...",
        app_context.server().server
    ));
    ui.run(move || async move {
        let response: RolesListResponse = get(app_context, "authenticated/admin/roles").await?;

        if response.roles.is_empty() {
            return Ok("No roles found.".to_string());
        }

        let mut builder = Builder::default();
        builder.push_record(vec!["Name", "Description", "Permissions"]);
        for role in &response.roles {
            builder.push_record(vec![
                role.name.clone(),
                role.description.clone(),
                role.permissions.len().to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        app_context.ui().success("Roles retrieved successfully!");
        Ok::<_, anyhow::Error>(table.to_string())
    })
    .await
}

pub async fn create_role(app_context: &AppContext, cmd: &CreateRoleRequest) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Creating role '{}' on {} ...",
        cmd.name.bright_blue(),
        app_context.server().server
    ));

    let role: RoleInfo = post(app_context, "authenticated/admin/roles", cmd).await?;
    ui.success(format!(
        "Role '{}' created with {} permissions.",
        role.name.bright_green(),
        role.permissions.len()
    ));
    Ok(())
}

pub async fn list_users(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Getting list of users from {} ...",
        app_context.server().server
    ));
    ui.run(move || async move {
        let response: UsersListResponse = get(app_context, "authenticated/admin/users").await?;
        app_context
            .ui()
            .success(format!("{} users", response.users.len()));
        Ok::<_, anyhow::Error>(users_table(&response.users))
    })
    .await
}

pub async fn create_user(app_context: &AppContext, cmd: &CreateUserRequest) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Creating {} account for {} ...",
        cmd.role,
        cmd.email.bright_blue()
    ));

    let user: UserSummary = post(app_context, "authenticated/admin/users", cmd).await?;
    ui.success(format!(
        "User {} created with id {}",
        user.email.bright_green(),
        user.id
    ));
    Ok(())
}

pub async fn set_user_role(app_context: &AppContext, cmd: &UserRoleCommand) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Moving {} to role {} ...",
        cmd.user.bright_blue(),
        cmd.role
    ));

    let id = resolve_user(app_context, &cmd.user).await?;
    let request = UpdateUserRoleRequest {
        role: cmd.role.clone(),
    };
    let user: UserSummary = put(
        app_context,
        &format!("authenticated/admin/users/{}/role", id),
        &request,
    )
    .await?;

    ui.success(format!(
        "{} is now {}, open sessions were ended",
        user.email.bright_green(),
        user.role
    ));
    Ok(())
}

pub async fn set_user_status(
    app_context: &AppContext,
    cmd: &UserCommand,
    is_active: bool,
) -> anyhow::Result<()> {
    let ui = app_context.ui();
    let action = if is_active { "Reactivating" } else { "Suspending" };
    ui.new_status_line(format!("{} {} ...", action, cmd.user.bright_blue()));

    let id = resolve_user(app_context, &cmd.user).await?;
    let request = UpdateUserStatusRequest { is_active };
    let user: UserSummary = put(
        app_context,
        &format!("authenticated/admin/users/{}/status", id),
        &request,
    )
    .await?;

    ui.success(format!(
        "{} is {}",
        user.email.bright_green(),
        colored_status(user.is_active)
    ));
    Ok(())
}

pub async fn disable_permissions(
    app_context: &AppContext,
    cmd: &DisablePermissionsCommand,
) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Updating disabled permissions of {} ...",
        cmd.user.bright_blue()
    ));

    let id = resolve_user(app_context, &cmd.user).await?;
    let request = DisablePermissionsRequest {
        permissions: cmd.permissions.clone(),
    };
    let user: UserSummary = put(
        app_context,
        &format!("authenticated/admin/users/{}/disabled-permissions", id),
        &request,
    )
    .await?;

    ui.success(format!(
        "Disabled for {}: {}",
        user.email.bright_green(),
        format_permissions(&user.disabled_permissions)
    ));
    Ok(())
}
