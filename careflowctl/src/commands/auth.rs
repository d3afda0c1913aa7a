use anyhow::Context;
use careflow_core::http::{SessionTokens, TokenStore};
use careflow_types::{AuthSession, LoginRequest, LogoutRequest, RegisterRequest, UserProfile};
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};
use tracing::warn;

use crate::api::{get, post_ack, public_post};
use crate::cli::{AuthLoginCommand, AuthRegisterCommand};
use crate::context::AppContext;
use crate::utils::formatting::{colored_status, format_permissions};

async fn store_session(app_context: &AppContext, session: &AuthSession) -> anyhow::Result<()> {
    app_context
        .store()
        .save(SessionTokens {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
        })
        .await
        .context("Failed to store session")
}

fn logged_in_message(user: &UserProfile) -> String {
    format!(
        "Logged in as {} ({}) with {} permissions",
        user.full_name().bright_green(),
        user.role.name,
        user.permissions.len()
    )
}

pub async fn auth_login(app_context: &AppContext, cmd: &AuthLoginCommand) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Logging in as {} on {} ...",
        cmd.email.bright_blue(),
        app_context.server().server
    ));

    let request = LoginRequest {
        email: cmd.email.clone(),
        password: cmd.password.clone(),
    };
    let session: AuthSession = match public_post(app_context, "auth/login", &request).await {
        Ok(session) => session,
        Err(e) => {
            ui.failed(format!("Login failed: {}", e));
            return Err(e);
        }
    };

    store_session(app_context, &session).await?;
    ui.success(logged_in_message(&session.user));
    Ok(())
}

pub async fn auth_register(
    app_context: &AppContext,
    cmd: &AuthRegisterCommand,
) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Registering {} on {} ...",
        cmd.email.bright_blue(),
        app_context.server().server
    ));

    let request = RegisterRequest {
        email: cmd.email.clone(),
        password: cmd.password.clone(),
        first_name: cmd.first_name.clone(),
        last_name: cmd.last_name.clone(),
    };
    let session: AuthSession = match public_post(app_context, "auth/register", &request).await {
        Ok(session) => session,
        Err(e) => {
            ui.failed(format!("Registration failed: {}", e));
            return Err(e);
        }
    };

    store_session(app_context, &session).await?;
    ui.success(logged_in_message(&session.user));
    Ok(())
}

pub async fn auth_logout(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();

    let Some(tokens) = app_context.store().load().await else {
        ui.println(format!("Not logged in to {}", app_context.server().server));
        return Ok(());
    };

    ui.new_status_line(format!(
        "Logging out from {} ...",
        app_context.server().server
    ));

    let request = LogoutRequest {
        refresh_token: Some(tokens.refresh_token),
    };
    // The local session is dropped even if the server already forgot it
    if let Err(e) = post_ack(app_context, "auth/logout", &request).await {
        warn!("Server side logout failed: {}", e);
    }

    app_context.store().clear().await?;
    ui.success("Logged out");
    Ok(())
}

pub async fn auth_status(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();

    if app_context.store().load().await.is_none() {
        ui.println(format!(
            "Not logged in to {}. Run `careflowctl auth:login` first.",
            app_context.server().server
        ));
        return Ok(());
    }

    ui.new_status_line(format!(
        "Checking session on {} ...",
        app_context.server().server
    ));
    ui.run(move || async move {
        let user: UserProfile = get(app_context, "auth/me")
            .await
            .context("Stored session is no longer valid")?;

        let mut builder = Builder::default();
        builder.push_record(vec!["Name".to_string(), user.full_name()]);
        builder.push_record(vec!["Email".to_string(), user.email.clone()]);
        builder.push_record(vec!["Role".to_string(), user.role.name.clone()]);
        builder.push_record(vec!["Status".to_string(), colored_status(user.is_active)]);
        builder.push_record(vec![
            "Permissions".to_string(),
            user.permissions.len().to_string(),
        ]);
        builder.push_record(vec![
            "Disabled".to_string(),
            format_permissions(&user.disabled_permissions),
        ]);

        let mut table = builder.build();
        table.with(Style::rounded());
        app_context.ui().success(format!(
            "Logged in to {}",
            app_context.server().server
        ));
        Ok::<_, anyhow::Error>(table.to_string())
    })
    .await
}

pub async fn auth_refresh(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();
    let tokens = app_context.tokens().await?;

    ui.new_status_line("Refreshing session ...");
    match app_context
        .client()
        .refresh_session(Some(&tokens.access_token))
        .await
    {
        Ok(_) => {
            ui.success("Session refreshed");
            Ok(())
        }
        Err(e) => {
            ui.failed(e.user_message().to_string());
            Err(e.into())
        }
    }
}
