use careflow_core::admin::requests::CheckAccessRequest;
use careflow_core::admin::responses::{CheckAccessResponse, NavigationResponse};
use careflow_core::authorization::RouteDecision;
use careflow_types::UserProfile;
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

use crate::api::{get, post};
use crate::cli::RouteCommand;
use crate::context::AppContext;
use crate::utils::formatting::{format_decision, format_permissions, permissions_table};

pub async fn my_permissions(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line("Getting effective permissions ...");
    ui.run(move || async move {
        let user: UserProfile = get(app_context, "auth/me").await?;

        app_context.ui().success(format!(
            "{} has {} permissions as {}",
            user.full_name().bright_green(),
            user.permissions.len(),
            user.role.name
        ));
        if user.permissions.is_empty() {
            return Ok("No permissions granted.".to_string());
        }
        Ok::<_, anyhow::Error>(permissions_table(&user.permissions))
    })
    .await
}

pub async fn check_access(
    app_context: &AppContext,
    request: &CheckAccessRequest,
) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!(
        "Checking {} of {} ...",
        format!("{:?}", request.mode).to_lowercase(),
        request.permissions.join(", ").bright_blue()
    ));

    let response: CheckAccessResponse =
        post(app_context, "authenticated/access/check", request).await?;

    if response.allowed {
        ui.success("Access granted");
        if !response.missing.is_empty() {
            ui.println(format!(
                "Not granted: {}",
                format_permissions(&response.missing)
            ));
        }
        Ok(())
    } else {
        ui.failed("Access denied");
        Err(anyhow::anyhow!(
            "Missing permissions: {}",
            format_permissions(&response.missing)
        ))
    }
}

pub async fn route_access(app_context: &AppContext, cmd: &RouteCommand) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line(format!("Checking route {} ...", cmd.path.bright_blue()));

    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("path", &cmd.path)
        .finish();
    let decision: RouteDecision =
        get(app_context, &format!("authenticated/access/route?{}", query)).await?;

    let line = format_decision(&cmd.path, &decision);
    match decision {
        RouteDecision::Denied { .. } => {
            ui.failed(line);
            Err(anyhow::anyhow!("Access to {} denied", cmd.path))
        }
        _ => {
            ui.success(line);
            Ok(())
        }
    }
}

pub async fn navigation(app_context: &AppContext) -> anyhow::Result<()> {
    let ui = app_context.ui();
    ui.new_status_line("Getting navigation ...");
    ui.run(move || async move {
        let response: NavigationResponse = get(app_context, "authenticated/navigation").await?;

        let mut builder = Builder::default();
        builder.push_record(vec!["Entry", "Path"]);
        for item in &response.items {
            builder.push_record(vec![item.label.as_str(), item.path.as_str()]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        app_context
            .ui()
            .success(format!("{} entries visible", response.items.len()));
        Ok::<_, anyhow::Error>(table.to_string())
    })
    .await
}
