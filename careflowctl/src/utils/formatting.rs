use careflow_core::authorization::{permission_categories, permissions_by_category, RouteDecision};
use careflow_types::Permission;
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

pub fn colored_status(is_active: bool) -> String {
    if is_active {
        "active".green().to_string()
    } else {
        "suspended".bright_red().to_string()
    }
}

pub fn format_permissions(permissions: &[Permission]) -> String {
    if permissions.is_empty() {
        return "-".to_string();
    }
    permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_decision(path: &str, decision: &RouteDecision) -> String {
    match decision {
        RouteDecision::Granted { route } => {
            format!("{} {} (matches {})", "granted".green(), path, route)
        }
        RouteDecision::RedirectToLogin { to } => {
            format!("{} {} needs a login, redirect to {}", "login".yellow(), path, to)
        }
        RouteDecision::Redirect { to } => {
            format!("{} {} is unknown, redirect to {}", "redirect".blue(), path, to)
        }
        RouteDecision::Denied { route, reason } => {
            format!("{} {} (matches {}): {}", "denied".bright_red(), path, route, reason)
        }
    }
}

/// Table of `permissions` with one row per category.
pub fn permissions_table(permissions: &[Permission]) -> String {
    let mut builder = Builder::default();
    builder.push_record(vec!["Category", "Permissions"]);

    for category in permission_categories(permissions) {
        let names = permissions_by_category(permissions, category)
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        builder.push_record(vec![category.label().to_string(), names]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_permissions() {
        assert_eq!(format_permissions(&[]), "-");
        assert_eq!(
            format_permissions(&[Permission::ViewLabOrders, Permission::EditLabOrders]),
            "view_lab_orders, edit_lab_orders"
        );
    }

    #[test]
    fn test_permissions_table_groups_by_category() {
        let table = permissions_table(&[
            Permission::ViewLabOrders,
            Permission::CreateUsers,
            Permission::EditLabOrders,
        ]);
        assert!(table.contains("view_lab_orders"));
        assert!(table.contains("create_users"));
        assert_eq!(table.matches("Category").count(), 1);
    }

    #[test]
    fn test_format_decision_mentions_the_target() {
        let text = format_decision(
            "/unknown",
            &RouteDecision::Redirect {
                to: "/dashboard".to_string(),
            },
        );
        assert!(text.contains("/dashboard"));
    }
}
