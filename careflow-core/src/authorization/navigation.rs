use careflow_types::Permission;
use serde::{Deserialize, Serialize};

use super::checks::{has_any_permission, has_permission};

/// Entry of the application sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct NavigationItem {
    pub id: String,
    pub label: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    /// Any of these grants visibility
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
}

impl NavigationItem {
    fn new(id: &str, label: &str, path: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            path: path.to_string(),
            permission: None,
            permissions: Vec::new(),
        }
    }

    fn requires(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    fn requires_any(mut self, permissions: &[Permission]) -> Self {
        self.permissions = permissions.to_vec();
        self
    }

    pub fn is_visible(&self, permissions: &[Permission]) -> bool {
        if let Some(required) = self.permission {
            if !has_permission(permissions, required) {
                return false;
            }
        }
        self.permissions.is_empty() || has_any_permission(permissions, &self.permissions)
    }
}

pub fn default_navigation() -> Vec<NavigationItem> {
    use Permission::*;

    vec![
        NavigationItem::new("dashboard", "Dashboard", "/dashboard"),
        NavigationItem::new("patients", "Patients", "/patients")
            .requires_any(&[ViewAllPatients, ViewAssignedPatients]),
        NavigationItem::new("appointments", "Appointments", "/appointments")
            .requires_any(&[ViewAllAppointments, ViewOwnAppointments]),
        NavigationItem::new("consultations", "Consultations", "/consultations")
            .requires(ViewAllConsultations),
        NavigationItem::new("prescriptions", "Prescriptions", "/prescriptions")
            .requires(ViewAllPrescriptions),
        NavigationItem::new("pharmacies", "Pharmacies", "/pharmacies").requires(ViewPharmacies),
        NavigationItem::new("lab-orders", "Lab Orders", "/lab/orders").requires(ViewLabOrders),
        NavigationItem::new("lab-results", "Lab Results", "/lab/results").requires(ViewLabResults),
        NavigationItem::new("documents", "Documents", "/documents")
            .requires_any(&[ViewAllDocuments, ViewOwnDocuments]),
        NavigationItem::new("user-management", "User Management", "/admin/users")
            .requires(CreateUsers),
        NavigationItem::new("create-staff", "Create Staff", "/admin/staff/create")
            .requires(CreateUsers),
    ]
}

pub fn visible_navigation(items: &[NavigationItem], permissions: &[Permission]) -> Vec<NavigationItem> {
    items
        .iter()
        .filter(|item| item.is_visible(permissions))
        .cloned()
        .collect()
}
