use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Functional area a permission belongs to. Used to group permissions in
/// the admin screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PermissionCategory {
    UserManagement,
    PatientRecords,
    Appointments,
    Consultations,
    Prescriptions,
    Pharmacy,
    Laboratory,
    Documents,
    SystemManagement,
}

impl PermissionCategory {
    pub fn all() -> &'static [PermissionCategory] {
        &[
            PermissionCategory::UserManagement,
            PermissionCategory::PatientRecords,
            PermissionCategory::Appointments,
            PermissionCategory::Consultations,
            PermissionCategory::Prescriptions,
            PermissionCategory::Pharmacy,
            PermissionCategory::Laboratory,
            PermissionCategory::Documents,
            PermissionCategory::SystemManagement,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCategory::UserManagement => "user_management",
            PermissionCategory::PatientRecords => "patient_records",
            PermissionCategory::Appointments => "appointments",
            PermissionCategory::Consultations => "consultations",
            PermissionCategory::Prescriptions => "prescriptions",
            PermissionCategory::Pharmacy => "pharmacy",
            PermissionCategory::Laboratory => "laboratory",
            PermissionCategory::Documents => "documents",
            PermissionCategory::SystemManagement => "system_management",
        }
    }

    /// Human readable label, e.g. "Patient Records".
    pub fn label(&self) -> &'static str {
        match self {
            PermissionCategory::UserManagement => "User Management",
            PermissionCategory::PatientRecords => "Patient Records",
            PermissionCategory::Appointments => "Appointments",
            PermissionCategory::Consultations => "Consultations",
            PermissionCategory::Prescriptions => "Prescriptions",
            PermissionCategory::Pharmacy => "Pharmacy",
            PermissionCategory::Laboratory => "Laboratory",
            PermissionCategory::Documents => "Documents",
            PermissionCategory::SystemManagement => "System Management",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<PermissionCategory> {
        let s = s.trim().to_lowercase();
        Self::all().iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

macro_rules! permission_catalog {
    ($($variant:ident => $name:literal, $category:ident, $description:literal;)*) => {
        /// A named capability a role can grant.
        ///
        /// Serialized as its snake_case name, which is also the identifier
        /// stored in the policy file and sent to the frontend.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
        )]
        #[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
        #[serde(rename_all = "snake_case")]
        #[ts(export)]
        pub enum Permission {
            $($variant,)*
        }

        const ALL_PERMISSIONS: &[Permission] = &[$(Permission::$variant,)*];

        impl Permission {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Permission::$variant => $name,)*
                }
            }

            pub fn category(&self) -> PermissionCategory {
                match self {
                    $(Permission::$variant => PermissionCategory::$category,)*
                }
            }

            pub fn description(&self) -> &'static str {
                match self {
                    $(Permission::$variant => $description,)*
                }
            }
        }
    };
}

permission_catalog! {
    CreateUsers => "create_users", UserManagement, "Create user accounts";
    ViewAllUsers => "view_all_users", UserManagement, "View all users";
    ModifyUserRoles => "modify_user_roles", UserManagement, "Modify user roles";
    SuspendActivateAccounts => "suspend_activate_accounts", UserManagement, "Suspend/activate accounts";

    CreatePatientRecords => "create_patient_records", PatientRecords, "Create patient records";
    ViewAllPatients => "view_all_patients", PatientRecords, "View all patient records";
    ViewAssignedPatients => "view_assigned_patients", PatientRecords, "View assigned patients";
    EditMedicalHistory => "edit_medical_history", PatientRecords, "Edit medical history";
    ViewOwnRecord => "view_own_record", PatientRecords, "View own patient record";

    ViewAllAppointments => "view_all_appointments", Appointments, "View all appointments";
    ViewOwnAppointments => "view_own_appointments", Appointments, "View own appointments";
    ScheduleAnyDoctor => "schedule_any_doctor", Appointments, "Schedule for any doctor";
    ScheduleOwnAppointments => "schedule_own_appointments", Appointments, "Schedule own appointments";
    CancelAnyAppointment => "cancel_any_appointment", Appointments, "Cancel any appointment";
    CancelOwnAppointments => "cancel_own_appointments", Appointments, "Cancel own appointments";
    MarkAppointmentComplete => "mark_appointment_complete", Appointments, "Mark appointment complete";

    CreateConsultations => "create_consultations", Consultations, "Create consultations";
    ViewAllConsultations => "view_all_consultations", Consultations, "View all consultations";
    ViewOwnConsultations => "view_own_consultations", Consultations, "View own consultations";
    EditConsultations => "edit_consultations", Consultations, "Edit consultations";
    DeleteConsultations => "delete_consultations", Consultations, "Delete consultations";

    CreatePrescriptions => "create_prescriptions", Prescriptions, "Create prescriptions";
    ViewAllPrescriptions => "view_all_prescriptions", Prescriptions, "View all prescriptions";
    ViewOwnPrescriptions => "view_own_prescriptions", Prescriptions, "View own prescriptions";
    SignPrescriptions => "sign_prescriptions", Prescriptions, "Sign prescriptions";
    SendPrescriptions => "send_prescriptions", Prescriptions, "Send prescriptions to pharmacy";
    DispensePrescriptions => "dispense_prescriptions", Prescriptions, "Mark prescriptions as dispensed";

    ManagePharmacies => "manage_pharmacies", Pharmacy, "Create/edit/delete pharmacies";
    ViewPharmacies => "view_pharmacies", Pharmacy, "View pharmacies";
    ViewAssignedPrescriptions => "view_assigned_prescriptions", Pharmacy, "View prescriptions assigned to pharmacy";
    UpdatePrescriptionStatus => "update_prescription_status", Pharmacy, "Update prescription status";

    CreateLabOrders => "create_lab_orders", Laboratory, "Create laboratory orders";
    ViewLabOrders => "view_lab_orders", Laboratory, "View laboratory orders";
    ViewAllLabOrders => "view_all_lab_orders", Laboratory, "View all lab orders";
    ViewOwnLabOrders => "view_own_lab_orders", Laboratory, "View own lab orders";
    EditLabOrders => "edit_lab_orders", Laboratory, "Edit laboratory orders";
    CancelLabOrders => "cancel_lab_orders", Laboratory, "Cancel laboratory orders";
    CollectSpecimens => "collect_specimens", Laboratory, "Collect specimens";
    ReceiveSpecimens => "receive_specimens", Laboratory, "Receive specimens at lab";
    UpdateLabOrderStatus => "update_lab_order_status", Laboratory, "Update lab order status";
    CreateLabResults => "create_lab_results", Laboratory, "Create lab results";
    ViewLabResults => "view_lab_results", Laboratory, "View lab results";
    EditLabResults => "edit_lab_results", Laboratory, "Edit lab results";
    UploadLabResults => "upload_lab_results", Laboratory, "Upload lab results";
    ValidateLabResults => "validate_lab_results", Laboratory, "Validate lab results";
    UploadLabReports => "upload_lab_reports", Laboratory, "Upload lab PDF reports";
    DownloadLabReports => "download_lab_reports", Laboratory, "Download lab reports";

    UploadDocuments => "upload_documents", Documents, "Upload medical documents";
    ViewAllDocuments => "view_all_documents", Documents, "View all documents";
    ViewOwnDocuments => "view_own_documents", Documents, "View own documents";
    EditDocuments => "edit_documents", Documents, "Edit documents metadata";
    DeleteDocuments => "delete_documents", Documents, "Delete documents";
    DownloadDocuments => "download_documents", Documents, "Download documents";
    ShareDocuments => "share_documents", Documents, "Share documents with other users";

    AccessSystemSettings => "access_system_settings", SystemManagement, "Access system settings";
    ViewSystemLogs => "view_system_logs", SystemManagement, "View system logs";
    ConfigureNotifications => "configure_notifications", SystemManagement, "Configure notifications";
    ExportImportData => "export_import_data", SystemManagement, "Export/import data";
}

impl Permission {
    /// Every permission of the catalog, in catalog order.
    pub fn all() -> &'static [Permission] {
        ALL_PERMISSIONS
    }

    /// Parses a permission name. Matching ignores case and surrounding
    /// whitespace; unknown names yield `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Permission> {
        let s = s.trim().to_lowercase();
        ALL_PERMISSIONS.iter().copied().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A permission together with its catalog metadata, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[ts(export)]
pub struct PermissionInfo {
    pub name: Permission,
    pub description: String,
    pub category: PermissionCategory,
}

impl From<Permission> for PermissionInfo {
    fn from(permission: Permission) -> Self {
        Self {
            name: permission,
            description: permission.description().to_string(),
            category: permission.category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_size_and_uniqueness() {
        let all = Permission::all();
        assert_eq!(all.len(), 58);

        let names: HashSet<_> = all.iter().map(|p| p.as_str()).collect();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for permission in Permission::all() {
            let json = serde_json::to_string(permission).unwrap();
            assert_eq!(json, format!("\"{}\"", permission.as_str()));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            Permission::from_str("create_patient_records"),
            Some(Permission::CreatePatientRecords)
        );
        assert_eq!(
            Permission::from_str("  VIEW_LAB_RESULTS "),
            Some(Permission::ViewLabResults)
        );
        assert_eq!(Permission::from_str("view_patients"), None);
        assert_eq!(Permission::from_str(""), None);
    }

    #[test]
    fn test_every_category_is_populated() {
        for category in PermissionCategory::all() {
            assert!(
                Permission::all().iter().any(|p| p.category() == *category),
                "category {} has no permissions",
                category.as_str()
            );
        }
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(PermissionCategory::UserManagement.label(), "User Management");
        assert_eq!(
            PermissionCategory::from_str("system_management"),
            Some(PermissionCategory::SystemManagement)
        );
        assert_eq!(
            Permission::SendPrescriptions.description(),
            "Send prescriptions to pharmacy"
        );
        assert_eq!(
            Permission::MarkAppointmentComplete.description(),
            "Mark appointment complete"
        );
        assert_eq!(
            Permission::ReceiveSpecimens.category(),
            PermissionCategory::Laboratory
        );
    }
}
