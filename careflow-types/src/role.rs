use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::permission::Permission;

/// The built-in roles. Custom roles created at runtime are addressed by
/// their plain name and have no entry here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RoleName {
    Admin,
    Doctor,
    Nurse,
    Secretary,
    Patient,
    Pharmacist,
    LabTechnician,
}

impl RoleName {
    pub fn all() -> &'static [RoleName] {
        &[
            RoleName::Admin,
            RoleName::Doctor,
            RoleName::Nurse,
            RoleName::Secretary,
            RoleName::Patient,
            RoleName::Pharmacist,
            RoleName::LabTechnician,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Doctor => "doctor",
            RoleName::Nurse => "nurse",
            RoleName::Secretary => "secretary",
            RoleName::Patient => "patient",
            RoleName::Pharmacist => "pharmacist",
            RoleName::LabTechnician => "lab_technician",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<RoleName> {
        let s = s.trim().to_lowercase();
        Self::all().iter().copied().find(|r| r.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoleName::Admin => "Administrator",
            RoleName::Doctor => "Doctor",
            RoleName::Nurse => "Nurse",
            RoleName::Secretary => "Secretary",
            RoleName::Patient => "Patient",
            RoleName::Pharmacist => "Pharmacist",
            RoleName::LabTechnician => "Lab Technician",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoleName::Admin => "System administrator with full access to all features",
            RoleName::Doctor => "Medical practitioner who manages patients and appointments",
            RoleName::Nurse => "Clinical staff with limited patient management capabilities",
            RoleName::Secretary => "Front desk staff managing scheduling and patient intake",
            RoleName::Patient => "End user who accesses their own medical information",
            RoleName::Pharmacist => "Pharmacy staff who manages prescriptions dispensation",
            RoleName::LabTechnician => "Laboratory staff who manages lab orders and results",
        }
    }

    /// Permissions a freshly seeded policy grants to this role.
    pub fn default_permissions(&self) -> Vec<Permission> {
        use Permission::*;

        match self {
            RoleName::Admin => Permission::all().to_vec(),
            RoleName::Doctor => vec![
                CreatePatientRecords,
                ViewAssignedPatients,
                ViewAllPatients,
                EditMedicalHistory,
                ViewOwnRecord,
                ViewOwnAppointments,
                ScheduleOwnAppointments,
                CancelOwnAppointments,
                MarkAppointmentComplete,
                CreateConsultations,
                ViewAllConsultations,
                EditConsultations,
                CreatePrescriptions,
                ViewAllPrescriptions,
                SignPrescriptions,
                SendPrescriptions,
                CreateLabOrders,
                ViewLabOrders,
                ViewAllLabOrders,
                EditLabOrders,
                CancelLabOrders,
                CollectSpecimens,
                UpdateLabOrderStatus,
                ViewLabResults,
                ValidateLabResults,
                DownloadLabReports,
                UploadDocuments,
                ViewAllDocuments,
                EditDocuments,
                DeleteDocuments,
                DownloadDocuments,
                ShareDocuments,
            ],
            RoleName::Nurse => vec![
                CreatePatientRecords,
                ViewAssignedPatients,
                EditMedicalHistory,
                ViewOwnRecord,
                ViewOwnAppointments,
                ScheduleOwnAppointments,
                CancelOwnAppointments,
                MarkAppointmentComplete,
                CreateConsultations,
                ViewAllConsultations,
                EditConsultations,
                ViewAllPrescriptions,
                ViewLabOrders,
                ViewAllLabOrders,
                CollectSpecimens,
                DownloadLabReports,
                UploadDocuments,
                ViewAllDocuments,
                EditDocuments,
                DownloadDocuments,
                ShareDocuments,
            ],
            RoleName::Secretary => vec![
                CreatePatientRecords,
                ViewAssignedPatients,
                ViewOwnRecord,
                ViewAllAppointments,
                ViewOwnAppointments,
                ScheduleAnyDoctor,
                ScheduleOwnAppointments,
                CancelAnyAppointment,
                CancelOwnAppointments,
                ViewAllConsultations,
                UploadDocuments,
                ViewAllDocuments,
                EditDocuments,
                DownloadDocuments,
            ],
            RoleName::Patient => vec![
                ViewOwnRecord,
                ViewOwnAppointments,
                ScheduleOwnAppointments,
                CancelOwnAppointments,
                ViewOwnConsultations,
                ViewOwnPrescriptions,
                ViewOwnLabOrders,
                DownloadLabReports,
                UploadDocuments,
                ViewOwnDocuments,
                DownloadDocuments,
            ],
            RoleName::Pharmacist => vec![
                ViewPharmacies,
                ViewAssignedPrescriptions,
                UpdatePrescriptionStatus,
                DispensePrescriptions,
                ViewAllPrescriptions,
            ],
            RoleName::LabTechnician => vec![
                ViewLabOrders,
                ViewAllLabOrders,
                ReceiveSpecimens,
                UpdateLabOrderStatus,
                CreateLabResults,
                ViewLabResults,
                EditLabResults,
                ValidateLabResults,
                UploadLabResults,
                UploadLabReports,
                DownloadLabReports,
                UploadDocuments,
                ViewAllDocuments,
                EditDocuments,
                DownloadDocuments,
            ],
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role as exposed by the API. `name` is a plain string because roles
/// created at runtime are not part of [`RoleName`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[ts(export)]
pub struct RoleInfo {
    pub name: String,
    pub description: String,
    pub permissions: Vec<Permission>,
}

impl RoleInfo {
    pub fn builtin(role: RoleName) -> Self {
        Self {
            name: role.as_str().to_string(),
            description: role.description().to_string(),
            permissions: role.default_permissions(),
        }
    }

    /// Returns the built-in role this info describes, if any.
    pub fn role_name(&self) -> Option<RoleName> {
        RoleName::from_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_admin_has_everything() {
        assert_eq!(
            RoleName::Admin.default_permissions().len(),
            Permission::all().len()
        );
    }

    #[test]
    fn test_seed_sizes() {
        assert_eq!(RoleName::Doctor.default_permissions().len(), 32);
        assert_eq!(RoleName::Nurse.default_permissions().len(), 21);
        assert_eq!(RoleName::Secretary.default_permissions().len(), 14);
        assert_eq!(RoleName::Patient.default_permissions().len(), 11);
        assert_eq!(RoleName::Pharmacist.default_permissions().len(), 5);
        assert_eq!(RoleName::LabTechnician.default_permissions().len(), 15);
    }

    #[test]
    fn test_seed_has_no_duplicates() {
        for role in RoleName::all() {
            let permissions = role.default_permissions();
            let unique: HashSet<_> = permissions.iter().collect();
            assert_eq!(unique.len(), permissions.len(), "{} has duplicates", role);
        }
    }

    #[test]
    fn test_patient_only_sees_own_data() {
        let permissions = RoleName::Patient.default_permissions();
        assert!(permissions.contains(&Permission::ViewOwnRecord));
        assert!(!permissions.contains(&Permission::ViewAllPatients));
        assert!(!permissions.contains(&Permission::ViewAllDocuments));
    }

    #[test]
    fn test_role_parsing_and_labels() {
        assert_eq!(RoleName::from_str("lab_technician"), Some(RoleName::LabTechnician));
        assert_eq!(RoleName::from_str("Doctor"), Some(RoleName::Doctor));
        assert_eq!(RoleName::from_str("surgeon"), None);
        assert_eq!(RoleName::LabTechnician.label(), "Lab Technician");
        assert_eq!(
            serde_json::to_string(&RoleName::LabTechnician).unwrap(),
            "\"lab_technician\""
        );
    }
}
