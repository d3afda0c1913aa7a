use careflow_types::{Permission, UserProfile};
use serde::{Deserialize, Serialize};

use super::access::{AccessDecision, AccessRequirement};

pub const FALLBACK_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteAccess {
    /// Reachable without logging in
    Public,
    Guarded { requirement: AccessRequirement },
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: String,
    segments: Vec<Segment>,
    access: RouteAccess,
}

impl RouteEntry {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn access(&self) -> &RouteAccess {
        &self.access
    }

    /// Named parameters of `path`, empty when the route does not match.
    pub fn params<'a>(&self, path: &'a str) -> Vec<(&str, &'a str)> {
        let segments = split_path(path);
        if !self.matches(&segments) {
            return Vec::new();
        }

        self.segments
            .iter()
            .zip(segments)
            .filter_map(|(pattern, actual)| match pattern {
                Segment::Param(name) => Some((name.as_str(), actual)),
                Segment::Static(_) => None,
            })
            .collect()
    }

    fn matches(&self, segments: &[&str]) -> bool {
        self.segments.len() == segments.len()
            && self
                .segments
                .iter()
                .zip(segments)
                .all(|(pattern, actual)| match pattern {
                    Segment::Static(s) => s == actual,
                    Segment::Param(_) => !actual.is_empty(),
                })
    }
}

/// Result of routing a path for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Granted { route: String },
    RedirectToLogin { to: String },
    /// Unknown path, the client should navigate to `to` instead
    Redirect { to: String },
    Denied { route: String, reason: String },
}

fn split_path(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Ordered table of page routes. The first pattern matching a path wins,
/// so literal routes like `/patients/new` are registered before
/// `/patients/:id`.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
    fallback: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            fallback: FALLBACK_PATH.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn public(mut self, pattern: &str) -> Self {
        self.push(pattern, RouteAccess::Public);
        self
    }

    pub fn guarded(mut self, pattern: &str, requirement: AccessRequirement) -> Self {
        self.push(pattern, RouteAccess::Guarded { requirement });
        self
    }

    fn push(&mut self, pattern: &str, access: RouteAccess) {
        let segments = split_path(pattern)
            .into_iter()
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();

        self.routes.push(RouteEntry {
            pattern: pattern.to_string(),
            segments,
            access,
        });
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        let segments = split_path(path);
        self.routes.iter().find(|route| route.matches(&segments))
    }

    pub fn decide(&self, path: &str, user: Option<&UserProfile>) -> RouteDecision {
        let Some(route) = self.resolve(path) else {
            return RouteDecision::Redirect {
                to: self.fallback.clone(),
            };
        };

        let requirement = match &route.access {
            RouteAccess::Public => {
                return RouteDecision::Granted {
                    route: route.pattern.clone(),
                }
            }
            RouteAccess::Guarded { requirement } => requirement,
        };

        match requirement.evaluate(user) {
            AccessDecision::Granted => RouteDecision::Granted {
                route: route.pattern.clone(),
            },
            AccessDecision::RedirectToLogin { to } => RouteDecision::RedirectToLogin { to },
            AccessDecision::Denied { reason } => RouteDecision::Denied {
                route: route.pattern.clone(),
                reason,
            },
        }
    }

    /// The page routes of the web application.
    pub fn application() -> Self {
        use Permission::*;

        let patients = AccessRequirement::any_of(&[ViewAllPatients, ViewAssignedPatients]);
        let doctors = AccessRequirement::any_of(&[ViewAllUsers, ScheduleAnyDoctor]);
        let appointments = AccessRequirement::any_of(&[ViewAllAppointments, ViewOwnAppointments]);
        let scheduling = AccessRequirement::any_of(&[ScheduleAnyDoctor, ScheduleOwnAppointments]);
        let prescriptions = AccessRequirement::any_of(&[
            ViewAllPrescriptions,
            ViewOwnPrescriptions,
            ViewAssignedPrescriptions,
        ]);
        let consultations = AccessRequirement::any_of(&[ViewAllConsultations, ViewOwnConsultations]);
        let lab_orders = AccessRequirement::any_of(&[ViewLabOrders, ViewAllLabOrders, ViewOwnLabOrders]);
        let documents = AccessRequirement::any_of(&[ViewAllDocuments, ViewOwnDocuments]);

        Self::new()
            .public("/auth/login")
            .public("/auth/register")
            .guarded("/dashboard", AccessRequirement::authenticated())
            .guarded("/patients", patients.clone())
            .guarded("/patients/new", AccessRequirement::permission(CreatePatientRecords))
            .guarded("/patients/:id", patients)
            .guarded("/patients/:id/edit", AccessRequirement::permission(EditMedicalHistory))
            .guarded("/doctors", doctors.clone())
            .guarded("/doctors/new", AccessRequirement::permission(CreateUsers))
            .guarded("/doctors/:id", doctors)
            .guarded("/doctors/:id/edit", AccessRequirement::permission(ModifyUserRoles))
            .guarded("/appointments", appointments.clone())
            .guarded("/appointments/new", scheduling.clone())
            .guarded("/appointments/:id", appointments)
            .guarded("/appointments/:id/edit", scheduling)
            .guarded("/prescriptions", prescriptions.clone())
            .guarded("/prescriptions/new", AccessRequirement::permission(CreatePrescriptions))
            .guarded("/prescriptions/:id", prescriptions)
            .guarded("/prescriptions/:id/edit", AccessRequirement::permission(CreatePrescriptions))
            .guarded("/consultations", consultations.clone())
            .guarded("/consultations/new", AccessRequirement::permission(CreateConsultations))
            .guarded("/consultations/:id", consultations)
            .guarded("/consultations/:id/edit", AccessRequirement::permission(EditConsultations))
            .guarded("/pharmacies", AccessRequirement::permission(ViewPharmacies))
            .guarded("/lab/orders", lab_orders.clone())
            .guarded("/lab/orders/new", AccessRequirement::permission(CreateLabOrders))
            .guarded("/lab/orders/:id", lab_orders)
            .guarded("/lab/orders/:id/edit", AccessRequirement::permission(EditLabOrders))
            .guarded("/lab/results", AccessRequirement::permission(ViewLabResults))
            .guarded("/lab/results/:id", AccessRequirement::permission(ViewLabResults))
            .guarded("/documents", documents.clone())
            .guarded("/documents/upload", AccessRequirement::permission(UploadDocuments))
            .guarded("/documents/:id", documents)
            .guarded("/admin/users", AccessRequirement::permission(ViewAllUsers))
            .guarded("/admin/staff/create", AccessRequirement::permission(CreateUsers))
    }
}
