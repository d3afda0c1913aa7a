//! Role based access control for careflow.
//!
//! Roles and their permissions live in a YAML policy file that is seeded
//! from the built-in catalog the first time the server starts. Decisions are
//! made by a Casbin enforcer holding three kinds of rules:
//!
//! - `p, role:<name>, <permission>, allow` for every permission of a role
//! - `g, user:<id>, role:<name>` assigning a user to a role
//! - `p, user:<id>, <permission>, deny` for permissions withheld from a user
//!
//! A deny rule always wins over the grants of the user's role.

pub mod casbin;
pub mod error;
pub mod policy;
pub mod service;


pub use error::AuthError;
pub use policy::{PolicyConfig, RoleConfig};
pub use service::AuthorizationService;
