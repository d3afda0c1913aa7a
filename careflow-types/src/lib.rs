/*!
 * Types shared by the careflow server, careflowctl and the web frontend.
 *
 * Kept free of heavy dependencies so the TypeScript bindings can be
 * generated without compiling the server.
 */

mod api;
mod permission;
mod role;
mod user;

pub use api::{
    ApiResponse, AuthSession, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
    TokenPair,
};
pub use permission::{Permission, PermissionCategory, PermissionInfo};
pub use role::{RoleInfo, RoleName};
pub use user::UserProfile;

pub use serde;
pub use ts_rs;
pub use uuid;
