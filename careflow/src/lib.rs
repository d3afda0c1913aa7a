//! careflow server library
//!
//! Exposes the router and state so the binary and the tests share one
//! construction path.

pub mod api;
pub mod app_state;
pub mod http;
pub mod init_telemetry;
pub mod services;
pub mod settings;
pub mod stop_flag;
pub mod tasks;

pub use app_state::AppState;
