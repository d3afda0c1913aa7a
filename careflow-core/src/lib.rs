pub mod admin;
pub mod api;
pub mod authorization;
pub mod http;
pub mod settings;
