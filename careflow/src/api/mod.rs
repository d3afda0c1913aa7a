pub mod bearer_auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod auth_flow_tests;
