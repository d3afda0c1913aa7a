pub mod api_server;
pub mod scheduler_interval;
