pub mod formatting;
pub mod tracing_layer;
pub mod ui;
