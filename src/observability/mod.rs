//! Observability: structured logging for the monitoring agent

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
