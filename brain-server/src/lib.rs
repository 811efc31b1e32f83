//! HTTP service around the brain core: configuration, logging, session
//! history and the axum front controller.

pub mod config;
pub mod history;
pub mod logging;
pub mod server;
