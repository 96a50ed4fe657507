//! HTTP routes

pub mod info;
pub mod metrics;
