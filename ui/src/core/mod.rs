//! Platform-agnostic building blocks shared by the views.

pub mod config;
pub mod expandable;
pub mod kv;
pub mod platform;
